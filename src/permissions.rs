//! Permission overwrites for article channels in each lifecycle state.
//!
//! Everything here is pure; the platform adapters translate [`Overwrites`]
//! to and from the wire representation.

use serenity::model::prelude::{RoleId, UserId};
use serenity::model::Permissions;

/// Who an overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The guild's default role.
    Everyone,
    Role(RoleId),
    Member(UserId),
    /// An identity the platform reported as neither a role nor a member.
    Unrecognized(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flag {
    Allow,
    Deny,
    #[default]
    Inherit,
}

impl Flag {
    fn from_bits(allow: Permissions, deny: Permissions, bit: Permissions) -> Self {
        if allow.contains(bit) {
            Flag::Allow
        } else if deny.contains(bit) {
            Flag::Deny
        } else {
            Flag::Inherit
        }
    }
}

/// The tri-state flags the workflow manages on a single overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grant {
    pub view: Flag,
    pub send: Flag,
    pub read_history: Flag,
    pub manage_messages: Flag,
}

impl Grant {
    /// View, post and read history.
    pub const fn contributor() -> Self {
        Grant {
            view: Flag::Allow,
            send: Flag::Allow,
            read_history: Flag::Allow,
            manage_messages: Flag::Inherit,
        }
    }

    /// View and read history, posting denied.
    pub const fn read_only() -> Self {
        Grant {
            view: Flag::Allow,
            send: Flag::Deny,
            read_history: Flag::Allow,
            manage_messages: Flag::Inherit,
        }
    }

    fn flags(&self) -> [(Flag, Permissions); 4] {
        [
            (self.view, Permissions::VIEW_CHANNEL),
            (self.send, Permissions::SEND_MESSAGES),
            (self.read_history, Permissions::READ_MESSAGE_HISTORY),
            (self.manage_messages, Permissions::MANAGE_MESSAGES),
        ]
    }

    /// Splits the grant into serenity's `(allow, deny)` bitsets.
    pub fn to_permissions(&self) -> (Permissions, Permissions) {
        self.flags().into_iter().fold(
            (Permissions::empty(), Permissions::empty()),
            |(allow, deny), (flag, bit)| match flag {
                Flag::Allow => (allow | bit, deny),
                Flag::Deny => (allow, deny | bit),
                Flag::Inherit => (allow, deny),
            },
        )
    }

    /// Bits outside the managed flags are dropped.
    pub fn from_permissions(allow: Permissions, deny: Permissions) -> Self {
        Grant {
            view: Flag::from_bits(allow, deny, Permissions::VIEW_CHANNEL),
            send: Flag::from_bits(allow, deny, Permissions::SEND_MESSAGES),
            read_history: Flag::from_bits(allow, deny, Permissions::READ_MESSAGE_HISTORY),
            manage_messages: Flag::from_bits(allow, deny, Permissions::MANAGE_MESSAGES),
        }
    }
}

/// Overwrites keyed by target, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overwrites(Vec<(Target, Grant)>);

impl Overwrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the grant for `target`, keeping its position.
    pub fn set(&mut self, target: Target, grant: Grant) {
        match self.0.iter_mut().find(|(t, _)| *t == target) {
            Some((_, existing)) => *existing = grant,
            None => self.0.push((target, grant)),
        }
    }

    pub fn get(&self, target: &Target) -> Option<&Grant> {
        self.0.iter().find(|(t, _)| t == target).map(|(_, g)| g)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Target, Grant)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Target, Grant)> for Overwrites {
    fn from_iter<I: IntoIterator<Item = (Target, Grant)>>(iter: I) -> Self {
        let mut overwrites = Overwrites::new();
        for (target, grant) in iter {
            overwrites.set(target, grant);
        }
        overwrites
    }
}

/// Overwrites for a freshly created, private article channel.
pub fn active_overwrites(editors: Option<RoleId>, writers: &[UserId]) -> Overwrites {
    let mut overwrites = Overwrites::new();
    overwrites.set(
        Target::Everyone,
        Grant {
            view: Flag::Deny,
            ..Grant::default()
        },
    );
    if let Some(editors) = editors {
        overwrites.set(
            Target::Role(editors),
            Grant {
                manage_messages: Flag::Allow,
                ..Grant::contributor()
            },
        );
    }
    for writer in writers {
        overwrites.set(Target::Member(*writer), Grant::contributor());
    }
    overwrites
}

/// Recomputes `current` for an archived channel: everyone may read, only
/// Editors may post.
pub fn archived_overwrites(current: &Overwrites, editors: Option<RoleId>) -> Overwrites {
    let mut base = current.clone();
    base.set(Target::Everyone, Grant::read_only());

    base.iter()
        .map(|(target, _)| {
            let grant = match target {
                Target::Everyone | Target::Member(_) => Grant::read_only(),
                Target::Role(role) if Some(*role) == editors => Grant::contributor(),
                Target::Role(_) => Grant::read_only(),
                Target::Unrecognized(_) => Grant {
                    view: Flag::Allow,
                    send: Flag::Deny,
                    ..Grant::default()
                },
            };
            (*target, grant)
        })
        .collect()
}
