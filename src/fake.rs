//! In-memory guild for exercising the workflow without Discord.

use std::sync::{Arc, Mutex, MutexGuard};

use serenity::async_trait;
use serenity::model::prelude::{ChannelId, MessageId, RoleId, UserId};

use crate::permissions::Overwrites;
use crate::platform::{ArticleChannel, GuildApi, NewChannel, PlatformError, PlatformResult};

#[derive(Default)]
struct State {
    next_id: u64,
    categories: Vec<(ChannelId, String)>,
    roles: Vec<(RoleId, String)>,
    members: Vec<UserId>,
    channels: Vec<ArticleChannel>,
    messages: Vec<(ChannelId, MessageId, String)>,
    pinned: Vec<MessageId>,
    forbid_pins: bool,
    forbid_edits: bool,
    broken_channels: Vec<ChannelId>,
    failing_lookups: Vec<UserId>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        1_000 + self.next_id
    }

    fn channel_mut(&mut self, id: ChannelId) -> PlatformResult<&mut ArticleChannel> {
        self.channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PlatformError::NotFound(format!("channel {id}")))
    }
}

/// Clones share the same guild.
#[derive(Default, Clone)]
pub struct FakeGuild {
    state: Arc<Mutex<State>>,
}

impl FakeGuild {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_member(&self, id: u64) -> UserId {
        let user = UserId(id);
        self.state().members.push(user);
        user
    }

    pub fn add_role(&self, name: &str) -> RoleId {
        let mut state = self.state();
        let role = RoleId(state.next_id());
        state.roles.push((role, name.to_string()));
        role
    }

    /// Adds a bare text channel, optionally inside a category with a topic.
    pub fn add_text_channel(&self, name: &str, placed: Option<(ChannelId, String)>) -> ArticleChannel {
        let mut state = self.state();
        let (category, topic) = match placed {
            Some((category, topic)) => (Some(category), Some(topic)),
            None => (None, None),
        };
        let channel = ArticleChannel {
            id: ChannelId(state.next_id()),
            name: name.to_string(),
            topic,
            category,
            overwrites: Overwrites::new(),
        };
        state.channels.push(channel.clone());
        channel
    }

    pub fn forbid_pins(&self) {
        self.state().forbid_pins = true;
    }

    pub fn forbid_edits(&self) {
        self.state().forbid_edits = true;
    }

    /// Looking up `user` fails from now on.
    pub fn fail_member_lookup(&self, user: UserId) {
        self.state().failing_lookups.push(user);
    }

    /// Every message sent to `channel` fails from now on.
    pub fn break_channel(&self, channel: ChannelId) {
        self.state().broken_channels.push(channel);
    }

    pub fn category_count(&self) -> usize {
        self.state().categories.len()
    }

    pub fn role_named(&self, name: &str) -> Option<RoleId> {
        self.state()
            .roles
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| *id)
    }

    pub fn channels(&self) -> Vec<ArticleChannel> {
        self.state().channels.clone()
    }

    pub fn channel(&self, id: ChannelId) -> Option<ArticleChannel> {
        self.state().channels.iter().find(|c| c.id == id).cloned()
    }

    pub fn messages(&self, channel: ChannelId) -> Vec<String> {
        self.state()
            .messages
            .iter()
            .filter(|(c, _, _)| *c == channel)
            .map(|(_, _, content)| content.clone())
            .collect()
    }

    pub fn is_pinned(&self, channel: ChannelId) -> bool {
        let state = self.state();
        state
            .messages
            .iter()
            .any(|(c, m, _)| *c == channel && state.pinned.contains(m))
    }
}

#[async_trait]
impl GuildApi for FakeGuild {
    async fn find_category(&self, name: &str) -> PlatformResult<Option<ChannelId>> {
        Ok(self
            .state()
            .categories
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| *id))
    }

    async fn create_category(&self, name: &str) -> PlatformResult<ChannelId> {
        let mut state = self.state();
        let id = ChannelId(state.next_id());
        state.categories.push((id, name.to_string()));
        Ok(id)
    }

    async fn find_role(&self, name: &str) -> PlatformResult<Option<RoleId>> {
        Ok(self.role_named(name))
    }

    async fn create_role(&self, name: &str) -> PlatformResult<RoleId> {
        Ok(self.add_role(name))
    }

    async fn member(&self, user: UserId) -> PlatformResult<Option<UserId>> {
        let state = self.state();
        if state.failing_lookups.contains(&user) {
            return Err(PlatformError::Other {
                category: "Http",
                detail: "member lookup timed out".into(),
            });
        }
        Ok(state.members.iter().find(|m| **m == user).copied())
    }

    async fn create_text_channel(&self, channel: NewChannel) -> PlatformResult<ArticleChannel> {
        let mut state = self.state();
        let created = ArticleChannel {
            id: ChannelId(state.next_id()),
            name: channel.name,
            topic: Some(channel.topic),
            category: Some(channel.category),
            overwrites: channel.overwrites,
        };
        state.channels.push(created.clone());
        Ok(created)
    }

    async fn text_channels(&self, category: ChannelId) -> PlatformResult<Vec<ArticleChannel>> {
        Ok(self
            .state()
            .channels
            .iter()
            .filter(|c| c.category == Some(category))
            .cloned()
            .collect())
    }

    async fn text_channel(&self, id: ChannelId) -> PlatformResult<Option<ArticleChannel>> {
        Ok(self.channel(id))
    }

    async fn move_channel(&self, channel: ChannelId, category: ChannelId) -> PlatformResult<()> {
        let mut state = self.state();
        if state.forbid_edits {
            return Err(PlatformError::Forbidden("Missing Permissions".into()));
        }
        state.channel_mut(channel)?.category = Some(category);
        Ok(())
    }

    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: &Overwrites,
    ) -> PlatformResult<()> {
        let mut state = self.state();
        if state.forbid_edits {
            return Err(PlatformError::Forbidden("Missing Permissions".into()));
        }
        state.channel_mut(channel)?.overwrites = overwrites.clone();
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> PlatformResult<MessageId> {
        let mut state = self.state();
        if state.broken_channels.contains(&channel) {
            return Err(PlatformError::Other {
                category: "Http",
                detail: "gateway timeout".into(),
            });
        }
        state.channel_mut(channel)?;
        let id = MessageId(state.next_id());
        state.messages.push((channel, id, content.to_string()));
        Ok(id)
    }

    async fn pin_message(&self, _channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        let mut state = self.state();
        if state.forbid_pins {
            return Err(PlatformError::Forbidden("Missing Permissions".into()));
        }
        state.pinned.push(message);
        Ok(())
    }
}
