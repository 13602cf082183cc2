//! Article channels: setup, creation, listing and archiving.

use chrono::NaiveDateTime;
use futures::future::join_all;
use serenity::model::prelude::{ChannelId, RoleId, UserId};

use crate::config::Config;
use crate::deadline::{self, discord_timestamp};
use crate::error::ArticleError;
use crate::permissions::{active_overwrites, archived_overwrites};
use crate::platform::{ArticleChannel, GuildApi, NewChannel, PlatformError};
use crate::utils::{parse_mentions, slugify};

const CHECKLIST: &str = "**Checklist**\n\
    - [ ] Angle approved\n\
    - [ ] Sources identified\n\
    - [ ] Draft complete\n\
    - [ ] Edited by section\n\
    - [ ] Copy edit\n\
    - [ ] Final publish\n";

/// Result of a step that is allowed to be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Skipped(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categories {
    pub active: ChannelId,
    pub archived: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub categories: Categories,
    pub editors: RoleId,
}

/// Writers that made it onto the channel and the tokens that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterResolution {
    pub resolved: Vec<UserId>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewArticle<'a> {
    pub title: &'a str,
    pub deadline: &'a str,
    pub writers: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct CreatedArticle {
    pub channel: ArticleChannel,
    pub deadline: NaiveDateTime,
    pub writers: WriterResolution,
    pub pin: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveArticle {
    pub channel: ArticleChannel,
    pub deadline: Option<NaiveDateTime>,
}

/// Finds the active and archived categories, creating whichever is missing.
pub async fn ensure_categories<G: GuildApi + ?Sized>(
    guild: &G,
    config: &Config,
) -> Result<Categories, ArticleError> {
    let active = match guild.find_category(&config.active_category_name).await? {
        Some(id) => id,
        None => guild.create_category(&config.active_category_name).await?,
    };
    let archived = match guild.find_category(&config.archived_category_name).await? {
        Some(id) => id,
        None => guild.create_category(&config.archived_category_name).await?,
    };
    Ok(Categories { active, archived })
}

/// Creates the categories and the Editors role if they do not exist yet.
pub async fn setup<G: GuildApi + ?Sized>(
    guild: &G,
    config: &Config,
) -> Result<SetupReport, ArticleError> {
    let categories = ensure_categories(guild, config).await?;
    let editors = match guild.find_role(&config.editors_role_name).await? {
        Some(role) => role,
        None => guild.create_role(&config.editors_role_name).await?,
    };
    Ok(SetupReport {
        categories,
        editors,
    })
}

/// Resolves space separated mentions to guild members. Anything that is not
/// a mention of a current member is skipped.
pub async fn resolve_writers<G: GuildApi + ?Sized>(
    guild: &G,
    mentions: Option<&str>,
) -> WriterResolution {
    let (users, rejected) = parse_mentions(mentions.unwrap_or_default());
    let lookups = join_all(users.iter().map(|user| guild.member(*user))).await;

    let mut resolution = WriterResolution {
        resolved: Vec::with_capacity(users.len()),
        skipped: rejected,
    };
    for (user, lookup) in users.into_iter().zip(lookups) {
        match lookup {
            Ok(Some(member)) => resolution.resolved.push(member),
            Ok(None) => resolution.skipped.push(format!("<@{user}>")),
            Err(e) => {
                warn!(error = %e, user = %user, "failed to resolve writer");
                resolution.skipped.push(format!("<@{user}>"));
            }
        }
    }
    if !resolution.skipped.is_empty() {
        debug!(skipped = ?resolution.skipped, "ignoring writer tokens");
    }
    resolution
}

fn checklist_message(title: &str, writers: Option<&str>, deadline: NaiveDateTime) -> String {
    let writers = writers
        .map(|w| w.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|w| !w.is_empty())
        .unwrap_or_else(|| "—".to_string());
    format!(
        "**Article:** {title}\n**Writers:** {writers}\n**Deadline:** {} ({})\n\n{CHECKLIST}",
        discord_timestamp(deadline, 'F'),
        discord_timestamp(deadline, 'R'),
    )
}

/// Creates a private article channel in the active category and pins the
/// checklist in it.
///
/// Nothing is created when the deadline does not parse. Failing to pin for
/// lack of permission is not an error.
pub async fn create_article<G: GuildApi + ?Sized>(
    guild: &G,
    config: &Config,
    article: NewArticle<'_>,
    now: NaiveDateTime,
) -> Result<CreatedArticle, ArticleError> {
    let deadline = deadline::parse_when(article.deadline, now)
        .ok_or_else(|| ArticleError::InvalidDeadline(article.deadline.to_string()))?;

    let categories = ensure_categories(guild, config).await?;
    let editors = guild.find_role(&config.editors_role_name).await?;
    let writers = resolve_writers(guild, article.writers).await;

    let channel = guild
        .create_text_channel(NewChannel {
            name: slugify(article.title),
            topic: deadline::encode(article.title, deadline),
            category: categories.active,
            overwrites: active_overwrites(editors, &writers.resolved),
        })
        .await?;
    info!(channel_id = %channel.id, title = article.title, deadline = %deadline, "created article channel");

    let checklist = checklist_message(article.title, article.writers, deadline);
    let message = guild.send_message(channel.id, &checklist).await?;
    let pin = match guild.pin_message(channel.id, message).await {
        Ok(()) => Outcome::Done,
        Err(PlatformError::Forbidden(reason)) => {
            debug!(channel_id = %channel.id, reason = %reason, "could not pin checklist");
            Outcome::Skipped(reason)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(CreatedArticle {
        channel,
        deadline,
        writers,
        pin,
    })
}

/// Moves `channel` to the archived category and locks posting to everyone
/// but Editors. Running it twice leaves the channel unchanged.
pub async fn archive<G: GuildApi + ?Sized>(
    guild: &G,
    config: &Config,
    channel: &ArticleChannel,
) -> Result<(), ArticleError> {
    let categories = ensure_categories(guild, config).await?;
    guild.move_channel(channel.id, categories.archived).await?;

    let editors = guild.find_role(&config.editors_role_name).await?;
    let overwrites = archived_overwrites(&channel.overwrites, editors);
    guild.set_overwrites(channel.id, &overwrites).await?;

    info!(channel_id = %channel.id, "archived article channel");
    Ok(())
}

/// Channels in the active category with their decoded deadlines.
pub async fn list_active<G: GuildApi + ?Sized>(
    guild: &G,
    config: &Config,
) -> Result<Vec<ActiveArticle>, ArticleError> {
    let categories = ensure_categories(guild, config).await?;
    let channels = guild.text_channels(categories.active).await?;
    Ok(channels
        .into_iter()
        .map(|channel| ActiveArticle {
            deadline: channel.topic.as_deref().and_then(deadline::decode),
            channel,
        })
        .collect())
}
