//! The slice of the chat platform the article workflow talks to.
//!
//! [`crate::discord::DiscordGuild`] implements it over serenity's HTTP client;
//! tests use an in-memory guild instead.

use serenity::async_trait;
use serenity::model::prelude::{ChannelId, MessageId, RoleId, UserId};
use thiserror::Error;

use crate::permissions::Overwrites;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{category} error: {detail}")]
    Other {
        category: &'static str,
        detail: String,
    },
}

impl PlatformError {
    pub fn category(&self) -> &'static str {
        match self {
            PlatformError::Forbidden(_) => "Forbidden",
            PlatformError::NotFound(_) => "NotFound",
            PlatformError::Other { category, .. } => category,
        }
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// A text channel as the workflow sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleChannel {
    pub id: ChannelId,
    pub name: String,
    pub topic: Option<String>,
    pub category: Option<ChannelId>,
    pub overwrites: Overwrites,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChannel {
    pub name: String,
    pub topic: String,
    pub category: ChannelId,
    pub overwrites: Overwrites,
}

#[async_trait]
pub trait GuildApi: Send + Sync {
    async fn find_category(&self, name: &str) -> PlatformResult<Option<ChannelId>>;

    async fn create_category(&self, name: &str) -> PlatformResult<ChannelId>;

    async fn find_role(&self, name: &str) -> PlatformResult<Option<RoleId>>;

    async fn create_role(&self, name: &str) -> PlatformResult<RoleId>;

    /// `Ok(None)` when the user is not a member of the guild.
    async fn member(&self, user: UserId) -> PlatformResult<Option<UserId>>;

    async fn create_text_channel(&self, channel: NewChannel) -> PlatformResult<ArticleChannel>;

    /// Text channels under `category`, in the platform's channel order.
    async fn text_channels(&self, category: ChannelId) -> PlatformResult<Vec<ArticleChannel>>;

    /// `Ok(None)` when `id` is not a text channel of this guild.
    async fn text_channel(&self, id: ChannelId) -> PlatformResult<Option<ArticleChannel>>;

    async fn move_channel(&self, channel: ChannelId, category: ChannelId) -> PlatformResult<()>;

    /// Replaces every overwrite on the channel.
    async fn set_overwrites(&self, channel: ChannelId, overwrites: &Overwrites)
        -> PlatformResult<()>;

    async fn send_message(&self, channel: ChannelId, content: &str) -> PlatformResult<MessageId>;

    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()>;
}
