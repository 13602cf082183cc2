use std::sync::Arc;

use serenity::async_trait;
use serenity::http::error::Error as HttpError;
use serenity::http::Http;
use serenity::model::prelude::{
    Channel, ChannelId, ChannelType, GuildChannel, GuildId, MessageId, PermissionOverwrite,
    PermissionOverwriteType, RoleId, UserId,
};
use serenity::model::ModelError;
use serenity::Error as SerenityError;

use crate::permissions::{Grant, Overwrites, Target};
use crate::platform::{ArticleChannel, GuildApi, NewChannel, PlatformError, PlatformResult};

impl From<SerenityError> for PlatformError {
    fn from(err: SerenityError) -> Self {
        match &err {
            SerenityError::Http(http) => match http.as_ref() {
                HttpError::UnsuccessfulRequest(response) => match response.status_code.as_u16() {
                    403 => PlatformError::Forbidden(response.error.message.clone()),
                    404 => PlatformError::NotFound(response.error.message.clone()),
                    _ => PlatformError::Other {
                        category: "Http",
                        detail: err.to_string(),
                    },
                },
                _ => PlatformError::Other {
                    category: "Http",
                    detail: err.to_string(),
                },
            },
            SerenityError::Model(ModelError::InvalidPermissions(missing)) => {
                PlatformError::Forbidden(format!("missing {missing:?}"))
            }
            SerenityError::Model(_) => PlatformError::Other {
                category: "Model",
                detail: err.to_string(),
            },
            SerenityError::Json(_) => PlatformError::Other {
                category: "Json",
                detail: err.to_string(),
            },
            SerenityError::Io(_) => PlatformError::Other {
                category: "Io",
                detail: err.to_string(),
            },
            _ => PlatformError::Other {
                category: "Serenity",
                detail: err.to_string(),
            },
        }
    }
}

/// Plain text and announcement channels both carry articles.
fn is_article_kind(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News)
}

/// A guild reached through serenity's REST client.
#[derive(Clone)]
pub struct DiscordGuild {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl DiscordGuild {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        DiscordGuild { http, guild_id }
    }

    /// Looks the guild up, `Ok(None)` if the bot cannot see it.
    pub async fn resolve(http: Arc<Http>, guild_id: GuildId) -> PlatformResult<Option<Self>> {
        match http.get_guild(guild_id.0).await.map_err(PlatformError::from) {
            Ok(_) => Ok(Some(DiscordGuild::new(http, guild_id))),
            Err(PlatformError::NotFound(_)) | Err(PlatformError::Forbidden(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[allow(unreachable_patterns)]
    fn target(&self, kind: PermissionOverwriteType) -> Option<Target> {
        match kind {
            PermissionOverwriteType::Role(role) if role.0 == self.guild_id.0 => {
                Some(Target::Everyone)
            }
            PermissionOverwriteType::Role(role) => Some(Target::Role(role)),
            PermissionOverwriteType::Member(user) => Some(Target::Member(user)),
            other => {
                warn!(kind = ?other, "skipping overwrite of unknown kind");
                None
            }
        }
    }

    fn to_overwrites(&self, raw: &[PermissionOverwrite]) -> Overwrites {
        raw.iter()
            .filter_map(|o| {
                self.target(o.kind)
                    .map(|target| (target, Grant::from_permissions(o.allow, o.deny)))
            })
            .collect()
    }

    fn to_serenity(&self, overwrites: &Overwrites) -> Vec<PermissionOverwrite> {
        overwrites
            .iter()
            .filter_map(|(target, grant)| {
                let kind = match target {
                    Target::Everyone => PermissionOverwriteType::Role(RoleId(self.guild_id.0)),
                    Target::Role(role) => PermissionOverwriteType::Role(*role),
                    Target::Member(user) => PermissionOverwriteType::Member(*user),
                    Target::Unrecognized(id) => {
                        warn!(id, "cannot write overwrite for unrecognized target");
                        return None;
                    }
                };
                let (allow, deny) = grant.to_permissions();
                Some(PermissionOverwrite { allow, deny, kind })
            })
            .collect()
    }

    fn article_channel(&self, channel: GuildChannel) -> ArticleChannel {
        ArticleChannel {
            overwrites: self.to_overwrites(&channel.permission_overwrites),
            id: channel.id,
            name: channel.name,
            topic: channel.topic,
            category: channel.parent_id,
        }
    }
}

#[async_trait]
impl GuildApi for DiscordGuild {
    async fn find_category(&self, name: &str) -> PlatformResult<Option<ChannelId>> {
        let channels = self.guild_id.channels(&self.http).await?;
        let mut categories: Vec<&GuildChannel> = channels
            .values()
            .filter(|c| c.kind == ChannelType::Category && c.name == name)
            .collect();
        categories.sort_by_key(|c| (c.position, c.id));
        Ok(categories.first().map(|c| c.id))
    }

    async fn create_category(&self, name: &str) -> PlatformResult<ChannelId> {
        info!(guild_id = %self.guild_id, name, "creating category");
        let category = self
            .guild_id
            .create_channel(&self.http, |c| c.name(name).kind(ChannelType::Category))
            .await?;
        Ok(category.id)
    }

    async fn find_role(&self, name: &str) -> PlatformResult<Option<RoleId>> {
        let roles = self.guild_id.roles(&self.http).await?;
        let mut matching: Vec<RoleId> = roles
            .values()
            .filter(|r| r.name == name)
            .map(|r| r.id)
            .collect();
        matching.sort();
        Ok(matching.first().copied())
    }

    async fn create_role(&self, name: &str) -> PlatformResult<RoleId> {
        info!(guild_id = %self.guild_id, name, "creating role");
        let role = self
            .guild_id
            .create_role(&self.http, |r| r.name(name))
            .await?;
        Ok(role.id)
    }

    async fn member(&self, user: UserId) -> PlatformResult<Option<UserId>> {
        match self.http.get_member(self.guild_id.0, user.0).await {
            Ok(member) => Ok(Some(member.user.id)),
            Err(e) => match PlatformError::from(e) {
                PlatformError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn create_text_channel(&self, channel: NewChannel) -> PlatformResult<ArticleChannel> {
        let permissions = self.to_serenity(&channel.overwrites);
        let created = self
            .guild_id
            .create_channel(&self.http, |c| {
                c.name(&channel.name)
                    .kind(ChannelType::Text)
                    .category(channel.category)
                    .topic(&channel.topic)
                    .permissions(permissions)
            })
            .await?;
        Ok(self.article_channel(created))
    }

    async fn text_channels(&self, category: ChannelId) -> PlatformResult<Vec<ArticleChannel>> {
        let channels = self.guild_id.channels(&self.http).await?;
        let mut text: Vec<GuildChannel> = channels
            .into_values()
            .filter(|c| is_article_kind(c.kind) && c.parent_id == Some(category))
            .collect();
        text.sort_by_key(|c| (c.position, c.id));
        Ok(text
            .into_iter()
            .map(|c| self.article_channel(c))
            .collect())
    }

    async fn text_channel(&self, id: ChannelId) -> PlatformResult<Option<ArticleChannel>> {
        match self.http.get_channel(id.0).await? {
            Channel::Guild(c) if c.guild_id == self.guild_id && is_article_kind(c.kind) => {
                Ok(Some(self.article_channel(c)))
            }
            _ => Ok(None),
        }
    }

    async fn move_channel(&self, channel: ChannelId, category: ChannelId) -> PlatformResult<()> {
        channel.edit(&self.http, |c| c.category(category)).await?;
        Ok(())
    }

    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: &Overwrites,
    ) -> PlatformResult<()> {
        let permissions = self.to_serenity(overwrites);
        channel
            .edit(&self.http, |c| c.permissions(permissions))
            .await?;
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> PlatformResult<MessageId> {
        let message = channel.say(&self.http, content).await?;
        Ok(message.id)
    }

    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> PlatformResult<()> {
        channel.pin(&self.http, message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_channels_count_as_articles() {
        assert!(is_article_kind(ChannelType::Text));
        assert!(is_article_kind(ChannelType::News));
        assert!(!is_article_kind(ChannelType::Voice));
        assert!(!is_article_kind(ChannelType::Category));
    }

    #[test]
    fn everyone_role_shares_the_guild_id() {
        let guild = DiscordGuild::new(Arc::new(Http::new("token")), GuildId(10));

        assert_eq!(
            guild.target(PermissionOverwriteType::Role(RoleId(10))),
            Some(Target::Everyone)
        );
        assert_eq!(
            guild.target(PermissionOverwriteType::Role(RoleId(11))),
            Some(Target::Role(RoleId(11)))
        );
        assert_eq!(
            guild.target(PermissionOverwriteType::Member(UserId(12))),
            Some(Target::Member(UserId(12)))
        );
    }
}
