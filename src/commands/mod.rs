pub mod archive;
pub mod list_articles;
pub mod new_article;
pub mod ping;
pub mod setup;
pub mod sync_here;

use serenity::builder::CreateApplicationCommands;
use serenity::model::prelude::application_command::{
    ApplicationCommandInteraction, CommandDataOptionValue,
};
use serenity::model::prelude::{ChannelId, GuildId};
use serenity::prelude::Context;

use crate::discord::DiscordGuild;
use crate::error::ArticleError;
use crate::utils::interaction_reply_edit;

pub fn register_all(commands: &mut CreateApplicationCommands) -> &mut CreateApplicationCommands {
    commands
        .create_application_command(|command| ping::register(command))
        .create_application_command(|command| sync_here::register(command))
        .create_application_command(|command| setup::register(command))
        .create_application_command(|command| list_articles::register(command))
        .create_application_command(|command| new_article::register(command))
        .create_application_command(|command| archive::register(command))
}

fn string_option<'a>(command: &'a ApplicationCommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_ref())
        .and_then(|v| v.as_str())
}

fn channel_option(command: &ApplicationCommandInteraction, name: &str) -> Option<ChannelId> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| match &o.resolved {
            Some(CommandDataOptionValue::Channel(channel)) => Some(channel.id),
            _ => None,
        })
}

/// The guild the command was used in, or `NotInGuild`.
fn guild(
    command: &ApplicationCommandInteraction,
    ctx: &Context,
) -> Result<(GuildId, DiscordGuild), ArticleError> {
    let guild_id = command.guild_id.ok_or(ArticleError::NotInGuild)?;
    Ok((guild_id, DiscordGuild::new(ctx.http.clone(), guild_id)))
}

/// Logs `err` and answers the deferred command with its user-facing text.
async fn reply_error(
    command: &ApplicationCommandInteraction,
    ctx: &Context,
    err: ArticleError,
) -> Result<(), anyhow::Error> {
    match &err {
        ArticleError::Platform(_) | ArticleError::MissingPermissions(_) => {
            warn!(error = %err, "command failed")
        }
        _ => debug!(error = %err, "rejected command input"),
    }
    interaction_reply_edit(command, ctx, err.user_message()).await
}
