use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::application_command::ApplicationCommandInteraction;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::ChannelType;
use serenity::prelude::{Context, Mentionable};

use crate::commands;
use crate::config::ConfigStore;
use crate::error::ArticleError;
use crate::lifecycle;
use crate::platform::GuildApi;
use crate::utils::{defer_ephemeral, interaction_reply_edit};

pub async fn run(
    command: &ApplicationCommandInteraction,
    ctx: Context,
    store: &ConfigStore,
) -> Result<(), anyhow::Error> {
    defer_ephemeral(command, &ctx).await?;

    let (_, guild) = match commands::guild(command, &ctx) {
        Ok(g) => g,
        Err(e) => return commands::reply_error(command, &ctx, e).await,
    };
    let target = commands::channel_option(command, "channel").unwrap_or(command.channel_id);
    let config = store.snapshot().await;

    let channel = match guild.text_channel(target).await {
        Ok(Some(channel)) => channel,
        Ok(None) => return commands::reply_error(command, &ctx, ArticleError::NotTextChannel).await,
        Err(e) => return commands::reply_error(command, &ctx, e.into()).await,
    };

    match lifecycle::archive(&guild, &config, &channel).await {
        Ok(()) => {
            interaction_reply_edit(
                command,
                &ctx,
                format!(
                    "Archived {} (posting locked; Editors can still post).",
                    channel.id.mention()
                ),
            )
            .await
        }
        Err(e) => commands::reply_error(command, &ctx, e).await,
    }
}

pub fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("archive")
        .description("Archive an article channel (defaults to current channel)")
        .create_option(|option| {
            option
                .name("channel")
                .description("Channel to archive (optional)")
                .kind(CommandOptionType::Channel)
                .channel_types(&[ChannelType::Text, ChannelType::News])
                .required(false)
        })
}
