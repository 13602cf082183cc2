use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::application_command::ApplicationCommandInteraction;
use serenity::model::Permissions;
use serenity::prelude::Context;

use crate::commands;
use crate::error::ArticleError;
use crate::utils::{defer_ephemeral, interaction_reply_edit};

pub async fn run(
    command: &ApplicationCommandInteraction,
    ctx: Context,
) -> Result<(), anyhow::Error> {
    defer_ephemeral(command, &ctx).await?;

    let Some(guild_id) = command.guild_id else {
        return commands::reply_error(command, &ctx, ArticleError::NotInGuild).await;
    };

    let is_admin = command
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .map_or(false, |p| p.administrator());
    if !is_admin {
        info!(user = %command.user, "non-admin tried to sync commands");
        return interaction_reply_edit(command, &ctx, ":x: Only administrators can sync commands.")
            .await;
    }

    let registered = guild_id
        .set_application_commands(&ctx.http, commands::register_all)
        .await?;
    info!(guild_id = %guild_id, count = registered.len(), "synced commands");

    interaction_reply_edit(command, &ctx, "Commands synced to this server.").await
}

pub fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("sync_here")
        .description("Force-sync commands to this server (admin only)")
        .default_member_permissions(Permissions::ADMINISTRATOR)
}
