use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::application_command::ApplicationCommandInteraction;
use serenity::model::Permissions;
use serenity::prelude::{Context, Mentionable};

use crate::commands;
use crate::config::ConfigStore;
use crate::lifecycle;
use crate::utils::{defer_ephemeral, interaction_reply_edit};

pub async fn run(
    command: &ApplicationCommandInteraction,
    ctx: Context,
    store: &ConfigStore,
) -> Result<(), anyhow::Error> {
    defer_ephemeral(command, &ctx).await?;

    let (guild_id, guild) = match commands::guild(command, &ctx) {
        Ok(g) => g,
        Err(e) => return commands::reply_error(command, &ctx, e).await,
    };
    let config = store.snapshot().await;

    let report = match lifecycle::setup(&guild, &config).await {
        Ok(r) => r,
        Err(e) => return commands::reply_error(command, &ctx, e).await,
    };
    let config = store.set_home_guild(guild_id).await?;
    info!(guild_id = %guild_id, report = ?report, "setup complete");

    interaction_reply_edit(
        command,
        &ctx,
        format!(
            "Setup complete.\nActive: {}\nArchived: {}\nEditors role: {}",
            config.active_category_name,
            config.archived_category_name,
            report.editors.mention()
        ),
    )
    .await
}

pub fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("setup")
        .description("Initialize categories and set this guild as default.")
        .default_member_permissions(Permissions::MANAGE_CHANNELS)
}
