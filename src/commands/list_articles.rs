use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::application_command::ApplicationCommandInteraction;
use serenity::prelude::{Context, Mentionable};

use crate::commands;
use crate::config::ConfigStore;
use crate::deadline::discord_timestamp;
use crate::lifecycle::{self, ActiveArticle};
use crate::utils::{defer_ephemeral, interaction_reply_edit};

fn render(articles: &[ActiveArticle]) -> String {
    if articles.is_empty() {
        return "No active article channels.".to_string();
    }
    articles
        .iter()
        .map(|a| match a.deadline {
            Some(deadline) => format!(
                "• {} — deadline {}",
                a.channel.id.mention(),
                discord_timestamp(deadline, 'R')
            ),
            None => format!("• {} — no deadline", a.channel.id.mention()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

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
    let config = store.snapshot().await;

    match lifecycle::list_active(&guild, &config).await {
        Ok(articles) => interaction_reply_edit(command, &ctx, render(&articles)).await,
        Err(e) => commands::reply_error(command, &ctx, e).await,
    }
}

pub fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("list_articles")
        .description("List active article channels and deadlines")
}
