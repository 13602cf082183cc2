use chrono::Local;
use serenity::builder::CreateApplicationCommand;
use serenity::model::prelude::application_command::ApplicationCommandInteraction;
use serenity::model::prelude::command::CommandOptionType;
use serenity::prelude::{Context, Mentionable};

use crate::commands;
use crate::config::ConfigStore;
use crate::lifecycle::{self, CreatedArticle, NewArticle};
use crate::utils::{defer_ephemeral, interaction_reply_edit};

fn summary(title: &str, created: &CreatedArticle) -> String {
    let writers = if created.writers.resolved.is_empty() {
        "None".to_string()
    } else {
        created
            .writers
            .resolved
            .iter()
            .map(|w| w.mention().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Created {} for **{title}**. Writers added: {writers}",
        created.channel.id.mention()
    )
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
    let title = commands::string_option(command, "title")
        .ok_or_else(|| anyhow::anyhow!("missing title option"))?;
    let deadline = commands::string_option(command, "deadline")
        .ok_or_else(|| anyhow::anyhow!("missing deadline option"))?;
    let writers = commands::string_option(command, "writers");
    let config = store.snapshot().await;

    let article = NewArticle {
        title,
        deadline,
        writers,
    };
    match lifecycle::create_article(&guild, &config, article, Local::now().naive_local()).await {
        Ok(created) => interaction_reply_edit(command, &ctx, summary(title, &created)).await,
        Err(e) => commands::reply_error(command, &ctx, e).await,
    }
}

pub fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("new_article")
        .description("Create a private channel for an article")
        .create_option(|option| {
            option
                .name("title")
                .description("Article title")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("deadline")
                .description("Deadline (e.g., '2025-09-07 23:00' or 'Sep 7 23:00')")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("writers")
                .description("Mention users separated by spaces")
                .kind(CommandOptionType::String)
                .required(false)
        })
}
