use std::sync::Arc;

use serenity::async_trait;
use serenity::model::prelude::*;
use serenity::prelude::*;

use tokio::sync::watch;
use tracing::Instrument;
use tracing::Level;

use crate::commands;
use crate::config::ConfigStore;
use crate::sweep::Readiness;
use crate::utils::{interaction_reply_edit, interaction_reply_ephemeral};

pub struct Handler {
    store: Arc<ConfigStore>,
    ready: watch::Sender<Readiness>,
}

impl Handler {
    pub fn new(store: Arc<ConfigStore>, ready: watch::Sender<Readiness>) -> Self {
        Handler { store, ready }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = ?ready.user, guilds = ready.guilds.len(), "Bot is connected!");
        self.ready.send_replace(Readiness::Ready);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                let span = span!(
                    Level::DEBUG,
                    "application_command",
                    interaction_id = command.id.0,
                    guild_id = %command.guild_id.unwrap_or_default(),
                    channel_id = %command.channel_id,
                    user = %command.user,
                    command_name = %command.data.name
                );

                async {
                    trace!(command = ?command, "received command interaction");
                    let store = self.store.as_ref();
                    let res = match command.data.name.as_str() {
                        "ping" => commands::ping::run(&command, ctx.clone()).await,
                        "sync_here" => commands::sync_here::run(&command, ctx.clone()).await,
                        "setup" => commands::setup::run(&command, ctx.clone(), store).await,
                        "list_articles" => {
                            commands::list_articles::run(&command, ctx.clone(), store).await
                        }
                        "new_article" => {
                            commands::new_article::run(&command, ctx.clone(), store).await
                        }
                        "archive" => commands::archive::run(&command, ctx.clone(), store).await,
                        _ => {
                            warn!(command_name = %command.data.name, command_options = ?command.data.options, "unknown command received");
                            interaction_reply_ephemeral(&command, &ctx, "Command is currently not implemented").await
                        }
                    };

                    if let Err(why) = res {
                        warn!(error = %why, "Cannot respond to slash command");
                        let reply = ":x: There was an error processing this command.";
                        if interaction_reply_edit(&command, &ctx, reply).await.is_err() {
                            interaction_reply_ephemeral(&command, &ctx, reply).await.ok();
                        }
                    }
                }
                .instrument(span)
                .await;
            }
            _ => {
                trace!("ignoring non-command interaction");
            }
        }
    }

    async fn guild_create(&self, ctx: Context, guild: Guild) {
        let commands =
            GuildId::set_application_commands(&guild.id, &ctx, commands::register_all).await;

        if let Err(why) = commands {
            error!(error = %why, guild_id = %guild.id, "Failed to register commands.");
        }
    }
}
