use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use serenity::prelude::*;
use tracing::{error, info};

use newsroom_bot::config::{ConfigStore, Settings};
use newsroom_bot::handler::Handler;
use newsroom_bot::sweep;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_default(),
        ))
        .init();

    let settings = Settings::from_env()?;
    let store = Arc::new(ConfigStore::load(&settings.config_path).await);
    let (ready_tx, ready_rx) = sweep::readiness();

    let intents = GatewayIntents::non_privileged();
    let mut client = Client::builder(&settings.token, intents)
        .event_handler(Handler::new(store.clone(), ready_tx))
        .await?;

    let shard_manager = client.shard_manager.clone();
    let http = client.cache_and_http.http.clone();
    let sweeper = sweep::start(http, store, settings.sweep_interval, ready_rx);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "could not register ctrl+c handler");
            return;
        }
        info!("shutting down");
        sweeper.abort();
        shard_manager.lock().await.shutdown_all().await;
    });

    // start listening for events by starting a single shard
    if let Err(why) = client.start().await {
        error!(error = %why, "An error occurred while running the client");
    }
    Ok(())
}
