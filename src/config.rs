use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use serenity::model::prelude::GuildId;
use tokio::sync::RwLock;
use tokio::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "newsroom_config.json";
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub guild_id: Option<u64>,
    pub active_category_name: String,
    pub archived_category_name: String,
    pub editors_role_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            guild_id: None,
            active_category_name: "Active Articles".to_string(),
            archived_category_name: "Archived Articles".to_string(),
            editors_role_name: "Editors".to_string(),
        }
    }
}

impl Config {
    pub fn home_guild(&self) -> Option<GuildId> {
        self.guild_id.map(GuildId)
    }
}

/// The persisted [`Config`] and the file it lives in.
///
/// Only `/setup` writes it back.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Config>,
}

impl ConfigStore {
    /// Loads `path`, falling back to defaults when it is missing or malformed.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_owned();
        let config = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "ignoring malformed config file");
                    Config::default()
                }
            },
            Err(e) => {
                debug!(error = %e, path = %path.display(), "no config file, using defaults");
                Config::default()
            }
        };
        info!(config = ?config, "loaded config");
        ConfigStore {
            path,
            current: RwLock::new(config),
        }
    }

    pub async fn snapshot(&self) -> Config {
        self.current.read().await.clone()
    }

    /// Records `guild` as the home guild and saves.
    pub async fn set_home_guild(&self, guild: GuildId) -> Result<Config, anyhow::Error> {
        let mut current = self.current.write().await;
        current.guild_id = Some(guild.0);
        let raw = serde_json::to_string_pretty(&*current)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("writing config to {}", self.path.display()))?;
        Ok(current.clone())
    }
}

/// Process settings taken from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub config_path: PathBuf,
    pub sweep_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let token = env::var("DISCORD_BOT_TOKEN")
            .context("Please set the DISCORD_BOT_TOKEN environment variable")?;

        let config_path = env::var("ARTICLE_BOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let sweep_interval = match env::var("SWEEP_INTERVAL") {
            Ok(raw) => humantime::parse_duration(&raw)
                .with_context(|| format!("invalid SWEEP_INTERVAL {raw:?}"))?,
            Err(_) => DEFAULT_SWEEP_INTERVAL,
        };

        Ok(Settings {
            token,
            config_path,
            sweep_interval,
        })
    }
}
