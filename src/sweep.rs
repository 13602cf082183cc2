//! Periodic auto-archiving of article channels past their deadline.

use std::future::Future;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serenity::http::Http;
use serenity::model::prelude::{ChannelId, GuildId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing_futures::Instrument;

use crate::config::{Config, ConfigStore};
use crate::discord::DiscordGuild;
use crate::error::ArticleError;
use crate::lifecycle::{self, ActiveArticle};
use crate::platform::{GuildApi, PlatformResult};

pub const DEADLINE_NOTICE: &str = "⏰ Deadline passed — archiving channel.";

/// Whether the gateway has reported ready. The sweep never fires before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
}

pub fn readiness() -> (watch::Sender<Readiness>, watch::Receiver<Readiness>) {
    watch::channel(Readiness::NotReady)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveAction {
    pub channel: ChannelId,
    pub deadline: NaiveDateTime,
}

/// Picks the channels whose deadline is strictly before `now`.
pub fn plan_sweep(now: NaiveDateTime, active: &[ActiveArticle]) -> Vec<ArchiveAction> {
    active
        .iter()
        .filter_map(|article| match article.deadline {
            Some(deadline) if deadline < now => Some(ArchiveAction {
                channel: article.channel.id,
                deadline,
            }),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub archived: Vec<ChannelId>,
    pub failed: Vec<(ChannelId, ArticleError)>,
}

/// One pass over the active category. A failure on one channel does not stop
/// the others.
pub async fn run_sweep<G: GuildApi + ?Sized>(
    guild: &G,
    config: &Config,
    now: NaiveDateTime,
) -> Result<SweepReport, ArticleError> {
    let active = lifecycle::list_active(guild, config).await?;
    let mut report = SweepReport::default();

    for action in plan_sweep(now, &active) {
        let Some(article) = active.iter().find(|a| a.channel.id == action.channel) else {
            continue;
        };
        let result: Result<(), ArticleError> = async {
            guild.send_message(action.channel, DEADLINE_NOTICE).await?;
            lifecycle::archive(guild, config, &article.channel).await
        }
        .await;

        match result {
            Ok(()) => {
                info!(channel_id = %action.channel, deadline = %action.deadline, "auto-archived past deadline");
                report.archived.push(action.channel);
            }
            Err(e) => {
                warn!(channel_id = %action.channel, error = %e, "failed to auto-archive channel");
                report.failed.push((action.channel, e));
            }
        }
    }
    Ok(report)
}

/// Sweeps the configured home guild, if there is one `resolve` can reach.
///
/// Returns `None` when the tick was skipped or the active category could not
/// be read.
pub async fn tick<G, F, Fut>(store: &ConfigStore, resolve: F) -> Option<SweepReport>
where
    G: GuildApi,
    F: FnOnce(GuildId) -> Fut,
    Fut: Future<Output = PlatformResult<Option<G>>>,
{
    let config = store.snapshot().await;
    let Some(guild_id) = config.home_guild() else {
        debug!("no home guild configured, skipping sweep");
        return None;
    };

    let guild = match resolve(guild_id).await {
        Ok(Some(guild)) => guild,
        Ok(None) => {
            debug!(guild_id = %guild_id, "home guild not reachable, skipping sweep");
            return None;
        }
        Err(e) => {
            warn!(guild_id = %guild_id, error = %e, "could not resolve home guild");
            return None;
        }
    };

    match run_sweep(&guild, &config, Local::now().naive_local()).await {
        Ok(report) => {
            debug!(
                archived = report.archived.len(),
                failed = report.failed.len(),
                "sweep finished"
            );
            Some(report)
        }
        Err(e) => {
            warn!(error = %e, "sweep failed");
            None
        }
    }
}

async fn sweep_loop<G, F, Fut>(
    store: Arc<ConfigStore>,
    period: Duration,
    mut ready: watch::Receiver<Readiness>,
    resolve: F,
) where
    G: GuildApi,
    F: Fn(GuildId) -> Fut,
    Fut: Future<Output = PlatformResult<Option<G>>>,
{
    if ready.wait_for(|r| *r == Readiness::Ready).await.is_err() {
        return;
    }
    info!(period = %humantime::format_duration(period), "starting deadline sweep");

    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        tick(&store, &resolve).await;
    }
}

/// Spawns the sweep loop. It waits for [`Readiness::Ready`] and then ticks
/// every `period`, the first tick immediately.
pub fn start(
    http: Arc<Http>,
    store: Arc<ConfigStore>,
    period: Duration,
    ready: watch::Receiver<Readiness>,
) -> JoinHandle<()> {
    let resolve = move |guild_id: GuildId| DiscordGuild::resolve(http.clone(), guild_id);
    tokio::spawn(sweep_loop(store, period, ready, resolve).instrument(info_span!("sweep")))
}
