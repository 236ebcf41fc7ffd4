//! # Feed Poller
//!
//! Periodically posts new discussion-feed submissions into a chat room.
//!
//! Each tick fetches the newest items, keeps the ones newer than the persisted checkpoint,
//! and delivers them oldest first with a pause between sends. The checkpoint only ever
//! moves to an item that was actually sent, and it is committed even when a later send in
//! the same tick fails, so nothing is posted twice.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::application::feed_formatter::FeedFormatter;
use crate::domain::config::FeedConfig;
use crate::domain::traits::{ChatProvider, ConfigStore, FeedSource};
use crate::domain::types::FeedItem;

/// Config store key holding the id of the newest delivered item
pub const CHECKPOINT_KEY: &str = "feed_last_item";

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub subject: String,
    pub limit: usize,
    pub interval: Duration,
    pub pacing: Duration,
}

impl From<&FeedConfig> for PollerSettings {
    fn from(config: &FeedConfig) -> Self {
        Self {
            subject: config.subreddit.clone(),
            limit: config.limit,
            interval: Duration::from_secs(config.interval_secs),
            pacing: Duration::from_secs(config.pacing_secs),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub delivered: Vec<String>,
    /// The stored checkpoint was not inside the fetch window
    pub checkpoint_missing: bool,
}

/// Items newer than `checkpoint`, oldest first.
///
/// `items` must be newest first. When the checkpoint is not in the window every fetched
/// item counts as unseen; the boolean reports that case.
pub fn unseen_items(items: Vec<FeedItem>, checkpoint: Option<&str>) -> (Vec<FeedItem>, bool) {
    let mut pending = Vec::new();
    let mut found = false;
    for item in items {
        if Some(item.id.as_str()) == checkpoint {
            found = true;
            break;
        }
        pending.push(item);
    }
    pending.reverse();
    (pending, !found)
}

pub struct FeedPoller {
    source: Arc<dyn FeedSource>,
    sink: Arc<dyn ChatProvider>,
    store: Arc<dyn ConfigStore>,
    settings: PollerSettings,
}

impl FeedPoller {
    pub fn new(
        source: Arc<dyn FeedSource>,
        sink: Arc<dyn ChatProvider>,
        store: Arc<dyn ConfigStore>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            source,
            sink,
            store,
            settings,
        }
    }

    /// Runs ticks until `shutdown` flips to true.
    ///
    /// Nothing happens before `ready` reports true. Ticks never overlap: the next interval
    /// is only awaited after the previous tick returned.
    pub async fn run(self, mut ready: watch::Receiver<bool>, mut shutdown: watch::Receiver<bool>) {
        tokio::select! {
            ok = raised(&mut ready) => {
                if !ok {
                    tracing::warn!("Feed poller readiness signal dropped, not starting");
                    return;
                }
            }
            _ = raised(&mut shutdown) => return,
        }

        tracing::info!(
            "Feed poller started for '{}' every {:?}",
            self.settings.subject,
            self.settings.interval
        );
        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::error!("Feed poll failed: {:#}", e);
                    }
                }
                _ = raised(&mut shutdown) => break,
            }
        }
        tracing::info!("Feed poller stopped");
    }

    pub async fn tick(&self) -> Result<TickReport> {
        tracing::debug!("Running feed checker");
        let checkpoint = self.store.get(CHECKPOINT_KEY).await;
        tracing::debug!("Current checkpoint is: {:?}", checkpoint);

        let items = self
            .source
            .list_new(&self.settings.subject, self.settings.limit)
            .await
            .context("Error while polling feed submissions")?;

        let (pending, checkpoint_missing) = unseen_items(items, checkpoint.as_deref());
        if pending.is_empty() {
            return Ok(TickReport::default());
        }
        if checkpoint.is_some() && checkpoint_missing {
            tracing::warn!(
                "Checkpoint {:?} not within the last {} items; older submissions may have been missed",
                checkpoint,
                self.settings.limit
            );
        }

        let mut report = TickReport {
            delivered: Vec::new(),
            checkpoint_missing,
        };
        let outcome = self.deliver(&pending, &mut report).await;

        if let Some(last) = report.delivered.last() {
            if checkpoint.as_deref() != Some(last.as_str()) {
                self.store
                    .set(CHECKPOINT_KEY, last)
                    .await
                    .context("Failed to persist feed checkpoint")?;
            }
        }

        outcome.map(|_| report)
    }

    async fn deliver(&self, pending: &[FeedItem], report: &mut TickReport) -> Result<()> {
        for (i, item) in pending.iter().enumerate() {
            if i > 0 && !self.settings.pacing.is_zero() {
                tokio::time::sleep(self.settings.pacing).await;
            }
            let card = FeedFormatter::format_item(item);
            self.sink
                .send_card(&card)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to post submission {}: {}", item.id, e))?;
            report.delivered.push(item.id.clone());
        }
        Ok(())
    }
}

/// Waits until the flag is true; `false` when the sender went away first.
/// The watch guard is released before this returns.
async fn raised(flag: &mut watch::Receiver<bool>) -> bool {
    flag.wait_for(|v| *v).await.is_ok()
}
