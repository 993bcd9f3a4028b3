//! Cancellable inbox polling
//!
//! Every tick fetches the flat message feed under its own child token of the
//! shutdown token. Starting a tick cancels the one still in flight, and a
//! result is published only when its tick sequence is newer than the last
//! one applied, so a slow response can never overwrite a fresher one.
//! Cancelling the shutdown token stops the loop and every in-flight tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Vertical;
use crate::services::normalizer::message::conversations_from_messages;
use crate::services::normalizer::NormalizeContext;
use crate::services::upstream_client;
use crate::types::{Conversation, InboxMessage};

#[async_trait]
pub trait MessageFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<InboxMessage>>;
}

/// Reads `GET {base}/api/messages` of a running server
pub struct HttpMessageFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpMessageFeed {
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{}/api/messages", base_url.trim_end_matches('/')),
            client: upstream_client(),
        }
    }
}

#[async_trait]
impl MessageFeed for HttpMessageFeed {
    async fn fetch(&self) -> Result<Vec<InboxMessage>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to request message feed")?
            .error_for_status()
            .context("Message feed returned an error status")?;

        response
            .json()
            .await
            .context("Failed to parse message feed")
    }
}

/// Latest applied poll result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxSnapshot {
    /// Sequence number of the tick that produced this snapshot; 0 before the first
    pub seq: u64,
    pub conversations: Vec<Conversation>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Replace `current` with `next` only if `next` comes from a later tick.
pub fn apply_if_newer(current: &mut InboxSnapshot, next: InboxSnapshot) -> bool {
    if next.seq > current.seq {
        *current = next;
        true
    } else {
        false
    }
}

pub struct InboxWatcher {
    feed: Arc<dyn MessageFeed>,
    interval: Duration,
    vertical: Vertical,
    offset: FixedOffset,
    superseded: Arc<AtomicU64>,
}

impl InboxWatcher {
    pub fn new(feed: Arc<dyn MessageFeed>, interval: Duration, vertical: Vertical, offset: FixedOffset) -> Self {
        Self {
            feed,
            interval,
            vertical,
            offset,
            superseded: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Ticks cancelled by their successor before the feed answered. A feed
    /// slower than the interval keeps this growing and never publishes.
    pub fn superseded_ticks(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.superseded)
    }

    /// Start polling. The receiver sees every applied snapshot; the handle
    /// completes once `shutdown` is cancelled and in-flight ticks are reaped.
    pub fn spawn(self, shutdown: CancellationToken) -> (watch::Receiver<InboxSnapshot>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(InboxSnapshot::default());
        let tx = Arc::new(tx);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut seq: u64 = 0;
            let mut in_flight: Option<CancellationToken> = None;
            let mut ticks = JoinSet::new();

            info!("Inbox watcher started (every {:?})", self.interval);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        while ticks.try_join_next().is_some() {}

                        if let Some(previous) = in_flight.take() {
                            previous.cancel();
                        }
                        seq += 1;
                        let tick = shutdown.child_token();
                        in_flight = Some(tick.clone());

                        let feed = Arc::clone(&self.feed);
                        let tx = Arc::clone(&tx);
                        let superseded = Arc::clone(&self.superseded);
                        let stopping = shutdown.clone();
                        let interval = self.interval;
                        let (vertical, offset) = (self.vertical, self.offset);

                        ticks.spawn(async move {
                            tokio::select! {
                                _ = tick.cancelled() => {
                                    if stopping.is_cancelled() {
                                        debug!("Inbox tick {} cancelled by shutdown", seq);
                                    } else {
                                        superseded.fetch_add(1, Ordering::Relaxed);
                                        warn!(
                                            "Inbox tick {} superseded before the feed answered; feed is slower than {:?}",
                                            seq, interval
                                        );
                                    }
                                }
                                result = feed.fetch() => match result {
                                    Ok(messages) => {
                                        let now = Utc::now();
                                        let ctx = NormalizeContext::new(vertical, offset, now);
                                        let snapshot = InboxSnapshot {
                                            seq,
                                            conversations: conversations_from_messages(&messages, &ctx),
                                            fetched_at: Some(now),
                                        };
                                        if !tx.send_if_modified(|current| apply_if_newer(current, snapshot)) {
                                            debug!("Inbox tick {} is stale, dropped", seq);
                                        }
                                    }
                                    Err(e) => warn!("Inbox tick {} failed: {:#}", seq, e),
                                },
                            }
                        });
                    }
                }
            }

            while ticks.join_next().await.is_some() {}
            info!("Inbox watcher stopped");
        });

        (rx, handle)
    }
}
