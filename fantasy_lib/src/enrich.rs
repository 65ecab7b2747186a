//! Concurrent per-player history enrichment.
//!
//! Uses the Semaphore + JoinSet + mpsc pattern: every player gets a task, the
//! semaphore caps how many fetches are in flight, and each task reports exactly
//! one message. The coordinator drains the channel until all senders are gone,
//! so it only returns once every player is accounted for.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::error::{EnrichCause, EnrichError};
use crate::models::{FixtureID, Player, PlayerFixture, PlayerID};

/// Concurrency used when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Snapshot handed to the progress callback after every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichProgress {
    pub done: usize,
    pub failed: usize,
    pub total: usize,
}

/// Message sent from a worker task back to the coordinator.
enum EnrichMessage {
    Enriched(Player),
    Failed(EnrichError),
}

/// Outcome of one enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichReport {
    pub players: Vec<Player>,
    pub errors: Vec<EnrichError>,
    /// Messages received over the channel. Players whose task died without
    /// reporting show up in `errors` but not here.
    pub received: usize,
}

impl EnrichReport {
    pub fn total(&self) -> usize {
        self.players.len() + self.errors.len()
    }
}

/// Attaches match history to every player, at most `concurrency` at a time.
///
/// `fetch` is called once per player id. Player ids are expected to be unique.
/// Result order is not significant.
pub async fn enrich_players<F, Fut, P>(
    players: Vec<Player>,
    concurrency: usize,
    fetch: F,
    mut progress: P,
) -> EnrichReport
where
    F: Fn(PlayerID) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HashMap<FixtureID, PlayerFixture>, EnrichCause>> + Send + 'static,
    P: FnMut(EnrichProgress),
{
    let total = players.len();
    let concurrency = concurrency.max(1);
    let mut pending: HashMap<PlayerID, String> = players
        .iter()
        .map(|p| (p.id, p.name.clone()))
        .collect();

    tracing::info!(
        "Enriching {} players with match history ({} at a time)",
        total,
        concurrency
    );

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let fetch = Arc::new(fetch);
    let (tx, mut rx) = mpsc::channel::<EnrichMessage>(concurrency * 2);
    let mut join_set = JoinSet::new();

    for mut player in players {
        let sem = Arc::clone(&semaphore);
        let sender = tx.clone();
        let fetch = Arc::clone(&fetch);

        join_set.spawn(async move {
            let message = match sem.acquire_owned().await {
                Ok(_permit) => match fetch(player.id).await {
                    Ok(history) => {
                        player.history = history;
                        EnrichMessage::Enriched(player)
                    }
                    Err(cause) => EnrichMessage::Failed(EnrichError::new(
                        player.id,
                        player.name,
                        cause,
                    )),
                },
                Err(_) => EnrichMessage::Failed(EnrichError::new(
                    player.id,
                    player.name,
                    EnrichCause::Worker("worker pool closed".to_string()),
                )),
            };
            let _ = sender.send(message).await;
        });
    }
    drop(tx);

    let mut report = EnrichReport::default();
    while let Some(message) = rx.recv().await {
        report.received += 1;
        match message {
            EnrichMessage::Enriched(player) => {
                pending.remove(&player.id);
                report.players.push(player);
            }
            EnrichMessage::Failed(err) => {
                tracing::debug!("{}", err);
                pending.remove(&err.player_id);
                report.errors.push(err);
            }
        }
        progress(EnrichProgress {
            done: report.received,
            failed: report.errors.len(),
            total,
        });
    }

    let mut worker_failure = None;
    while let Some(joined) = join_set.join_next().await {
        if let Err(err) = joined {
            worker_failure.get_or_insert_with(|| err.to_string());
        }
    }

    // Tasks that died before sending still count toward the barrier.
    for (player_id, name) in pending {
        let reason = worker_failure
            .clone()
            .unwrap_or_else(|| "no result reported".to_string());
        report
            .errors
            .push(EnrichError::new(player_id, name, EnrichCause::Worker(reason)));
    }

    tracing::info!(
        "Enrichment finished: {} ok, {} failed",
        report.players.len(),
        report.errors.len()
    );
    report
}
