//! One import run: fetch, normalize, enrich, assemble.

use fantasy_api::types::BootstrapStatic;
use fantasy_api::Client;

use crate::config::Config;
use crate::data::Data;
use crate::enrich::{enrich_players, EnrichProgress};
use crate::error::{AggregateError, EnrichCause, IngestError};
use crate::models::{GameweekID, ManagerID, ManagerPick};
use crate::normalize::{history_from_summary, Normalizer};
use crate::picks::{manager_picks, ManagerSquad};
use crate::validation::{validate_concurrency, validate_gameweek, validate_manager_id};

/// Drives the provider API to build a [`Data`] graph.
pub struct Ingestor {
    client: Client,
    config: Config,
}

impl Ingestor {
    /// Builds a client from `config.base_url` and `config.retry`.
    pub fn new(config: Config) -> Result<Self, IngestError> {
        let client = Client::with_base_url(&config.base_url)?.with_retry_policy(config.retry);
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: Config) -> Result<Self, IngestError> {
        validate_concurrency(config.concurrency)?;
        for &manager_id in &config.manager_ids {
            validate_manager_id(manager_id)?;
        }
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches and assembles one complete snapshot.
    ///
    /// Any player that cannot be normalized or enriched rejects the whole
    /// run with [`IngestError::Players`]; fixtures are only fetched once every
    /// player is accounted for.
    pub async fn fetch_data<P>(&self, progress: P) -> Result<Data, IngestError>
    where
        P: FnMut(EnrichProgress),
    {
        let bootstrap = self.client.get_bootstrap_static().await?;
        let normalizer = Normalizer::from_bootstrap(&bootstrap);
        self.assemble(&bootstrap, normalizer, progress).await
    }

    /// Like [`fetch_data`](Self::fetch_data), pinned to the live gameweek.
    ///
    /// The provider only serves the current snapshot, so a `requested`
    /// gameweek other than the live one is rejected with
    /// [`IngestError::InvalidInput`] before any player history is fetched.
    /// Returns the gameweek the snapshot and its manager picks belong to.
    pub async fn fetch_gameweek<P>(
        &self,
        requested: Option<GameweekID>,
        progress: P,
    ) -> Result<(GameweekID, Data), IngestError>
    where
        P: FnMut(EnrichProgress),
    {
        let bootstrap = self.client.get_bootstrap_static().await?;
        let normalizer = Normalizer::from_bootstrap(&bootstrap);
        let live = normalizer
            .current_gameweek()
            .map(|gw| gw.id)
            .ok_or(IngestError::NoCurrentGameweek)?;
        if let Some(gameweek) = requested {
            if gameweek != live {
                return Err(IngestError::InvalidInput(format!(
                    "gameweek {} has not been imported and the live gameweek is {}",
                    gameweek, live
                )));
            }
        }

        let data = self.assemble(&bootstrap, normalizer, progress).await?;
        Ok((live, data))
    }

    async fn assemble<P>(
        &self,
        bootstrap: &BootstrapStatic,
        mut normalizer: Normalizer,
        progress: P,
    ) -> Result<Data, IngestError>
    where
        P: FnMut(EnrichProgress),
    {
        tracing::info!(
            "Bootstrap: {} teams, {} gameweeks, {} players",
            normalizer.team_count(),
            bootstrap.events.len(),
            bootstrap.elements.len()
        );

        let (players, mut errors) = normalizer.normalize_players(&bootstrap.elements);
        if !errors.is_empty() {
            tracing::warn!("{} players failed normalization", errors.len());
        }

        let client = self.client.clone();
        let report = enrich_players(
            players,
            self.config.concurrency,
            move |player_id| {
                let client = client.clone();
                async move {
                    let summary = client.get_element_summary(player_id).await?;
                    Ok::<_, EnrichCause>(history_from_summary(&summary))
                }
            },
            progress,
        )
        .await;

        errors.extend(report.errors);
        AggregateError::new(bootstrap.elements.len(), errors).into_result()?;

        let fixtures = self.client.get_fixtures().await?;
        let dropped = normalizer.add_fixtures(&fixtures);
        tracing::info!(
            "Fixtures: {} kept, {} dropped",
            normalizer.fixtures().len(),
            dropped
        );

        let mut picks = Vec::new();
        if !self.config.manager_ids.is_empty() {
            let gameweek = normalizer
                .current_gameweek()
                .map(|gw| gw.id)
                .ok_or(IngestError::NoCurrentGameweek)?;
            for &manager_id in &self.config.manager_ids {
                picks.extend(self.fetch_manager_picks(manager_id, gameweek).await?);
            }
        }

        let mut players = report.players;
        players.sort_by_key(|p| p.id);
        Ok(normalizer.into_data(players, picks))
    }

    pub async fn fetch_manager_picks(
        &self,
        manager_id: ManagerID,
        gameweek: GameweekID,
    ) -> Result<Vec<ManagerPick>, IngestError> {
        validate_manager_id(manager_id)?;
        validate_gameweek(gameweek)?;
        let raw = self.client.get_manager_picks(manager_id, gameweek).await?;
        tracing::debug!("Manager {}: {} picks", manager_id, raw.picks.len());
        Ok(manager_picks(manager_id, gameweek, &raw))
    }

    /// Fetches a manager's picks for `gameweek` and lines them up against `data`.
    pub async fn fetch_manager_squad<'a>(
        &self,
        data: &'a Data,
        manager_id: ManagerID,
        gameweek: GameweekID,
    ) -> Result<ManagerSquad<'a>, IngestError> {
        validate_manager_id(manager_id)?;
        validate_gameweek(gameweek)?;
        let raw = self.client.get_manager_picks(manager_id, gameweek).await?;
        Ok(ManagerSquad::resolve(data, manager_id, gameweek, &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_concurrency() {
        let config = Config {
            concurrency: 0,
            ..Config::default()
        };
        let client = Client::with_base_url("http://localhost:1").unwrap();
        assert!(matches!(
            Ingestor::with_client(client, config),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_non_positive_manager() {
        let config = Config {
            manager_ids: vec![12, -1],
            ..Config::default()
        };
        assert!(matches!(
            Ingestor::new(config),
            Err(IngestError::InvalidInput(_))
        ));
    }
}
