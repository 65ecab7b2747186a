//! Library layer for betterfantasy: domain model, ingestion pipeline, and snapshot store.
//!
//! Wraps the `fantasy_api` client with the normalizer that turns provider
//! payloads into a [`Data`] graph, the bounded enrichment pool that attaches
//! per-player match history, and the SQLite store that persists one snapshot
//! per gameweek.

pub mod config;
pub mod data;
pub mod db;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod picks;
pub mod validation;

pub use fantasy_api;
pub use fantasy_api::types;

pub use config::Config;
pub use data::{Data, StartingPlayer};
pub use db::{Db, DbError, DumpOutcome, StoreOptions, StoreSummary};
pub use enrich::{EnrichProgress, DEFAULT_CONCURRENCY};
pub use error::{AggregateError, EnrichCause, EnrichError, IngestError};
pub use ingest::Ingestor;
pub use models::{
    Fixture, FixtureID, Gameweek, GameweekID, ManagerID, ManagerPick, Player, PlayerFixture,
    PlayerID, PlayerStats, PlayerType, PlayerTypeID, Team, TeamID,
};
pub use normalize::NormalizeError;
pub use picks::{ManagerSquad, SquadPlayer};
