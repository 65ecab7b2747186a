//! Error types for the ingestion pipeline.

use std::fmt;

use crate::models::PlayerID;
use crate::normalize::NormalizeError;

/// Why a single player could not be built.
#[derive(thiserror::Error, Debug)]
pub enum EnrichCause {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("history fetch failed: {0}")]
    Fetch(#[from] fantasy_api::Error),
    #[error("worker stopped before reporting: {0}")]
    Worker(String),
}

/// A per-player failure, labeled with the player it belongs to.
#[derive(thiserror::Error, Debug)]
#[error("player {player_id} ({name}): {cause}")]
pub struct EnrichError {
    pub player_id: PlayerID,
    pub name: String,
    #[source]
    pub cause: EnrichCause,
}

impl EnrichError {
    pub fn new(player_id: PlayerID, name: impl Into<String>, cause: impl Into<EnrichCause>) -> Self {
        Self {
            player_id,
            name: name.into(),
            cause: cause.into(),
        }
    }

    pub fn is_referential(&self) -> bool {
        matches!(
            self.cause,
            EnrichCause::Normalize(NormalizeError::MissingReference { .. })
        )
    }
}

/// Every per-player failure of one import, collected after the barrier.
///
/// A non-empty aggregate rejects the whole import.
#[derive(Debug)]
pub struct AggregateError {
    /// Players discovered in the bulk payload.
    pub total: usize,
    pub errors: Vec<EnrichError>,
}

impl AggregateError {
    pub fn new(total: usize, errors: Vec<EnrichError>) -> Self {
        Self { total, errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing failed, otherwise the aggregate itself.
    pub fn into_result(self) -> Result<(), AggregateError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} players could not be built:",
            self.errors.len(),
            self.total
        )?;
        for err in &self.errors {
            write!(f, "\n\t* {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Errors that abort an import run.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("API error: {0}")]
    Api(#[from] fantasy_api::Error),
    #[error("there was a problem building players: {0}")]
    Players(#[from] AggregateError),
    #[error("the provider reported no current gameweek")]
    NoCurrentGameweek,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_error_names_player() {
        let err = EnrichError::new(
            402,
            "Haaland",
            NormalizeError::MissingReference {
                kind: "player type",
                id: 4,
            },
        );
        assert_eq!(
            err.to_string(),
            "player 402 (Haaland): missing player type ID '4'"
        );
        assert!(err.is_referential());
    }

    #[test]
    fn aggregate_lists_each_failure() {
        let agg = AggregateError::new(
            3,
            vec![
                EnrichError::new(1, "A", EnrichCause::Worker("panicked".into())),
                EnrichError::new(
                    2,
                    "B",
                    fantasy_api::Error::HttpStatus {
                        status: 503,
                        body: String::new(),
                    },
                ),
            ],
        );
        let text = agg.to_string();
        assert!(text.starts_with("2 of 3 players could not be built:"));
        assert!(text.contains("player 1 (A): worker stopped before reporting: panicked"));
        assert!(text.contains("player 2 (B): history fetch failed: Request failed with status 503"));
    }

    #[test]
    fn empty_aggregate_is_ok() {
        assert!(AggregateError::new(5, Vec::new()).into_result().is_ok());
    }
}
