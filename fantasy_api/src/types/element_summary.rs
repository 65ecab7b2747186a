//! Per-player history returned by `/element-summary/{id}/`.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElementSummary {
    /// One entry per fixture the player has a recorded history for.
    pub history: Vec<ElementHistory>,
}

/// A player's line for a single past fixture.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElementHistory {
    /// Player id.
    pub element: i64,
    pub fixture: i64,
    pub minutes: i64,
    pub total_points: i64,
    pub goals_scored: i64,
    pub assists: i64,
    #[serde(default)]
    pub clean_sheets: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub bonus: i64,
    pub was_home: bool,
}
