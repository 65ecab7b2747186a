//! Fixture records returned by `/fixtures/`.

use serde::{Deserialize, Serialize};

/// A scheduled match between two teams.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Fixture {
    pub id: i64,

    /// Gameweek the fixture belongs to. `None` while the match is unscheduled.
    pub event: Option<i64>,

    /// Home team id.
    pub team_h: i64,

    /// Away team id.
    pub team_a: i64,

    pub team_h_difficulty: i64,

    pub team_a_difficulty: i64,

    #[serde(default)]
    pub finished: bool,
}
