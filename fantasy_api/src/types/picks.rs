//! Manager squads returned by `/entry/{manager}/event/{gameweek}/picks/`.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Picks {
    pub picks: Vec<Pick>,
    pub entry_history: EntryHistory,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Pick {
    /// Player id.
    pub element: i64,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EntryHistory {
    /// Money in the bank, in tenths of a million.
    pub bank: i64,
}
