//! The bulk payload returned by `/bootstrap-static/`.
//!
//! Numeric fields the provider serialises as decimal strings (`form`,
//! `ict_index`, `selected_by_percent`, ...) are kept as strings here; turning
//! them into numbers is the normalizer's job, so one bad value fails one
//! player instead of the whole payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BootstrapStatic {
    pub teams: Vec<Team>,
    pub events: Vec<Event>,
    pub element_types: Vec<ElementType>,
    pub elements: Vec<Element>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub short_name: String,
}

/// A gameweek.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub deadline_time: DateTime<Utc>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub finished: bool,
    /// Player most often chosen as captain. Unset until the deadline passes.
    #[serde(default)]
    pub most_captained: Option<i64>,
}

/// A position type with its squad composition rules.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElementType {
    pub id: i64,
    pub singular_name: String,
    pub plural_name: String,
    pub singular_name_short: String,
    /// Players of this type in a full squad.
    pub squad_select: i64,
    pub squad_min_play: i64,
    pub squad_max_play: i64,
}

/// A player.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Element {
    pub id: i64,
    pub web_name: String,
    pub form: String,
    pub points_per_game: String,
    pub total_points: i64,
    /// Cost in tenths of a million.
    pub now_cost: i64,
    pub element_type: i64,
    pub team: i64,
    pub minutes: i64,
    pub goals_scored: i64,
    pub assists: i64,
    pub goals_conceded: i64,
    pub clean_sheets: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub bonus: i64,
    #[serde(default)]
    pub starts: i64,
    #[serde(default)]
    pub starts_per_90: f64,
    pub influence: String,
    pub creativity: String,
    pub threat: String,
    pub ict_index: String,
    #[serde(default)]
    pub ict_index_rank: Option<i64>,
    pub selected_by_percent: String,
    #[serde(default)]
    pub news: String,
}
