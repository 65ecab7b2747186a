//! Normalized domain entities.
//!
//! Entities reference each other by id. The graph that owns them is
//! [`crate::Data`]; nothing here holds a pointer to another entity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TeamID = i64;
pub type GameweekID = i64;
pub type PlayerTypeID = i64;
pub type FixtureID = i64;
pub type PlayerID = i64;
pub type ManagerID = i64;

/// Well-known position type ids, used only for position-weighted scoring.
pub const PT_GOALKEEPER: PlayerTypeID = 1;
pub const PT_DEFENDER: PlayerTypeID = 2;
pub const PT_MIDFIELDER: PlayerTypeID = 3;
pub const PT_FORWARD: PlayerTypeID = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamID,
    pub name: String,
    pub short_name: String,
    /// Players registered to this team. Order carries no meaning.
    pub players: Vec<PlayerID>,
    /// Fixtures the team plays in, home or away.
    pub fixtures: Vec<FixtureID>,
}

/// A scored reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gameweek {
    pub id: GameweekID,
    pub name: String,
    pub deadline: DateTime<Utc>,
    pub is_current: bool,
    pub is_next: bool,
    pub finished: bool,
    pub most_captained: Option<PlayerID>,
}

impl Gameweek {
    /// Deadline as shown in reports, e.g. `24 Aug 10:00`.
    pub fn deadline_display(&self) -> String {
        self.deadline.format("%d %b %H:%M").to_string()
    }
}

/// A position type and its squad composition rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerType {
    pub id: PlayerTypeID,
    pub name: String,
    pub plural_name: String,
    pub short_name: String,
    pub squad_select: i64,
    pub squad_min_play: i64,
    pub squad_max_play: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureID,
    pub gameweek_id: GameweekID,
    pub home_team_id: TeamID,
    pub away_team_id: TeamID,
    pub home_team_difficulty: i64,
    pub away_team_difficulty: i64,
    pub difficulty_majority: i64,
}

impl Fixture {
    pub fn new(
        id: FixtureID,
        gameweek_id: GameweekID,
        home_team_id: TeamID,
        away_team_id: TeamID,
        home_team_difficulty: i64,
        away_team_difficulty: i64,
    ) -> Self {
        Self {
            id,
            gameweek_id,
            home_team_id,
            away_team_id,
            home_team_difficulty,
            away_team_difficulty,
            difficulty_majority: (home_team_difficulty - away_team_difficulty).abs(),
        }
    }

    /// The team on the other side of the fixture from `team_id`.
    pub fn opponent_of(&self, team_id: TeamID) -> Option<TeamID> {
        if team_id == self.home_team_id {
            Some(self.away_team_id)
        } else if team_id == self.away_team_id {
            Some(self.home_team_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub minutes: i64,
    pub goals: i64,
    pub assists: i64,
    pub conceded: i64,
    pub clean_sheets: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub bonus: i64,
    pub starts: i64,
    pub starts_per_90: f64,
    pub influence: f64,
    pub creativity: f64,
    pub threat: f64,
    pub ict_index: f64,
    pub ict_index_rank: Option<i64>,
}

/// One player's line for one fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerFixture {
    pub fixture_id: FixtureID,
    pub player_id: PlayerID,
    pub minutes: i64,
    pub played: bool,
    pub points: i64,
    pub goals_scored: i64,
    pub assists: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub bonus: i64,
    pub clean_sheet: bool,
    pub was_home: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerID,
    pub name: String,
    pub form: f64,
    pub points_per_game: f64,
    pub total_points: i64,
    /// Display cost, e.g. `£12.5m`.
    pub cost: String,
    /// Cost in millions, used for ranking math.
    pub raw_cost: f64,
    pub team_id: TeamID,
    pub player_type: PlayerTypeID,
    pub stats: PlayerStats,
    pub most_captained: bool,
    pub picked_percentage: f64,
    pub history: HashMap<FixtureID, PlayerFixture>,
}

impl Player {
    pub fn form_over_cost(&self) -> f64 {
        if self.form <= 0.0 || self.raw_cost == 0.0 {
            return 0.0;
        }
        self.form / self.raw_cost
    }

    pub fn points_over_cost(&self) -> f64 {
        if self.total_points == 0 || self.raw_cost == 0.0 {
            return 0.0;
        }
        self.total_points as f64 / self.raw_cost
    }

    /// Average goal and assist points over the `weeks` most recent fixtures.
    ///
    /// Goals are weighted by position the way the game scores them; the sum
    /// is divided by `weeks` even when fewer fixtures are on record.
    pub fn attacking_form(&self, weeks: usize) -> f64 {
        if weeks == 0 || self.history.is_empty() {
            return 0.0;
        }
        let goal_weight = match self.player_type {
            PT_GOALKEEPER => 10,
            PT_DEFENDER => 6,
            PT_MIDFIELDER => 5,
            PT_FORWARD => 4,
            _ => 0,
        };
        let mut recent: Vec<&PlayerFixture> = self.history.values().collect();
        recent.sort_by(|a, b| b.fixture_id.cmp(&a.fixture_id));
        let points: i64 = recent
            .iter()
            .take(weeks)
            .map(|f| f.goals_scored * goal_weight + f.assists * 3)
            .sum();
        points as f64 / weeks as f64
    }
}

/// A manager's choice of one player for one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerPick {
    pub manager_id: ManagerID,
    pub gameweek_id: GameweekID,
    pub player_id: PlayerID,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

/// Formats a cost given in tenths of a million, e.g. `125` → `£12.5m`.
pub fn format_cost(tenths: i64) -> String {
    format!("£{:.1}m", tenths as f64 / 10.0)
}
