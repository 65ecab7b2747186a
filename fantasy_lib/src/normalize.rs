//! Turns provider payloads into the normalized [`Data`] graph.
//!
//! Lookup tables for teams, gameweeks and position types are built first;
//! players and fixtures are resolved against them afterwards. A bad player is
//! reported and skipped, an unresolvable fixture is dropped.

use std::collections::{BTreeMap, HashMap};

use fantasy_api::types as api;

use crate::data::Data;
use crate::error::EnrichError;
use crate::models::{
    format_cost, Fixture, FixtureID, Gameweek, GameweekID, ManagerPick, Player, PlayerFixture,
    PlayerStats, PlayerType, PlayerTypeID, Team, TeamID,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("invalid decimal '{value}' in field {field}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("missing {kind} ID '{id}'")]
    MissingReference { kind: &'static str, id: i64 },
}

/// Parses a provider decimal string such as `"8.5"`.
pub fn parse_decimal(field: &'static str, value: &str) -> Result<f64, NormalizeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NormalizeError::InvalidDecimal {
            field,
            value: value.to_string(),
        })
}

/// Lookup tables plus the fixtures resolved so far.
pub struct Normalizer {
    teams: BTreeMap<TeamID, Team>,
    gameweeks: BTreeMap<GameweekID, Gameweek>,
    player_types: BTreeMap<PlayerTypeID, PlayerType>,
    fixtures: Vec<Fixture>,
}

impl Normalizer {
    /// Builds the team, gameweek and position type tables from the bulk payload.
    pub fn from_bootstrap(bootstrap: &api::BootstrapStatic) -> Self {
        let teams = bootstrap
            .teams
            .iter()
            .map(|t| {
                (
                    t.id,
                    Team {
                        id: t.id,
                        name: t.name.clone(),
                        short_name: t.short_name.clone(),
                        players: Vec::new(),
                        fixtures: Vec::new(),
                    },
                )
            })
            .collect();

        let gameweeks = bootstrap
            .events
            .iter()
            .map(|e| {
                (
                    e.id,
                    Gameweek {
                        id: e.id,
                        name: e.name.clone(),
                        deadline: e.deadline_time,
                        is_current: e.is_current,
                        is_next: e.is_next,
                        finished: e.finished,
                        most_captained: e.most_captained,
                    },
                )
            })
            .collect();

        let player_types = bootstrap
            .element_types
            .iter()
            .map(|t| {
                (
                    t.id,
                    PlayerType {
                        id: t.id,
                        name: t.singular_name.clone(),
                        plural_name: t.plural_name.clone(),
                        short_name: t.singular_name_short.clone(),
                        squad_select: t.squad_select,
                        squad_min_play: t.squad_min_play,
                        squad_max_play: t.squad_max_play,
                    },
                )
            })
            .collect();

        Self {
            teams,
            gameweeks,
            player_types,
            fixtures: Vec::new(),
        }
    }

    pub fn current_gameweek(&self) -> Option<&Gameweek> {
        self.gameweeks.values().find(|gw| gw.is_current)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Builds one player without history. History is attached by enrichment.
    pub fn normalize_player(&self, raw: &api::Element) -> Result<Player, NormalizeError> {
        let form = parse_decimal("form", &raw.form)?;
        let points_per_game = parse_decimal("points_per_game", &raw.points_per_game)?;

        if !self.teams.contains_key(&raw.team) {
            return Err(NormalizeError::MissingReference {
                kind: "team",
                id: raw.team,
            });
        }
        if !self.player_types.contains_key(&raw.element_type) {
            return Err(NormalizeError::MissingReference {
                kind: "player type",
                id: raw.element_type,
            });
        }

        let stats = PlayerStats {
            minutes: raw.minutes,
            goals: raw.goals_scored,
            assists: raw.assists,
            conceded: raw.goals_conceded,
            clean_sheets: raw.clean_sheets,
            yellow_cards: raw.yellow_cards,
            red_cards: raw.red_cards,
            bonus: raw.bonus,
            starts: raw.starts,
            starts_per_90: raw.starts_per_90,
            influence: parse_decimal("influence", &raw.influence)?,
            creativity: parse_decimal("creativity", &raw.creativity)?,
            threat: parse_decimal("threat", &raw.threat)?,
            ict_index: parse_decimal("ict_index", &raw.ict_index)?,
            ict_index_rank: raw.ict_index_rank,
        };
        let picked_percentage = parse_decimal("selected_by_percent", &raw.selected_by_percent)?;

        let most_captained = self
            .current_gameweek()
            .and_then(|gw| gw.most_captained)
            .is_some_and(|id| id == raw.id);

        Ok(Player {
            id: raw.id,
            name: raw.web_name.clone(),
            form,
            points_per_game,
            total_points: raw.total_points,
            cost: format_cost(raw.now_cost),
            raw_cost: raw.now_cost as f64 / 10.0,
            team_id: raw.team,
            player_type: raw.element_type,
            stats,
            most_captained,
            picked_percentage,
            history: HashMap::new(),
        })
    }

    /// Normalizes every raw player, splitting successes from labeled failures.
    pub fn normalize_players(&self, raw: &[api::Element]) -> (Vec<Player>, Vec<EnrichError>) {
        let mut players = Vec::with_capacity(raw.len());
        let mut errors = Vec::new();
        for element in raw {
            match self.normalize_player(element) {
                Ok(player) => players.push(player),
                Err(err) => errors.push(EnrichError::new(element.id, &element.web_name, err)),
            }
        }
        (players, errors)
    }

    /// Resolves fixtures and registers each kept one with both of its teams.
    ///
    /// Returns how many fixtures were dropped for an unknown gameweek or team.
    pub fn add_fixtures(&mut self, raw: &[api::Fixture]) -> usize {
        let mut dropped = 0;
        for f in raw {
            let Some(gameweek_id) = f.event.filter(|id| self.gameweeks.contains_key(id)) else {
                tracing::debug!("dropping fixture {}: gameweek {:?} unknown", f.id, f.event);
                dropped += 1;
                continue;
            };
            if !self.teams.contains_key(&f.team_h) || !self.teams.contains_key(&f.team_a) {
                tracing::debug!(
                    "dropping fixture {}: team {} or {} unknown",
                    f.id,
                    f.team_h,
                    f.team_a
                );
                dropped += 1;
                continue;
            }

            let fixture = Fixture::new(
                f.id,
                gameweek_id,
                f.team_h,
                f.team_a,
                f.team_h_difficulty,
                f.team_a_difficulty,
            );
            for team_id in [fixture.home_team_id, fixture.away_team_id] {
                if let Some(team) = self.teams.get_mut(&team_id) {
                    team.fixtures.push(fixture.id);
                }
            }
            self.fixtures.push(fixture);
        }
        dropped
    }

    /// Consumes the tables and assembles the final graph.
    pub fn into_data(self, players: Vec<Player>, manager_picks: Vec<ManagerPick>) -> Data {
        let mut teams = self.teams;
        for player in &players {
            if let Some(team) = teams.get_mut(&player.team_id) {
                team.players.push(player.id);
            }
        }
        Data {
            player_types: self.player_types.into_values().collect(),
            gameweeks: self.gameweeks.into_values().collect(),
            fixtures: self.fixtures,
            teams: teams.into_values().collect(),
            players,
            manager_picks,
        }
    }
}

/// Maps a player's history payload to one entry per fixture.
pub fn history_from_summary(summary: &api::ElementSummary) -> HashMap<FixtureID, PlayerFixture> {
    summary
        .history
        .iter()
        .map(|h| {
            (
                h.fixture,
                PlayerFixture {
                    fixture_id: h.fixture,
                    player_id: h.element,
                    minutes: h.minutes,
                    played: h.minutes > 0,
                    points: h.total_points,
                    goals_scored: h.goals_scored,
                    assists: h.assists,
                    yellow_cards: h.yellow_cards,
                    red_cards: h.red_cards,
                    bonus: h.bonus,
                    clean_sheet: h.clean_sheets > 0,
                    was_home: h.was_home,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bootstrap() -> api::BootstrapStatic {
        serde_json::from_str(include_str!("../tests/fixtures/bootstrap_static.json"))
            .expect("bootstrap fixture")
    }

    fn raw_fixture(id: i64, event: Option<i64>, home: i64, away: i64) -> api::Fixture {
        api::Fixture {
            id,
            event,
            team_h: home,
            team_a: away,
            team_h_difficulty: 2,
            team_a_difficulty: 4,
            finished: false,
        }
    }

    #[test]
    fn parse_decimal_accepts_provider_strings() {
        assert_eq!(parse_decimal("form", "8.5").unwrap(), 8.5);
        assert_eq!(parse_decimal("form", "0.0").unwrap(), 0.0);
        assert_eq!(parse_decimal("form", " 3 ").unwrap(), 3.0);
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        let err = parse_decimal("form", "n/a").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidDecimal {
                field: "form",
                value: "n/a".into()
            }
        );
        assert!(parse_decimal("form", "").is_err());
        assert!(parse_decimal("form", "NaN").is_err());
    }

    #[test]
    fn lookups_built_from_bootstrap() {
        let n = Normalizer::from_bootstrap(&bootstrap());
        assert_eq!(n.team_count(), 2);
        assert_eq!(n.current_gameweek().map(|gw| gw.id), Some(2));
    }

    #[test]
    fn player_fields_are_parsed() {
        let b = bootstrap();
        let n = Normalizer::from_bootstrap(&b);
        let salah = n.normalize_player(&b.elements[0]).unwrap();
        assert_eq!(salah.form, 8.5);
        assert_eq!(salah.points_per_game, 7.2);
        assert_eq!(salah.cost, "£12.5m");
        assert_eq!(salah.raw_cost, 12.5);
        assert_eq!(salah.stats.ict_index, 24.6);
        assert_eq!(salah.picked_percentage, 45.3);
        assert!(salah.most_captained);
        assert!(salah.history.is_empty());

        let saka = n.normalize_player(&b.elements[1]).unwrap();
        assert!(!saka.most_captained);
    }

    #[test]
    fn missing_player_type_is_labeled() {
        let b = bootstrap();
        let n = Normalizer::from_bootstrap(&b);
        let err = n.normalize_player(&b.elements[2]).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingReference {
                kind: "player type",
                id: 4
            }
        );
    }

    #[test]
    fn missing_team_is_labeled() {
        let b = bootstrap();
        let n = Normalizer::from_bootstrap(&b);
        let mut raw = b.elements[0].clone();
        raw.team = 99;
        let err = n.normalize_player(&raw).unwrap_err();
        assert_eq!(err, NormalizeError::MissingReference { kind: "team", id: 99 });
    }

    #[test]
    fn bad_decimal_fails_only_that_player() {
        let mut b = bootstrap();
        b.elements[1].ict_index = "??".into();
        let n = Normalizer::from_bootstrap(&b);
        let (players, errors) = n.normalize_players(&b.elements);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].id, 328);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].player_id, 17);
        assert!(!errors[0].is_referential());
        assert_eq!(errors[1].player_id, 402);
        assert!(errors[1].is_referential());
    }

    #[test]
    fn fixtures_with_unknown_gameweek_are_dropped() {
        let b = bootstrap();
        let mut n = Normalizer::from_bootstrap(&b);
        let dropped = n.add_fixtures(&[
            raw_fixture(1, Some(2), 1, 14),
            raw_fixture(2, Some(38), 1, 14),
            raw_fixture(3, None, 14, 1),
        ]);
        assert_eq!(dropped, 2);
        assert_eq!(n.fixtures().len(), 1);
        assert_eq!(n.fixtures()[0].id, 1);
        assert_eq!(n.fixtures()[0].difficulty_majority, 2);
    }

    #[test]
    fn fixtures_with_unknown_team_are_dropped() {
        let b = bootstrap();
        let mut n = Normalizer::from_bootstrap(&b);
        let dropped = n.add_fixtures(&[raw_fixture(1, Some(2), 1, 7)]);
        assert_eq!(dropped, 1);
        assert!(n.fixtures().is_empty());
    }

    #[test]
    fn fixtures_registered_with_both_teams() {
        let b = bootstrap();
        let mut n = Normalizer::from_bootstrap(&b);
        n.add_fixtures(&[raw_fixture(5, Some(1), 1, 14), raw_fixture(6, Some(2), 14, 1)]);
        let data = n.into_data(Vec::new(), Vec::new());
        for team in &data.teams {
            assert_eq!(team.fixtures, vec![5, 6]);
        }
    }

    #[test]
    fn players_registered_with_their_team() {
        let b = bootstrap();
        let n = Normalizer::from_bootstrap(&b);
        let (players, _) = n.normalize_players(&b.elements);
        let data = n.into_data(players, Vec::new());
        let city = data.team(14).unwrap();
        let arsenal = data.team(1).unwrap();
        assert_eq!(city.players, vec![328]);
        assert_eq!(arsenal.players, vec![17]);
    }

    #[test]
    fn history_keyed_by_fixture() {
        let summary: api::ElementSummary =
            serde_json::from_str(include_str!("../tests/fixtures/element_summary.json")).unwrap();
        let history = history_from_summary(&summary);
        assert_eq!(history.len(), 2);
        let first = &history[&3];
        assert!(first.played);
        assert_eq!(first.points, 8);
        assert!(!first.was_home);
        assert!(!history[&11].played);
    }
}
