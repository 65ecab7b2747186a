//! The in-memory graph produced by one import run.

use std::collections::HashMap;

use crate::models::{
    Fixture, Gameweek, GameweekID, ManagerPick, Player, PlayerID, PlayerType, Team, TeamID,
};

/// Everything one import fetched, normalized and enriched.
///
/// Built once per run, persisted once, then dropped.
#[derive(Debug, Clone, Default)]
pub struct Data {
    pub player_types: Vec<PlayerType>,
    pub gameweeks: Vec<Gameweek>,
    pub fixtures: Vec<Fixture>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub manager_picks: Vec<ManagerPick>,
}

/// A player lined up for a fixture, with the team they face.
#[derive(Debug, Clone, Copy)]
pub struct StartingPlayer<'a> {
    pub player: &'a Player,
    pub fixture: &'a Fixture,
    pub opposing_team: &'a Team,
}

impl Data {
    pub fn gameweek(&self, id: GameweekID) -> Option<&Gameweek> {
        self.gameweeks.iter().find(|gw| gw.id == id)
    }

    pub fn current_gameweek(&self) -> Option<&Gameweek> {
        self.gameweeks.iter().find(|gw| gw.is_current)
    }

    pub fn next_gameweek(&self) -> Option<&Gameweek> {
        self.gameweeks.iter().find(|gw| gw.is_next)
    }

    pub fn team(&self, id: TeamID) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn player(&self, id: PlayerID) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Looks a position type up by its singular name, e.g. `"Midfielder"`.
    pub fn player_type_by_name(&self, name: &str) -> Option<&PlayerType> {
        self.player_types.iter().find(|pt| pt.name == name)
    }

    pub fn fixtures_by_gameweek(&self, id: GameweekID) -> Vec<&Fixture> {
        self.fixtures
            .iter()
            .filter(|f| f.gameweek_id == id)
            .collect()
    }

    /// Every player of both sides of every fixture in the gameweek.
    ///
    /// A player with two fixtures in the same gameweek appears twice.
    pub fn gameweek_players(&self, id: GameweekID) -> Vec<StartingPlayer<'_>> {
        let players_by_team = self.players_by_team();
        let mut out = Vec::new();
        for fixture in self.fixtures_by_gameweek(id) {
            let (Some(home), Some(away)) =
                (self.team(fixture.home_team_id), self.team(fixture.away_team_id))
            else {
                continue;
            };
            for (side, opponent) in [(home, away), (away, home)] {
                for &player in players_by_team.get(&side.id).into_iter().flatten() {
                    out.push(StartingPlayer {
                        player,
                        fixture,
                        opposing_team: opponent,
                    });
                }
            }
        }
        out
    }

    /// [`Data::gameweek_players`] keyed by player; the last fixture wins for doubles.
    pub fn gameweek_player_set(&self, id: GameweekID) -> HashMap<PlayerID, StartingPlayer<'_>> {
        self.gameweek_players(id)
            .into_iter()
            .map(|sp| (sp.player.id, sp))
            .collect()
    }

    fn players_by_team(&self) -> HashMap<TeamID, Vec<&Player>> {
        let mut map: HashMap<TeamID, Vec<&Player>> = HashMap::new();
        for player in &self.players {
            map.entry(player.team_id).or_default().push(player);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_player;
    use crate::models::PT_MIDFIELDER;

    fn team(id: TeamID, name: &str) -> Team {
        Team {
            id,
            name: name.to_string(),
            short_name: name[..3].to_uppercase(),
            players: Vec::new(),
            fixtures: Vec::new(),
        }
    }

    fn gameweek(id: GameweekID, is_current: bool, is_next: bool) -> Gameweek {
        Gameweek {
            id,
            name: format!("Gameweek {}", id),
            deadline: "2024-08-24T10:00:00Z".parse().unwrap(),
            is_current,
            is_next,
            finished: false,
            most_captained: None,
        }
    }

    fn sample_data() -> Data {
        let mut home_player = sample_player(10, PT_MIDFIELDER);
        home_player.team_id = 1;
        let mut away_player = sample_player(20, PT_MIDFIELDER);
        away_player.team_id = 2;
        let mut bench = sample_player(30, PT_MIDFIELDER);
        bench.team_id = 3;
        Data {
            player_types: Vec::new(),
            gameweeks: vec![gameweek(1, true, false), gameweek(2, false, true)],
            fixtures: vec![Fixture::new(100, 1, 1, 2, 3, 3), Fixture::new(101, 2, 3, 1, 2, 4)],
            teams: vec![team(1, "Arsenal"), team(2, "Brentford"), team(3, "Chelsea")],
            players: vec![home_player, away_player, bench],
            manager_picks: Vec::new(),
        }
    }

    #[test]
    fn gameweek_lookups() {
        let data = sample_data();
        assert_eq!(data.current_gameweek().unwrap().id, 1);
        assert_eq!(data.next_gameweek().unwrap().id, 2);
        assert!(data.gameweek(9).is_none());
    }

    #[test]
    fn fixtures_filtered_by_gameweek() {
        let data = sample_data();
        let ids: Vec<_> = data.fixtures_by_gameweek(2).iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![101]);
    }

    #[test]
    fn gameweek_players_pair_each_side_with_opponent() {
        let data = sample_data();
        let set = data.gameweek_player_set(1);
        assert_eq!(set.len(), 2);
        assert_eq!(set[&10].opposing_team.id, 2);
        assert_eq!(set[&20].opposing_team.id, 1);
        assert!(!set.contains_key(&30));
    }

    #[test]
    fn player_type_by_name() {
        let mut data = sample_data();
        data.player_types.push(PlayerType {
            id: 3,
            name: "Midfielder".into(),
            plural_name: "Midfielders".into(),
            short_name: "MID".into(),
            squad_select: 5,
            squad_min_play: 2,
            squad_max_play: 5,
        });
        assert_eq!(data.player_type_by_name("Midfielder").unwrap().id, 3);
        assert!(data.player_type_by_name("Keeper").is_none());
    }
}
