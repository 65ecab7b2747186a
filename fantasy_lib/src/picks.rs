//! Manager squads: the picks of one FPL entry for one gameweek.

use fantasy_api::types as api;

use crate::data::{Data, StartingPlayer};
use crate::models::{GameweekID, ManagerID, ManagerPick, PlayerID};

/// Flattens a picks payload into storable rows.
pub fn manager_picks(
    manager_id: ManagerID,
    gameweek_id: GameweekID,
    raw: &api::Picks,
) -> Vec<ManagerPick> {
    raw.picks
        .iter()
        .map(|p| ManagerPick {
            manager_id,
            gameweek_id,
            player_id: p.element,
            is_captain: p.is_captain,
            is_vice_captain: p.is_vice_captain,
        })
        .collect()
}

/// One squad slot resolved against the gameweek's fixtures.
#[derive(Debug, Clone, Copy)]
pub struct SquadPlayer<'a> {
    pub starting: StartingPlayer<'a>,
    /// Squad slot, 1 to 15. Slots above 11 are the bench.
    pub position: i64,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

#[derive(Debug, Clone)]
pub struct ManagerSquad<'a> {
    pub manager_id: ManagerID,
    pub gameweek_id: GameweekID,
    /// Picks that have a fixture this gameweek, in squad order.
    pub players: Vec<SquadPlayer<'a>>,
    /// Picks with no fixture this gameweek, or unknown to the snapshot.
    pub unresolved: Vec<PlayerID>,
    /// Money in the bank, in millions.
    pub bank: f64,
}

impl<'a> ManagerSquad<'a> {
    pub fn resolve(
        data: &'a Data,
        manager_id: ManagerID,
        gameweek_id: GameweekID,
        raw: &api::Picks,
    ) -> Self {
        let set = data.gameweek_player_set(gameweek_id);
        let mut ordered: Vec<&api::Pick> = raw.picks.iter().collect();
        ordered.sort_by_key(|p| p.position);

        let mut players = Vec::with_capacity(ordered.len());
        let mut unresolved = Vec::new();
        for pick in ordered {
            match set.get(&pick.element) {
                Some(starting) => players.push(SquadPlayer {
                    starting: *starting,
                    position: pick.position,
                    is_captain: pick.is_captain,
                    is_vice_captain: pick.is_vice_captain,
                }),
                None => unresolved.push(pick.element),
            }
        }

        Self {
            manager_id,
            gameweek_id,
            players,
            unresolved,
            bank: raw.entry_history.bank as f64 / 10.0,
        }
    }

    pub fn captain(&self) -> Option<&SquadPlayer<'a>> {
        self.players.iter().find(|p| p.is_captain)
    }

    pub fn vice_captain(&self) -> Option<&SquadPlayer<'a>> {
        self.players.iter().find(|p| p.is_vice_captain)
    }

    /// Sum of the squad's current prices plus the bank, in millions.
    pub fn squad_value(&self) -> f64 {
        self.players
            .iter()
            .map(|p| p.starting.player.raw_cost)
            .sum::<f64>()
            + self.bank
    }
}
