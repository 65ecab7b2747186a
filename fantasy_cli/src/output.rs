use std::collections::{BTreeMap, HashMap};

use fantasy_lib::{
    GameweekID, ManagerID, ManagerPick, Player, PlayerID, PlayerType, PlayerTypeID, Team, TeamID,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Markdown,
    Json,
}

/// Which value-for-money score a ranking table is sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ranking {
    FormOverCost,
    PointsOverCost,
}

impl Ranking {
    pub const ALL: [Ranking; 2] = [Ranking::FormOverCost, Ranking::PointsOverCost];

    pub fn title(self) -> &'static str {
        match self {
            Ranking::FormOverCost => "Best form per £m",
            Ranking::PointsOverCost => "Most points per £m",
        }
    }

    /// Key of this ranking in the JSON report.
    pub fn key(self) -> &'static str {
        match self {
            Ranking::FormOverCost => "form_over_cost",
            Ranking::PointsOverCost => "points_over_cost",
        }
    }

    pub fn score(self, player: &Player) -> f64 {
        match self {
            Ranking::FormOverCost => player.form_over_cost(),
            Ranking::PointsOverCost => player.points_over_cost(),
        }
    }
}

/// Team and position names used to label report rows.
pub struct Lookups<'a> {
    pub teams: &'a HashMap<TeamID, Team>,
    pub player_types: &'a HashMap<PlayerTypeID, PlayerType>,
}

impl Lookups<'_> {
    fn team(&self, id: TeamID) -> String {
        self.teams
            .get(&id)
            .map(|t| t.short_name.clone())
            .unwrap_or_else(|| "-".to_string())
    }

    fn position(&self, id: PlayerTypeID) -> String {
        self.player_types
            .get(&id)
            .map(|pt| pt.short_name.clone())
            .unwrap_or_else(|| "-".to_string())
    }
}

#[derive(Tabled, Serialize)]
struct RankingRow {
    #[tabled(rename = "#")]
    #[serde(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Player")]
    #[serde(rename = "Player")]
    name: String,
    #[tabled(rename = "Team")]
    #[serde(rename = "Team")]
    team: String,
    #[tabled(rename = "Pos")]
    #[serde(rename = "Pos")]
    position: String,
    #[tabled(rename = "Cost")]
    #[serde(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Form")]
    #[serde(rename = "Form")]
    form: String,
    #[tabled(rename = "Pts")]
    #[serde(rename = "Pts")]
    points: i64,
    #[tabled(rename = "Score")]
    #[serde(rename = "Score")]
    score: String,
    #[tabled(rename = "Sel %")]
    #[serde(rename = "Selected")]
    selected: String,
}

#[derive(Tabled, Serialize)]
struct PickRow {
    #[tabled(rename = "Player")]
    #[serde(rename = "Player")]
    name: String,
    #[tabled(rename = "Team")]
    #[serde(rename = "Team")]
    team: String,
    #[tabled(rename = "Pos")]
    #[serde(rename = "Pos")]
    position: String,
    #[tabled(rename = "Cost")]
    #[serde(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Form")]
    #[serde(rename = "Form")]
    form: String,
    #[tabled(rename = "Role")]
    #[serde(rename = "Role")]
    role: String,
}

/// Everything one run prints, as a single JSON document.
#[derive(Serialize)]
struct Report {
    gameweek: GameweekID,
    rankings: BTreeMap<&'static str, Vec<RankingRow>>,
    picks: BTreeMap<ManagerID, Vec<PickRow>>,
}

/// Players with a positive score, best first, at most `top` of them.
///
/// Ties are broken by player id so the order is stable across runs.
pub fn rank_players<'a, I>(players: I, ranking: Ranking, top: usize) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut ranked: Vec<&Player> = players
        .into_iter()
        .filter(|p| ranking.score(p) > 0.0)
        .collect();
    ranked.sort_by(|a, b| {
        ranking
            .score(b)
            .total_cmp(&ranking.score(a))
            .then(a.id.cmp(&b.id))
    });
    ranked.truncate(top);
    ranked
}

// -- Row builders --

fn build_ranking_rows(ranked: &[&Player], ranking: Ranking, lookups: &Lookups) -> Vec<RankingRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, p)| RankingRow {
            rank: i + 1,
            name: p.name.clone(),
            team: lookups.team(p.team_id),
            position: lookups.position(p.player_type),
            cost: p.cost.clone(),
            form: format!("{:.1}", p.form),
            points: p.total_points,
            score: format!("{:.2}", ranking.score(p)),
            selected: format!("{:.1}", p.picked_percentage),
        })
        .collect()
}

fn build_pick_rows(
    picks: &[ManagerPick],
    players: &HashMap<PlayerID, Player>,
    lookups: &Lookups,
) -> Vec<PickRow> {
    picks
        .iter()
        .map(|pick| {
            let role = if pick.is_captain {
                "C"
            } else if pick.is_vice_captain {
                "VC"
            } else {
                ""
            };
            match players.get(&pick.player_id) {
                Some(p) => PickRow {
                    name: p.name.clone(),
                    team: lookups.team(p.team_id),
                    position: lookups.position(p.player_type),
                    cost: p.cost.clone(),
                    form: format!("{:.1}", p.form),
                    role: role.to_string(),
                },
                None => PickRow {
                    name: format!("#{}", pick.player_id),
                    team: "-".to_string(),
                    position: "-".to_string(),
                    cost: "-".to_string(),
                    form: "-".to_string(),
                    role: role.to_string(),
                },
            }
        })
        .collect()
}

fn build_report(
    gameweek: GameweekID,
    players: &HashMap<PlayerID, Player>,
    picks: &[(ManagerID, Vec<ManagerPick>)],
    lookups: &Lookups,
    top: usize,
) -> Report {
    let rankings = Ranking::ALL
        .into_iter()
        .map(|ranking| {
            let ranked = rank_players(players.values(), ranking, top);
            (ranking.key(), build_ranking_rows(&ranked, ranking, lookups))
        })
        .collect();
    let picks = picks
        .iter()
        .map(|(manager_id, manager_picks)| {
            (*manager_id, build_pick_rows(manager_picks, players, lookups))
        })
        .collect();
    Report {
        gameweek,
        rankings,
        picks,
    }
}

// -- Printers --

fn print_rows<T: Tabled>(rows: Vec<T>, format: &OutputFormat) {
    let mut table = Table::new(rows);
    if *format == OutputFormat::Markdown {
        table.with(Style::markdown());
    }
    println!("{}", table);
}

/// Prints one table per [`Ranking`] and one per manager, or a single JSON
/// object holding all of them.
pub fn print_report(
    gameweek: GameweekID,
    players: &HashMap<PlayerID, Player>,
    picks: &[(ManagerID, Vec<ManagerPick>)],
    lookups: &Lookups,
    top: usize,
    format: &OutputFormat,
) {
    if *format == OutputFormat::Json {
        print_json(&build_report(gameweek, players, picks, lookups, top));
        return;
    }
    for ranking in Ranking::ALL {
        let ranked = rank_players(players.values(), ranking, top);
        println!("\n{}", ranking.title());
        print_rows(build_ranking_rows(&ranked, ranking, lookups), format);
    }
    for (manager_id, manager_picks) in picks {
        println!("\nManager {}", manager_id);
        print_rows(build_pick_rows(manager_picks, players, lookups), format);
    }
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
