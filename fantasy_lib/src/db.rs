//! SQLite snapshot store for imported gameweeks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::data::Data;
use crate::models::{
    GameweekID, ManagerID, ManagerPick, Player, PlayerFixture, PlayerID, PlayerStats, PlayerType,
    PlayerTypeID, Team, TeamID,
};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("in-memory databases cannot be exported")]
    NotFileBacked,
    #[error("failed to dump table {table}: {message}")]
    DumpFailed { table: String, message: String },
}

/// Tables in the order they are dropped by [`Db::nuke`].
const TABLES: &[&str] = &[
    "player_fixtures",
    "manager_picks",
    "players",
    "fixtures",
    "gameweeks",
    "teams",
    "player_types",
    "imports",
];

/// Knobs for [`Db::store_data`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Only persist fixtures that belong to the stored gameweek.
    pub gameweek_fixtures_only: bool,
}

/// Rows actually inserted by one [`Db::store_data`] call.
///
/// Rows that already existed are ignored and not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub player_types: usize,
    pub teams: usize,
    pub gameweeks: usize,
    pub fixtures: usize,
    pub players: usize,
    pub player_fixtures: usize,
    pub manager_picks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpOutcome {
    Exported { tables: Vec<String>, dir: PathBuf },
    /// The export directory for this gameweek was already there; nothing was written.
    AlreadyExported { dir: PathBuf },
}

pub struct Db {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing and `--no-persist` runs).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn init(&self) -> Result<(), DbError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Drops every table and recreates the empty schema.
    pub fn nuke(&self) -> Result<(), DbError> {
        tracing::warn!("Dropping all tables");
        for table in TABLES {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {}", table))?;
        }
        self.init()
    }

    pub fn has_imported(&self, gameweek: GameweekID) -> Result<bool, DbError> {
        let imported: Option<bool> = self
            .conn
            .query_row(
                "SELECT imported FROM imports WHERE gameweek_id = ?1",
                params![gameweek],
                |row| row.get(0),
            )
            .optional()?;
        Ok(imported.unwrap_or(false))
    }

    pub fn mark_imported(&self, gameweek: GameweekID) -> Result<(), DbError> {
        insert_marker(&self.conn, gameweek)?;
        Ok(())
    }

    /// Persists one import as a single transaction.
    ///
    /// The import marker is written last, so a failed store leaves neither
    /// rows nor marker behind.
    pub fn store_data(
        &mut self,
        data: &Data,
        gameweek: GameweekID,
        options: &StoreOptions,
    ) -> Result<StoreSummary, DbError> {
        let tx = self.conn.transaction()?;
        let mut summary = StoreSummary::default();

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO player_types
                   (id, name, plural_name, short_name, squad_select, squad_min_play, squad_max_play)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for pt in &data.player_types {
                summary.player_types += stmt.execute(params![
                    pt.id,
                    pt.name,
                    pt.plural_name,
                    pt.short_name,
                    pt.squad_select,
                    pt.squad_min_play,
                    pt.squad_max_play,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO teams (id, name, short_name) VALUES (?1, ?2, ?3)",
            )?;
            for team in &data.teams {
                summary.teams += stmt.execute(params![team.id, team.name, team.short_name])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO gameweeks
                   (id, name, deadline, is_current, is_next, finished, most_captained)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for gw in &data.gameweeks {
                summary.gameweeks += stmt.execute(params![
                    gw.id,
                    gw.name,
                    gw.deadline.to_rfc3339(),
                    gw.is_current,
                    gw.is_next,
                    gw.finished,
                    gw.most_captained,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO fixtures
                   (id, gameweek_id, home_team_id, away_team_id,
                    home_team_difficulty, away_team_difficulty, difficulty_majority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for fixture in data
                .fixtures
                .iter()
                .filter(|f| !options.gameweek_fixtures_only || f.gameweek_id == gameweek)
            {
                summary.fixtures += stmt.execute(params![
                    fixture.id,
                    fixture.gameweek_id,
                    fixture.home_team_id,
                    fixture.away_team_id,
                    fixture.home_team_difficulty,
                    fixture.away_team_difficulty,
                    fixture.difficulty_majority,
                ])?;
            }

            let mut stmt_player = tx.prepare(
                "INSERT OR IGNORE INTO players (
                   gameweek_id, id, name, form, points_per_game, total_points, cost, raw_cost,
                   team_id, player_type, minutes, goals, assists, conceded, clean_sheets,
                   yellow_cards, red_cards, bonus, starts, starts_per_90, influence,
                   creativity, threat, ict_index, ict_index_rank, most_captained,
                   picked_percentage
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                         ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)",
            )?;
            let mut stmt_history = tx.prepare(
                "INSERT OR IGNORE INTO player_fixtures (
                   fixture_id, player_id, minutes, played, points, goals_scored, assists,
                   yellow_cards, red_cards, bonus, clean_sheet, was_home
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for player in &data.players {
                let s = &player.stats;
                summary.players += stmt_player.execute(params![
                    gameweek,
                    player.id,
                    player.name,
                    player.form,
                    player.points_per_game,
                    player.total_points,
                    player.cost,
                    player.raw_cost,
                    player.team_id,
                    player.player_type,
                    s.minutes,
                    s.goals,
                    s.assists,
                    s.conceded,
                    s.clean_sheets,
                    s.yellow_cards,
                    s.red_cards,
                    s.bonus,
                    s.starts,
                    s.starts_per_90,
                    s.influence,
                    s.creativity,
                    s.threat,
                    s.ict_index,
                    s.ict_index_rank,
                    player.most_captained,
                    player.picked_percentage,
                ])?;

                for line in player.history.values() {
                    summary.player_fixtures += stmt_history.execute(params![
                        line.fixture_id,
                        line.player_id,
                        line.minutes,
                        line.played,
                        line.points,
                        line.goals_scored,
                        line.assists,
                        line.yellow_cards,
                        line.red_cards,
                        line.bonus,
                        line.clean_sheet,
                        line.was_home,
                    ])?;
                }
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO manager_picks
                   (manager_id, gameweek_id, player_id, is_captain, is_vice_captain)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for pick in &data.manager_picks {
                summary.manager_picks += stmt.execute(params![
                    pick.manager_id,
                    pick.gameweek_id,
                    pick.player_id,
                    pick.is_captain,
                    pick.is_vice_captain,
                ])?;
            }
        }

        insert_marker(&tx, gameweek)?;
        tx.commit()?;

        tracing::info!(
            "Stored gameweek {}: {} players, {} history rows, {} fixtures, {} picks",
            gameweek,
            summary.players,
            summary.player_fixtures,
            summary.fixtures,
            summary.manager_picks
        );
        Ok(summary)
    }

    pub fn table_names(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// The gameweek flagged current in the stored snapshot, if any.
    pub fn current_gameweek(&self) -> Result<Option<GameweekID>, DbError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM gameweeks WHERE is_current = 1 ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn player_count(&self, gameweek: GameweekID) -> Result<i64, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM players WHERE gameweek_id = ?1",
            params![gameweek],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn row_count(&self, table: &str) -> Result<i64, DbError> {
        if !self.table_names()?.iter().any(|t| t == table) {
            return Err(DbError::UnknownTable(table.to_string()));
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(1) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// Players stored for `gameweek`, each with its full match history.
    pub fn players_for_gameweek(
        &self,
        gameweek: GameweekID,
    ) -> Result<HashMap<PlayerID, Player>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, form, points_per_game, total_points, cost, raw_cost, team_id,
                    player_type, minutes, goals, assists, conceded, clean_sheets, yellow_cards,
                    red_cards, bonus, starts, starts_per_90, influence, creativity, threat,
                    ict_index, ict_index_rank, most_captained, picked_percentage
             FROM players
             WHERE gameweek_id = ?1",
        )?;
        let rows = stmt.query_map(params![gameweek], |row| {
            Ok(Player {
                id: row.get(0)?,
                name: row.get(1)?,
                form: row.get(2)?,
                points_per_game: row.get(3)?,
                total_points: row.get(4)?,
                cost: row.get(5)?,
                raw_cost: row.get(6)?,
                team_id: row.get(7)?,
                player_type: row.get(8)?,
                stats: PlayerStats {
                    minutes: row.get(9)?,
                    goals: row.get(10)?,
                    assists: row.get(11)?,
                    conceded: row.get(12)?,
                    clean_sheets: row.get(13)?,
                    yellow_cards: row.get(14)?,
                    red_cards: row.get(15)?,
                    bonus: row.get(16)?,
                    starts: row.get(17)?,
                    starts_per_90: row.get(18)?,
                    influence: row.get(19)?,
                    creativity: row.get(20)?,
                    threat: row.get(21)?,
                    ict_index: row.get(22)?,
                    ict_index_rank: row.get(23)?,
                },
                most_captained: row.get(24)?,
                picked_percentage: row.get(25)?,
                history: HashMap::new(),
            })
        })?;

        let mut players = HashMap::new();
        for row in rows {
            let player = row?;
            players.insert(player.id, player);
        }
        if players.is_empty() {
            return Ok(players);
        }

        let mut stmt = self.conn.prepare(
            "SELECT pf.fixture_id, pf.player_id, pf.minutes, pf.played, pf.points,
                    pf.goals_scored, pf.assists, pf.yellow_cards, pf.red_cards, pf.bonus,
                    pf.clean_sheet, pf.was_home
             FROM player_fixtures pf
             JOIN players p ON p.id = pf.player_id
             WHERE p.gameweek_id = ?1",
        )?;
        let rows = stmt.query_map(params![gameweek], |row| {
            Ok(PlayerFixture {
                fixture_id: row.get(0)?,
                player_id: row.get(1)?,
                minutes: row.get(2)?,
                played: row.get(3)?,
                points: row.get(4)?,
                goals_scored: row.get(5)?,
                assists: row.get(6)?,
                yellow_cards: row.get(7)?,
                red_cards: row.get(8)?,
                bonus: row.get(9)?,
                clean_sheet: row.get(10)?,
                was_home: row.get(11)?,
            })
        })?;
        for row in rows {
            let line = row?;
            if let Some(player) = players.get_mut(&line.player_id) {
                player.history.insert(line.fixture_id, line);
            }
        }

        Ok(players)
    }

    /// Stored teams by id. Player and fixture membership is not persisted.
    pub fn teams(&self) -> Result<HashMap<TeamID, Team>, DbError> {
        let mut stmt = self.conn.prepare("SELECT id, name, short_name FROM teams")?;
        let rows = stmt.query_map([], |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                short_name: row.get(2)?,
                players: Vec::new(),
                fixtures: Vec::new(),
            })
        })?;

        let mut teams = HashMap::new();
        for row in rows {
            let team = row?;
            teams.insert(team.id, team);
        }
        Ok(teams)
    }

    pub fn player_types(&self) -> Result<HashMap<PlayerTypeID, PlayerType>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, plural_name, short_name, squad_select, squad_min_play, squad_max_play
             FROM player_types",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PlayerType {
                id: row.get(0)?,
                name: row.get(1)?,
                plural_name: row.get(2)?,
                short_name: row.get(3)?,
                squad_select: row.get(4)?,
                squad_min_play: row.get(5)?,
                squad_max_play: row.get(6)?,
            })
        })?;

        let mut types = HashMap::new();
        for row in rows {
            let pt = row?;
            types.insert(pt.id, pt);
        }
        Ok(types)
    }

    pub fn manager_picks(
        &self,
        manager_id: ManagerID,
        gameweek: GameweekID,
    ) -> Result<Vec<ManagerPick>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT manager_id, gameweek_id, player_id, is_captain, is_vice_captain
             FROM manager_picks
             WHERE manager_id = ?1 AND gameweek_id = ?2
             ORDER BY player_id",
        )?;
        let rows = stmt.query_map(params![manager_id, gameweek], |row| {
            Ok(ManagerPick {
                manager_id: row.get(0)?,
                gameweek_id: row.get(1)?,
                player_id: row.get(2)?,
                is_captain: row.get(3)?,
                is_vice_captain: row.get(4)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Dumps every table to `<export_root>/gw_<gameweek>/<table>.sql` with an
    /// external tool invoked as `<tool> <db> ".dump <table>"`.
    ///
    /// An existing export directory is left untouched. A failed dump removes
    /// the partial directory so the export can be retried.
    pub fn dump(
        &self,
        gameweek: GameweekID,
        export_root: &Path,
        tool: &str,
    ) -> Result<DumpOutcome, DbError> {
        let db_path = self.path.as_deref().ok_or(DbError::NotFileBacked)?;
        let dir = export_root.join(format!("gw_{}", gameweek));
        if dir.exists() {
            tracing::info!("Export {} already exists, skipping", dir.display());
            return Ok(DumpOutcome::AlreadyExported { dir });
        }

        let tables = self.table_names()?;
        std::fs::create_dir_all(&dir)?;
        if let Err(err) = dump_tables(db_path, &dir, &tables, tool) {
            let _ = std::fs::remove_dir_all(&dir);
            return Err(err);
        }

        tracing::info!("Exported {} tables to {}", tables.len(), dir.display());
        Ok(DumpOutcome::Exported { tables, dir })
    }
}

fn insert_marker(conn: &Connection, gameweek: GameweekID) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO imports (gameweek_id, imported, imported_at) VALUES (?1, 1, ?2)",
        params![gameweek, Utc::now().to_rfc3339()],
    )
}

fn dump_tables(db_path: &Path, dir: &Path, tables: &[String], tool: &str) -> Result<(), DbError> {
    for table in tables {
        let output = Command::new(tool)
            .arg(db_path)
            .arg(format!(".dump {}", table))
            .output()
            .map_err(|e| DbError::DumpFailed {
                table: table.clone(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(DbError::DumpFailed {
                table: table.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        std::fs::write(dir.join(format!("{}.sql", table)), &output.stdout)?;
        tracing::debug!("Dumped {}", table);
    }
    Ok(())
}
