mod output;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use fantasy_lib::validation::{validate_concurrency, validate_gameweek, validate_manager_id};
use fantasy_lib::{
    Config, Db, DumpOutcome, EnrichProgress, GameweekID, Ingestor, StoreOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use crate::output::{Lookups, OutputFormat};

#[derive(Parser)]
#[command(name = "betterfantasy")]
#[command(about = "Snapshot Fantasy Premier League data into SQLite and rank players by value")]
struct Cli {
    /// Gameweek to import and report on (default: the stored current gameweek, else the live one)
    #[arg(long)]
    gameweek: Option<GameweekID>,

    /// Drop all stored data before importing
    #[arg(long)]
    force: bool,

    /// Drop all stored data, import only the gameweek's fixtures, then export every table
    #[arg(long, conflicts_with = "no_persist")]
    dump: bool,

    /// Fetch and report without writing to the database file
    #[arg(long)]
    no_persist: bool,

    /// SQLite database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory that receives gw_<n>/ exports
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Maximum concurrent player history requests (1-64)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Manager (entry) id whose picks are fetched; repeatable
    #[arg(long = "manager")]
    managers: Vec<i64>,

    /// Rows per ranking table
    #[arg(long, default_value = "15")]
    top: usize,

    /// Output format: table, markdown or json
    #[arg(long, default_value = "table")]
    output: String,
}

impl Cli {
    /// Environment first, then flags on top.
    fn config(&self) -> Result<Config> {
        let mut config = Config::from_env();
        if let Some(ref db) = self.db {
            config.db_path = db.clone();
        }
        if let Some(ref dir) = self.export_dir {
            config.export_dir = dir.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = validate_concurrency(concurrency)?;
        }
        if !self.managers.is_empty() {
            config.manager_ids = self
                .managers
                .iter()
                .map(|&id| validate_manager_id(id))
                .collect::<Result<Vec<_>, _>>()?;
        }
        Ok(config)
    }
}

const DEFAULT_LOG_FILTER: &str = "betterfantasy=info,fantasy_lib=info,fantasy_api=info";

/// `RUST_LOG` when set and parseable, otherwise info for the workspace crates.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };
    let requested = cli.gameweek.map(validate_gameweek).transpose()?;
    let config = cli.config()?;

    let mut db = if cli.no_persist {
        Db::open_in_memory()?
    } else {
        Db::open(&config.db_path)?
    };
    db.init()?;

    if cli.force || cli.dump {
        db.nuke()?;
    }

    let gameweek = match requested.or(db.current_gameweek()?) {
        Some(gw) if db.has_imported(gw)? => {
            tracing::info!("Gameweek {} already imported, reading from the store", gw);
            gw
        }
        _ => import(&mut db, &config, requested, cli.dump).await?,
    };

    if cli.dump {
        match db.dump(gameweek, &config.export_dir, &config.dump_tool)? {
            DumpOutcome::Exported { tables, dir } => {
                eprintln!("Exported {} tables to {}", tables.len(), dir.display())
            }
            DumpOutcome::AlreadyExported { dir } => {
                eprintln!("{} already exists, nothing exported", dir.display())
            }
        }
    }

    let players = db.players_for_gameweek(gameweek)?;
    if players.is_empty() {
        bail!("no players stored for gameweek {}", gameweek);
    }
    let teams = db.teams()?;
    let player_types = db.player_types()?;
    let lookups = Lookups {
        teams: &teams,
        player_types: &player_types,
    };

    let mut picks = Vec::with_capacity(config.manager_ids.len());
    for &manager_id in &config.manager_ids {
        picks.push((manager_id, db.manager_picks(manager_id, gameweek)?));
    }
    output::print_report(gameweek, &players, &picks, &lookups, cli.top, &format);

    Ok(())
}

/// Fetches a fresh snapshot of the live gameweek and stores it.
///
/// A `requested` gameweek that is not the live one is rejected before anything is stored.
async fn import(
    db: &mut Db,
    config: &Config,
    requested: Option<GameweekID>,
    gameweek_fixtures_only: bool,
) -> Result<GameweekID> {
    let ingestor = Ingestor::new(config.clone())?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("fetching player history...");

    let result = ingestor
        .fetch_gameweek(requested, |p: EnrichProgress| {
            pb.set_length(p.total as u64);
            pb.set_position(p.done as u64);
            pb.set_message(format!("{} ok, {} err", p.done - p.failed, p.failed));
        })
        .await;

    let (gameweek, data) = match result {
        Ok((gameweek, data)) => {
            pb.finish_with_message(format!("{} players enriched", data.players.len()));
            (gameweek, data)
        }
        Err(err) => {
            pb.abandon_with_message("import rejected");
            return Err(err.into());
        }
    };

    let options = StoreOptions {
        gameweek_fixtures_only,
    };
    db.store_data(&data, gameweek, &options)?;
    eprintln!(
        "Stored gameweek {}: {} players, {} fixtures",
        gameweek,
        data.players.len(),
        data.fixtures.len()
    );
    Ok(gameweek)
}
