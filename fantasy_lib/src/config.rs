//! Runtime configuration: defaults, then environment, then whatever the caller overrides.

use std::path::PathBuf;
use std::time::Duration;

use fantasy_api::{RetryPolicy, DEFAULT_BASE_URL};

use crate::enrich::DEFAULT_CONCURRENCY;
use crate::models::ManagerID;

pub const DEFAULT_DB_PATH: &str = "./data/data.sqlite";
pub const DEFAULT_EXPORT_DIR: &str = "./exports";
pub const DEFAULT_DUMP_TOOL: &str = "sqlite3";

/// Everything an import run needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API root the client appends endpoint paths to.
    pub base_url: String,
    /// Snapshot store location.
    pub db_path: PathBuf,
    /// Parent of the per-gameweek export directories.
    pub export_dir: PathBuf,
    pub retry: RetryPolicy,
    /// Upper bound on concurrent history fetches.
    pub concurrency: usize,
    /// Managers whose picks are fetched alongside the snapshot.
    pub manager_ids: Vec<ManagerID>,
    /// External utility used to dump tables.
    pub dump_tool: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            retry: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            manager_ids: Vec::new(),
            dump_tool: DEFAULT_DUMP_TOOL.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `BETTERFANTASY_*` environment variables.
    ///
    /// Unparseable values fall back to the default instead of failing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string("BETTERFANTASY_BASE_URL", &defaults.base_url),
            db_path: env_string("BETTERFANTASY_DB", DEFAULT_DB_PATH).into(),
            export_dir: env_string("BETTERFANTASY_EXPORT_DIR", DEFAULT_EXPORT_DIR).into(),
            retry: RetryPolicy::new(
                env_u32("BETTERFANTASY_RETRY_MAX", defaults.retry.retries),
                Duration::from_millis(env_u64(
                    "BETTERFANTASY_RETRY_BASE_MS",
                    defaults.retry.base.as_millis() as u64,
                )),
            ),
            concurrency: env_usize("BETTERFANTASY_CONCURRENCY", defaults.concurrency),
            manager_ids: std::env::var("BETTERFANTASY_MANAGERS")
                .map(|v| parse_id_list(&v))
                .unwrap_or_default(),
            dump_tool: env_string("BETTERFANTASY_DUMP_TOOL", DEFAULT_DUMP_TOOL),
        }
    }
}

/// Parses `"123, 456"` into ids, skipping anything that is not a number.
pub fn parse_id_list(value: &str) -> Vec<ManagerID> {
    value
        .split(',')
        .filter_map(|s| s.trim().parse::<ManagerID>().ok())
        .collect()
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}
