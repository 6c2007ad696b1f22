use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::models::{ExpenseItem, IncomeItem, Item};
use crate::report::NetExclusions;

const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "churchledger.db";
const LOG_FILE: &str = "churchledger.log";
const EXPORT_DIR: &str = "exports";

/// User-editable settings, stored as JSON next to the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Shown in export titles.
    pub(crate) organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) database_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) export_dir: Option<PathBuf>,
    pub(crate) busy_timeout_ms: u64,
    pub(crate) income_net_exclusions: Vec<String>,
    pub(crate) expense_net_exclusions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let defaults = NetExclusions::default();
        Self {
            organization: "평안한교회".to_string(),
            database_path: None,
            export_dir: None,
            busy_timeout_ms: 5000,
            income_net_exclusions: labels(&defaults.income),
            expense_net_exclusions: labels(&defaults.expense),
        }
    }
}

impl Config {
    /// Defaults when the file does not exist yet.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    pub(crate) fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Labels that name no category are skipped with a warning.
    pub(crate) fn net_exclusions(&self) -> NetExclusions {
        NetExclusions {
            income: parse_labels::<IncomeItem>(&self.income_net_exclusions),
            expense: parse_labels::<ExpenseItem>(&self.expense_net_exclusions),
        }
    }

    pub(crate) fn resolve(&self, dirs: &AppDirs) -> Settings {
        Settings {
            organization: self.organization.clone(),
            database: self
                .database_path
                .clone()
                .unwrap_or_else(|| dirs.data.join(DATABASE_FILE)),
            export_dir: self
                .export_dir
                .clone()
                .unwrap_or_else(|| dirs.data.join(EXPORT_DIR)),
            busy_timeout: self.busy_timeout(),
            exclusions: self.net_exclusions(),
        }
    }
}

fn labels<C: Item>(items: &[C]) -> Vec<String> {
    items.iter().map(|c| c.as_str().to_string()).collect()
}

fn parse_labels<C: Item>(labels: &[String]) -> Vec<C> {
    let mut items = Vec::new();
    for label in labels {
        match C::parse(label) {
            Some(item) if !items.contains(&item) => items.push(item),
            Some(_) => {}
            None => warn!(
                label = label.as_str(),
                ledger = C::KIND.table(),
                "unknown net exclusion ignored"
            ),
        }
    }
    items
}

/// Settings after defaults and paths have been filled in.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) organization: String,
    pub(crate) database: PathBuf,
    pub(crate) export_dir: PathBuf,
    pub(crate) busy_timeout: Duration,
    pub(crate) exclusions: NetExclusions,
}

/// Per-user directories of the application.
pub(crate) struct AppDirs {
    pub(crate) data: PathBuf,
    pub(crate) config: PathBuf,
}

impl AppDirs {
    pub(crate) fn discover() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("org", "churchledger", "ChurchLedger")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let dirs = Self {
            data: proj_dirs.data_dir().to_path_buf(),
            config: proj_dirs.config_dir().to_path_buf(),
        };
        for dir in [&dirs.data, &dirs.config] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(dirs)
    }

    pub(crate) fn config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE)
    }

    pub(crate) fn log_file(&self) -> PathBuf {
        self.data.join(LOG_FILE)
    }
}

/// Load the config, writing the defaults out on first run so they can be edited.
pub(crate) fn load_or_init(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    if !path.exists() {
        config.save(path)?;
    }
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
