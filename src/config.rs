// ⚙️ Configuration
// TOML file → AppConfig, then environment overrides, then validation.

use crate::error::{InsightError, InsightResult};
use crate::report::ReportLimits;
use crate::source::{CsvSource, DataSource, SqliteSource};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "chinook-insights.toml";
pub const ENV_DATABASE: &str = "CHINOOK_DB";
pub const ENV_REPORTS_DIR: &str = "CHINOOK_REPORTS_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sqlite,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: 1400,
            height: 700,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub reports_dir: PathBuf,
    pub source: SourceKind,
    /// Directory of `<Table>.csv` exports, used when `source = "csv"`
    pub csv_dir: PathBuf,
    /// Default `env_logger` filter; `RUST_LOG` still wins
    pub log_level: String,
    pub limits: ReportLimits,
    pub chart: ChartConfig,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("data/Chinook.sqlite"),
            reports_dir: PathBuf::from("reports"),
            source: SourceKind::Sqlite,
            csv_dir: PathBuf::from("data/csv"),
            log_level: "info".to_string(),
            limits: ReportLimits::default(),
            chart: ChartConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `chinook-insights.toml` in
    /// the working directory is used when present, otherwise defaults.
    /// Environment overrides are applied before validation.
    pub fn load(path: Option<&Path>) -> InsightResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> InsightResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| InsightError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> InsightResult<Self> {
        toml::from_str(content).map_err(|e| InsightError::Config {
            message: e.to_string(),
        })
    }

    /// Apply `CHINOOK_DB` / `CHINOOK_REPORTS_DIR` through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup(ENV_REPORTS_DIR).filter(|v| !v.is_empty()) {
            self.reports_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> InsightResult<()> {
        let limits = [
            ("customers", self.limits.customers),
            ("countries", self.limits.countries),
            ("genres", self.limits.genres),
            ("artists", self.limits.artists),
            ("albums", self.limits.albums),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, n)| *n == 0) {
            return Err(InsightError::Config {
                message: format!("limits.{} must be at least 1", name),
            });
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(InsightError::Config {
                message: format!(
                    "chart size must be non-zero (got {}x{})",
                    self.chart.width, self.chart.height
                ),
            });
        }

        Ok(())
    }

    /// Path the configured source reads from
    pub fn source_location(&self) -> &Path {
        match self.source {
            SourceKind::Sqlite => &self.database_path,
            SourceKind::Csv => &self.csv_dir,
        }
    }

    /// Open the configured data source
    pub fn open_source(&self) -> InsightResult<Box<dyn DataSource>> {
        match self.source {
            SourceKind::Sqlite => Ok(Box::new(SqliteSource::open(&self.database_path)?)),
            SourceKind::Csv => Ok(Box::new(CsvSource::open(&self.csv_dir)?)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
