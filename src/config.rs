//! Layered configuration for the demand board service.
//!
//! Settings are read from a TOML file (default `demand-board.toml`), then
//! overridden by environment variables, then by CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3141
//! db_path = ".demand-board/board.db"
//! busy_timeout_ms = 5000
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [board.column_labels]
//! "Backlog" = "Pendências"
//! "To Do" = "A Fazer"
//! ```
//!
//! | Variable             | Overrides            |
//! |----------------------|----------------------|
//! | `DEMAND_BOARD_PORT`  | `server.port`        |
//! | `DEMAND_BOARD_DB`    | `server.db_path`     |
//! | `DEMAND_BOARD_LOG`   | `logging.level`      |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::kanban::projection::ColumnLabels;

pub const DEFAULT_CONFIG_FILE: &str = "demand-board.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// How long a writer waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Permissive CORS and bind on all interfaces.
    #[serde(default)]
    pub dev_mode: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3141
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".demand-board/board.db")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            dev_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSection {
    /// Display labels for the seeded column names. Custom names pass through.
    #[serde(default = "default_column_labels")]
    pub column_labels: BTreeMap<String, String>,
}

fn default_column_labels() -> BTreeMap<String, String> {
    [
        ("Backlog", "Pendências"),
        ("To Do", "A Fazer"),
        ("Doing", "Fazendo"),
        ("Done", "Concluído"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            column_labels: default_column_labels(),
        }
    }
}

/// The complete configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub board: BoardSection,
}

impl BoardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse demand-board.toml")
    }

    /// Load from `path`, falling back to defaults when the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("DEMAND_BOARD_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid DEMAND_BOARD_PORT '{}'", port))?;
        }
        if let Some(db) = lookup("DEMAND_BOARD_DB") {
            self.server.db_path = PathBuf::from(db);
        }
        if let Some(level) = lookup("DEMAND_BOARD_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Apply CLI flags, which win over file and environment.
    pub fn apply_cli(&mut self, port: Option<u16>, db_path: Option<PathBuf>, dev: bool) {
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(db_path) = db_path {
            self.server.db_path = db_path;
        }
        if dev {
            self.server.dev_mode = true;
        }
    }

    pub fn column_labels(&self) -> ColumnLabels {
        ColumnLabels::new(self.board.column_labels.clone())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; an ephemeral port will be chosen".to_string());
        }
        if self.server.busy_timeout_ms == 0 {
            warnings.push(
                "server.busy_timeout_ms is 0; concurrent writers will fail immediately"
                    .to_string(),
            );
        }
        for (name, label) in &self.board.column_labels {
            if label.trim().is_empty() {
                warnings.push(format!("Empty display label for column '{}'", name));
            }
        }

        warnings
    }
}
