// src/config.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Run configuration. Loaded from a small YAML file when present,
/// otherwise every field falls back to a conventional relative path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing the per-table source CSVs.
    pub data_dir: PathBuf,
    /// Where clean artifacts are staged.
    pub staging_dir: PathBuf,
    /// Where skip ledgers are written.
    pub skiplog_dir: PathBuf,
    /// Destination SQLite database.
    pub db_path: PathBuf,
    /// Optional quarterly distribution ZIP to unpack into `data_dir` first.
    pub quarter_zip: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            staging_dir: PathBuf::from("staging"),
            skiplog_dir: PathBuf::from("skiplogs"),
            db_path: PathBuf::from("sdwis.db"),
            quarter_zip: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
