use std::env;

use serde::{Deserialize, Serialize};

fn data_dir() -> String {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.local/share/kopi")
}

fn default_db_path() -> String {
    format!("{}/history.db", data_dir())
}

fn default_max_entries() -> usize {
    500
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl HistoryConfig {
    pub fn new() -> Self {
        let max_entries = env::var("KOPI_HISTORY_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_entries);

        Self {
            db_path: default_db_path(),
            max_entries,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::new()
    }
}
