use serde::{Deserialize, Serialize};

fn default_repo() -> String {
    "kopi-app/kopi".to_string()
}

fn default_state_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.local/share/kopi/update.json")
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UpdaterConfig {
    /// GitHub `owner/name` the app was installed from.
    #[serde(default = "default_repo")]
    pub repo: String,
    /// JSON file recording the checkout path and any skipped version.
    #[serde(default = "default_state_path")]
    pub state_path: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            state_path: default_state_path(),
        }
    }
}
