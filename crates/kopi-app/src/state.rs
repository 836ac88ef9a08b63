use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use kopi_config::Config;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    /// Single-flight gate: at most one translation in flight.
    pub translating: AtomicBool,
    /// Set while an update runs; quitting is refused until it clears.
    pub updating: AtomicBool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            translating: AtomicBool::new(false),
            updating: AtomicBool::new(false),
        }
    }
}
