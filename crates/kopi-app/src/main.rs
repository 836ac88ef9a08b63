use std::sync::Arc;

use tokio::signal;

mod controller;
mod debounce;
mod events;
mod io;
mod state;
mod status;
mod ui;

#[cfg(test)]
mod tests;

use controller::AppController;
use kopi_config::Config;
use state::AppState;

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_logging();

    let config = Config::new();
    let state = Arc::new(AppState::new(config));

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("ctrl-c listener failed: {e}");
            }
            tracing::info!("shutdown requested");
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::warn!("task exited"),
                Some(Ok(Err(e))) => tracing::error!("task failed: {e:#}"),
                Some(Err(e)) => tracing::error!("task panicked: {e}"),
                None => {}
            }
        }
    }

    controller.shutdown();
    tasks.shutdown().await;
}
