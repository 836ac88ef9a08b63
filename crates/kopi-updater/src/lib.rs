//! Self-update against the GitHub repo the app was installed from.
//!
//! Versions are commit hashes: the installed one comes from a
//! `version.txt` bundled next to the executable, the remote one from the
//! GitHub commits API. Updating pulls the source checkout and re-runs its
//! `install.sh`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use kanal::AsyncSender;
use kopi_config::UpdaterConfig;
use kopi_types::AppEvent;
use serde::{Deserialize, Serialize};

const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
}

/// Persisted between runs; lives next to the history database.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct UpdaterState {
    skipped_version: Option<String>,
    repo_path: Option<PathBuf>,
}

pub struct Updater {
    http: reqwest::Client,
    repo: String,
    state_path: PathBuf,
    version_file: Option<PathBuf>,
}

impl Updater {
    pub fn new(config: &UpdaterConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            repo: config.repo.clone(),
            state_path: PathBuf::from(&config.state_path),
            version_file: bundled_version_file(),
        }
    }

    /// Commit hash recorded at install time, if the bundle carries one.
    pub fn current_version(&self) -> Option<String> {
        let path = self.version_file.as_ref()?;
        let raw = std::fs::read_to_string(path).ok()?;
        let sha = raw.trim();
        if sha.is_empty() {
            None
        } else {
            Some(sha.to_string())
        }
    }

    /// Latest commit hash on master, or `None` on any network or decode
    /// failure. The check must never surface an error to the user.
    pub async fn remote_version(&self) -> Option<String> {
        let url = format!("https://api.github.com/repos/{}/commits/master", self.repo);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", "kopi")
            .timeout(CHECK_TIMEOUT)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;
        let commit: CommitResponse = response.json().await.ok()?;
        Some(commit.sha)
    }

    /// Returns the remote commit hash when it differs from the installed
    /// one and has not been skipped. Network failures and a missing
    /// version file both come back as `None`.
    pub async fn check_for_update(&self) -> Option<String> {
        let current = match self.current_version() {
            Some(sha) => sha,
            None => {
                tracing::warn!("no bundled version file, skipping update check");
                return None;
            }
        };
        let remote = self.remote_version().await?;

        if is_same_version(&current, &remote) {
            return None;
        }
        if self.load_state().skipped_version.as_deref() == Some(remote.as_str()) {
            tracing::debug!(sha = %remote, "update available but skipped by user");
            return None;
        }
        Some(remote)
    }

    /// Remember a version the user declined, so the next check stays
    /// quiet about it.
    pub fn skip_version(&self, sha: &str) -> Result<()> {
        let mut state = self.load_state();
        state.skipped_version = Some(sha.to_string());
        self.save_state(&state)
    }

    /// Pulls the source checkout and re-runs its installer, reporting
    /// progress through the app event channel. Runs on its own task; the
    /// subprocesses are not cancellable once started.
    pub fn run_update(&self, events: AsyncSender<AppEvent>) -> tokio::task::JoinHandle<()> {
        let worker = UpdateWorker {
            repo: self.repo.clone(),
            state_path: self.state_path.clone(),
        };
        tokio::spawn(async move {
            match worker.run(&events).await {
                Ok(()) => {
                    let _ = events.send(AppEvent::UpdateFinished).await;
                }
                Err(err) => {
                    tracing::error!(error = %err, "update failed");
                    let _ = events.send(AppEvent::UpdateFailed(format!("{err:#}"))).await;
                }
            }
        })
    }

    fn load_state(&self) -> UpdaterState {
        load_state(&self.state_path)
    }

    fn save_state(&self, state: &UpdaterState) -> Result<()> {
        save_state(&self.state_path, state)
    }
}

struct UpdateWorker {
    repo: String,
    state_path: PathBuf,
}

impl UpdateWorker {
    async fn run(&self, events: &AsyncSender<AppEvent>) -> Result<()> {
        let repo_path = self.ensure_repo().await?;

        let _ = events
            .send(AppEvent::UpdateProgress("updating source...".to_string()))
            .await;
        run_checked("git", &["pull", "origin", "master"], Some(&repo_path)).await?;

        let _ = events
            .send(AppEvent::UpdateProgress(
                "building and installing (takes a minute or two)...".to_string(),
            ))
            .await;
        let installer = repo_path.join("install.sh");
        let installer = installer
            .to_str()
            .ok_or_else(|| anyhow!("checkout path is not valid UTF-8"))?
            .to_string();
        run_checked("bash", &[&installer], Some(&repo_path)).await?;

        Ok(())
    }

    /// Source checkout the installer runs from; cloned on first use.
    async fn ensure_repo(&self) -> Result<PathBuf> {
        let mut state = load_state(&self.state_path);
        if let Some(path) = &state.repo_path
            && path.join(".git").is_dir()
        {
            return Ok(path.clone());
        }

        let state_dir = self
            .state_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let default_repo = state_dir.join("repo");
        if default_repo.join(".git").is_dir() {
            return Ok(default_repo);
        }

        std::fs::create_dir_all(&state_dir)
            .with_context(|| format!("failed to create {}", state_dir.display()))?;
        let url = format!("https://github.com/{}.git", self.repo);
        let target = default_repo
            .to_str()
            .ok_or_else(|| anyhow!("checkout path is not valid UTF-8"))?
            .to_string();
        run_checked("git", &["clone", &url, &target], None).await?;

        state.repo_path = Some(default_repo.clone());
        save_state(&self.state_path, &state)?;
        Ok(default_repo)
    }
}

/// Short and full hashes of the same commit compare equal.
fn is_same_version(current: &str, remote: &str) -> bool {
    current == remote || remote.starts_with(current) || current.starts_with(remote)
}

fn bundled_version_file() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("version.txt"))
}

fn load_state(path: &Path) -> UpdaterState {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return UpdaterState::default();
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

fn save_state(path: &Path, state: &UpdaterState) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let raw = serde_json::to_string_pretty(state)?;
    std::fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
}

async fn run_checked(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<()> {
    let mut command = tokio::process::Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let output = command
        .output()
        .await
        .with_context(|| format!("failed to run {program}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            return Err(anyhow!("{program} exited with {}", output.status));
        }
        return Err(anyhow!("{program} failed: {stderr}"));
    }
    Ok(())
}
