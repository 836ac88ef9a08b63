//! CLI backend path: claude / gemini invoked as local executables.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::registry;
use crate::TranslateError;

/// Runs the CLI for `model` and returns its raw stdout.
pub(crate) async fn run_model(
    model: &str,
    prompt: &str,
    wait: Duration,
) -> Result<String, TranslateError> {
    if registry::is_gemini_cli(model) {
        run("gemini", &["-p", prompt], wait).await
    } else {
        run("claude", &["-p", prompt, "--model", model], wait).await
    }
}

pub(crate) async fn run(
    program: &str,
    args: &[&str],
    wait: Duration,
) -> Result<String, TranslateError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .env("PATH", augmented_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TranslateError::NotInstalled(program.to_string()));
        }
        Err(e) => {
            return Err(TranslateError::Provider {
                message: format!("failed to launch {program}: {e}"),
            });
        }
    };

    let output = match timeout(wait, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(TranslateError::Provider {
                message: format!("{program} did not produce output: {e}"),
            });
        }
        Err(_) => return Err(TranslateError::Timeout(wait.as_secs())),
    };

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::warn!(program, code = ?output.status.code(), "CLI backend failed");
        Err(TranslateError::Provider {
            message: if stderr.is_empty() {
                "translation failed".to_string()
            } else {
                stderr
            },
        })
    }
}

/// Prepends the usual user-install locations so a bundled build still finds
/// CLIs installed outside the login shell PATH.
fn augmented_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let current = std::env::var("PATH").unwrap_or_default();
    format!("{home}/.local/bin:/opt/homebrew/bin:/usr/local/bin:{current}")
}
