//! Player-control seam.
//!
//! Everything the panel asks of the music daemon goes through `mpc`. The
//! `PlayerControl` trait keeps the poller and volume logic independent of the
//! process so tests can script the tool's answers.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use panel_proto::config::PlayerConfig;
use panel_proto::mpc::CURRENT_FORMAT;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{0}` timed out")]
    Timeout(String),
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[cfg(test)]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[cfg(test)]
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Non-zero exit or anything on stderr; mpc reports some errors with exit 0.
    pub fn is_error(&self) -> bool {
        !self.success || !self.stderr.trim().is_empty()
    }
}

#[async_trait]
pub trait PlayerControl: Send + Sync {
    /// Run the tool with `args` and capture its output.
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, PlayerError>;

    async fn status(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["status"]).await
    }

    async fn current(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["current"]).await
    }

    async fn current_formatted(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["current", "-f", CURRENT_FORMAT]).await
    }

    async fn volume(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["volume"]).await
    }

    async fn set_volume(&self, level: u8) -> Result<CommandOutput, PlayerError> {
        let level = level.to_string();
        self.run(&["volume", &level]).await
    }

    async fn clear(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["clear"]).await
    }

    async fn add(&self, uri: &str) -> Result<CommandOutput, PlayerError> {
        self.run(&["add", uri]).await
    }

    async fn play(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["play"]).await
    }

    async fn toggle(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["toggle"]).await
    }

    async fn next(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["next"]).await
    }

    async fn prev(&self) -> Result<CommandOutput, PlayerError> {
        self.run(&["prev"]).await
    }
}

/// `mpc` child-process driver.
pub struct Mpc {
    binary: PathBuf,
    host: Option<String>,
    port: Option<u16>,
    timeout: Duration,
}

impl Mpc {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            binary: panel_proto::platform::find_mpc_binary(&config.binary),
            host: config.host.clone(),
            port: config.port,
            timeout: config.timeout(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(host) = &self.host {
            cmd.args(["-h", host]);
        }
        if let Some(port) = self.port {
            cmd.arg("-p").arg(port.to_string());
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PlayerControl for Mpc {
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, PlayerError> {
        let label = format!("mpc {}", args.join(" "));
        let output = tokio::time::timeout(self.timeout, self.command(args).output())
            .await
            .map_err(|_| PlayerError::Timeout(label.clone()))?
            .map_err(|source| PlayerError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let out = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if out.is_error() {
            debug!(
                "{} -> exit={:?} stderr={:?}",
                label,
                output.status.code(),
                out.stderr.trim()
            );
        }
        Ok(out)
    }
}
