//! Per-message side effects.

use crate::error::ReactionError;
use async_trait::async_trait;
use botspace_api_client::Message;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Something that reacts to a newly observed message.
///
/// Called at most once per message and awaited before the next fetch.
#[async_trait]
pub trait ReactionSink: Send + Sync {
    async fn react(&self, message: &Message) -> Result<(), ReactionError>;
}

/// Runs a shell command with the message JSON on stdin.
#[derive(Debug, Clone)]
pub struct ShellReaction {
    command: String,
    timeout: Option<Duration>,
}

impl ShellReaction {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
        }
    }

    /// Kill the command if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    async fn run(&self, payload: Vec<u8>) -> Result<(), ReactionError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(ReactionError::Spawn)?;
        let stdin = child.stdin.take();

        // Feed stdin while output is drained, or a command echoing a large
        // payload fills its stdout pipe and never reads the rest.
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // The command may exit without reading its input.
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!(error = %e, "reaction command closed stdin early");
                }
            }
        };
        let ((), output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(ReactionError::Spawn)?;
        if output.status.success() {
            return Ok(());
        }

        let exit_code = output.status.code();
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ReactionError::Failed {
            exit_code,
            detail: failure_detail(exit_code, &stdout, &stderr),
        })
    }
}

#[async_trait]
impl ReactionSink for ShellReaction {
    async fn react(&self, message: &Message) -> Result<(), ReactionError> {
        let mut payload = serde_json::to_vec(message)?;
        payload.push(b'\n');

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(payload))
                .await
                .map_err(|_| ReactionError::Timeout(limit))?,
            None => self.run(payload).await,
        }
    }
}

fn failure_detail(exit_code: Option<i32>, stdout: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    let stdout = stdout.trim();
    if !stderr.is_empty() {
        stderr.to_string()
    } else if !stdout.is_empty() {
        stdout.to_string()
    } else {
        match exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}
