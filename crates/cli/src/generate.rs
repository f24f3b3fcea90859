//! Stylesheet generation through an external command.

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use voiceprint_core::{Generator, Result, VoiceprintError};

/// Pipes the prompt to a shell command's stdin and returns its stdout.
///
/// The command's stderr is passed through to the terminal. A non-zero exit
/// status is a [`VoiceprintError::GenerationFailed`].
pub struct CommandGenerator {
    command: String,
}

impl CommandGenerator {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    #[cfg(windows)]
    fn shell(&self) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", &self.command]);
        cmd
    }

    #[cfg(not(windows))]
    fn shell(&self) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", &self.command]);
        cmd
    }
}

impl Generator for CommandGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut child = self
            .shell()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceprintError::GenerationFailed(format!("could not start '{}': {}", self.command, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| VoiceprintError::GenerationFailed("generator stdin unavailable".to_string()))?;

        // A child blocked on a full stdout pipe stops reading stdin, so both run together.
        let write = async move {
            let written = stdin.write_all(prompt.as_bytes()).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        if let Err(e) = written
            && e.kind() != ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }

        let output = output?;
        if !output.status.success() {
            return Err(VoiceprintError::GenerationFailed(format!(
                "'{}' exited with {}",
                self.command, output.status
            )));
        }

        tracing::debug!(command = %self.command, bytes = output.stdout.len(), "generator finished");

        String::from_utf8(output.stdout)
            .map_err(|_| VoiceprintError::GenerationFailed(format!("'{}' produced non-UTF-8 output", self.command)))
    }
}
