//! Session readiness gate
//!
//! The archive usually needs an out-of-band login before anything can be
//! listed. The coordinator awaits a [`ReadyGate`] before the first phase and
//! once more if the conversation list never shows up.

use crate::{ArchiveError, Result};
use async_trait::async_trait;
use std::io::Write;

/// Capability the coordinator awaits before traversing
#[async_trait]
pub trait ReadyGate: Send {
    /// Blocks until the session is usable
    ///
    /// `message` tells the operator what is being waited for.
    async fn wait_ready(&mut self, message: &str) -> Result<()>;
}

/// Gate that is always open, for unattended runs and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateGate;

#[async_trait]
impl ReadyGate for ImmediateGate {
    async fn wait_ready(&mut self, message: &str) -> Result<()> {
        tracing::debug!("Gate open without waiting: {}", message);
        Ok(())
    }
}

/// Gate that waits for the operator to press ENTER
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptGate;

#[async_trait]
impl ReadyGate for PromptGate {
    async fn wait_ready(&mut self, message: &str) -> Result<()> {
        let message = message.to_string();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut stdout = std::io::stdout();
            write!(stdout, "\n{} Press ENTER to continue... ", message)?;
            stdout.flush()?;

            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(())
        })
        .await
        .map_err(|e| ArchiveError::Gate(e.to_string()))??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_immediate_gate_opens() {
        let mut gate = ImmediateGate;
        assert!(gate.wait_ready("log in").await.is_ok());
        assert!(gate.wait_ready("show the list").await.is_ok());
    }
}
