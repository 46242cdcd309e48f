// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded invocation of external OS tools (route, lpstat, lpoptions,
// powershell).

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Runs external tools on behalf of the OS-backed sources.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Option<String>;
}

/// Spawns real processes through [`run_command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommands;

#[async_trait]
impl CommandRunner for SystemCommands {
    async fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Option<String> {
        run_command(program, args, timeout).await
    }
}

/// Run `program args…` and return its stdout if it exits successfully
/// within `timeout`. A missing tool, non-zero exit or timeout yields `None`.
pub async fn run_command(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Ok(output)) => {
            debug!(program, status = %output.status, "command exited unsuccessfully");
            None
        }
        Ok(Err(e)) => {
            debug!(program, error = %e, "command could not be started");
            None
        }
        Err(_) => {
            debug!(program, timeout_ms = timeout.as_millis(), "command timed out");
            None
        }
    }
}
