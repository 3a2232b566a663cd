//! Best-effort reload command after a successful commit.

use std::time::Duration;

use crate::exec::runner::CommandRunner;

/// Fires the reload command so the consuming service picks up the newly
/// committed file. A failed or missing reload never reverts the commit
/// and never fails the triggering request; it is only logged.
#[derive(Debug, Clone)]
pub struct ReloadTrigger<R> {
    command: Option<String>,
    timeout: Duration,
    runner: R,
}

impl<R: CommandRunner> ReloadTrigger<R> {
    pub fn new(command: Option<String>, timeout: Duration, runner: R) -> Self {
        Self {
            command,
            timeout,
            runner,
        }
    }

    pub async fn trigger(&self) {
        let Some(command) = &self.command else {
            return;
        };
        match self.runner.run(command, &[], self.timeout).await {
            Ok(status) if status.success => {
                tracing::info!(command = %command, "Reload command succeeded");
            }
            Ok(status) => {
                tracing::warn!(
                    command = %command,
                    exit_code = ?status.code,
                    output = %status.output.trim_end(),
                    "Reload command failed; keeping committed configuration"
                );
            }
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "Reload command could not run");
            }
        }
    }
}
