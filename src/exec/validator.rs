//! Validation of rendered candidates via the external check command.

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::error::{ConfigError, ExecError};
use crate::exec::runner::CommandRunner;

/// Invokes the check command against a rendered candidate.
///
/// The candidate bytes are written to a temporary file whose path is
/// handed to the command through the `FILE` environment variable. With no
/// check command configured, every candidate passes.
#[derive(Debug, Clone)]
pub struct Validator<R> {
    command: Option<String>,
    timeout: Duration,
    runner: R,
}

impl<R: CommandRunner> Validator<R> {
    pub fn new(command: Option<String>, timeout: Duration, runner: R) -> Self {
        Self {
            command,
            timeout,
            runner,
        }
    }

    pub async fn check(&self, rendered: &[u8]) -> Result<(), ConfigError> {
        let Some(command) = &self.command else {
            return Ok(());
        };

        let mut file = NamedTempFile::new()?;
        file.write_all(rendered)?;
        file.flush()?;
        let path = file.path().to_string_lossy().into_owned();

        let status = self
            .runner
            .run(command, &[("FILE", path)], self.timeout)
            .await?;
        if status.success {
            Ok(())
        } else {
            Err(ConfigError::Validation(ExecError {
                output: status.output,
                input: String::from_utf8_lossy(rendered).into_owned(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::runner::SystemRunner;

    fn validator(command: &str) -> Validator<SystemRunner> {
        Validator::new(Some(command.into()), Duration::from_secs(5), SystemRunner)
    }

    #[tokio::test]
    async fn test_no_command_always_passes() {
        let v: Validator<SystemRunner> =
            Validator::new(None, Duration::from_secs(5), SystemRunner);
        assert!(v.check(b"anything").await.is_ok());
    }

    #[tokio::test]
    async fn test_candidate_reaches_command_via_file() {
        let v = validator("grep -q marker \"$FILE\"");
        assert!(v.check(b"has marker inside").await.is_ok());
        assert!(v.check(b"nothing here").await.is_err());
    }

    #[tokio::test]
    async fn test_failure_carries_output_and_input() {
        let v = validator("echo broken >&2; exit 1");
        let err = v.check(b"{\"a\":1}").await.unwrap_err();
        match err {
            ConfigError::Validation(e) => {
                assert!(e.output.contains("broken"));
                assert_eq!(e.input, "{\"a\":1}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
