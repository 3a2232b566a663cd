//! Shell command spawning with captured output and an enforced timeout.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::ConfigError;

/// Outcome of one command run: whether it exited zero, the exit code
/// when there was one (none after a timeout or a signal), and its
/// combined stdout+stderr.
#[derive(Debug, Clone)]
pub struct ExecStatus {
    pub success: bool,
    pub code: Option<i32>,
    pub output: String,
}

/// Capability to run a shell command with environment bindings.
///
/// `Err` means the command could not be run at all; a nonzero exit is a
/// normal `ExecStatus` with `success == false`.
pub trait CommandRunner: Clone + Send + Sync + 'static {
    fn run(
        &self,
        command: &str,
        env: &[(&str, String)],
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<ExecStatus, ConfigError>> + Send;
}

/// Runs commands through `sh -c` on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        command: &str,
        env: &[(&str, String)],
        timeout: Duration,
    ) -> Result<ExecStatus, ConfigError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in env {
            cmd.env(key, value);
        }

        let child = cmd
            .spawn()
            .map_err(|e| ConfigError::Exec(format!("spawn '{command}': {e}")))?;

        // Dropping the wait future on timeout kills the child.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(out)) => {
                let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
                output.push_str(&String::from_utf8_lossy(&out.stderr));
                Ok(ExecStatus {
                    success: out.status.success(),
                    code: out.status.code(),
                    output,
                })
            }
            Ok(Err(e)) => Err(ConfigError::Exec(format!("wait '{command}': {e}"))),
            Err(_) => Ok(ExecStatus {
                success: false,
                code: None,
                output: format!("'{command}' timed out after {}s", timeout.as_secs()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let status = SystemRunner
            .run("echo out; echo err >&2", &[], TIMEOUT)
            .await
            .unwrap();
        assert!(status.success);
        assert!(status.output.contains("out"));
        assert!(status.output.contains("err"));
    }

    #[tokio::test]
    async fn test_nonzero_exit() {
        let status = SystemRunner
            .run("echo nope; exit 3", &[], TIMEOUT)
            .await
            .unwrap();
        assert!(!status.success);
        assert_eq!(status.code, Some(3));
        assert!(status.output.contains("nope"));
    }

    #[tokio::test]
    async fn test_env_binding() {
        let status = SystemRunner
            .run("echo \"$FILE\"", &[("FILE", "/tmp/render".into())], TIMEOUT)
            .await
            .unwrap();
        assert!(status.success);
        assert!(status.output.contains("/tmp/render"));
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let status = SystemRunner
            .run("sleep 10", &[], Duration::from_millis(100))
            .await
            .unwrap();
        assert!(!status.success);
        assert_eq!(status.code, None);
        assert!(status.output.contains("timed out"));
    }
}
