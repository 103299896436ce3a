//! Process execution rooted at the workspace

use super::{CommandResult, SandboxError, SandboxResult, Workspace};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

impl Workspace {
    /// Run `program` with `args` directly, without a shell
    #[instrument(skip(self))]
    pub async fn run_command(&self, program: &str, args: &[String]) -> SandboxResult<CommandResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        self.execute(cmd, program.to_string(), args.to_vec()).await
    }

    /// Run a command line through `sh -c`
    #[instrument(skip(self))]
    pub async fn run_shell(&self, command_line: &str) -> SandboxResult<CommandResult> {
        self.run_command("sh", &["-c".to_string(), command_line.to_string()])
            .await
    }

    async fn execute(
        &self,
        mut cmd: Command,
        command: String,
        args: Vec<String>,
    ) -> SandboxResult<CommandResult> {
        cmd.current_dir(self.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| SandboxError::SpawnFailed(format!("{}: {}", command, e)))?;

        // Dropping the wait future on timeout kills the child
        let output = match self.shell_timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(command = %command, ?limit, "command timed out");
                    return Err(SandboxError::Timeout {
                        operation: "command",
                        limit,
                    });
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| SandboxError::SpawnFailed(format!("{}: {}", command, e)))?;

        // Killed by a signal reports no code
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(exit_code, "command finished");

        Ok(CommandResult {
            command,
            args,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        (dir, ws)
    }

    #[tokio::test]
    async fn test_run_shell_captures_streams() {
        let (_dir, ws) = workspace();
        let result = ws.run_shell("echo out; echo err >&2").await.unwrap();
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(result.success());
        assert_eq!(result.command, "sh");
        assert_eq!(result.args[0], "-c");
    }

    #[tokio::test]
    async fn test_run_shell_reports_exit_code() {
        let (_dir, ws) = workspace();
        let result = ws.run_shell("exit 3").await.unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_commands_run_in_workspace_root() {
        let (_dir, ws) = workspace();
        let result = ws.run_shell("pwd -P").await.unwrap();
        assert_eq!(result.stdout.trim(), ws.root().to_str().unwrap());
    }

    #[tokio::test]
    async fn test_run_command_without_shell() {
        let (_dir, ws) = workspace();
        std::fs::write(ws.root().join("hello.txt"), "hi").unwrap();
        let result = ws
            .run_command("ls", &["hello.txt".to_string()])
            .await
            .unwrap();
        assert_eq!(result.stdout.trim(), "hello.txt");
        assert_eq!(result.args, vec!["hello.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_run_command_missing_program() {
        let (_dir, ws) = workspace();
        let err = ws
            .run_command("definitely-not-a-real-binary-xyz", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn test_shell_timeout() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::new(dir.path())
            .unwrap()
            .with_shell_timeout(Duration::from_millis(100));
        let err = ws.run_shell("sleep 5").await.unwrap_err();
        assert!(matches!(err, SandboxError::Timeout { operation: "command", .. }));
    }
}
