//! Build invocation
//!
//! Runs the external build tool in a unit's workspace root with stdout and
//! stderr both redirected into the workspace log file. The call blocks its
//! task until the process exits; no timeout is applied.

use crate::error::UnitError;
use async_trait::async_trait;
use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Exit status of a build process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStatus {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl BuildStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a build in a prepared workspace.
///
/// `run` must write the build's combined output to `log_path` and return
/// once the build has finished. Errors are reserved for failures to run the
/// build at all; a build that ran and failed is a non-success status.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    async fn run(&self, workspace_root: &Path, log_path: &Path) -> Result<BuildStatus, UnitError>;
}

/// Runs a shell command line (default `smithy build`).
#[derive(Debug, Clone)]
pub struct ShellBuildRunner {
    command: String,
}

impl ShellBuildRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn shell_command(&self) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

#[async_trait]
impl BuildRunner for ShellBuildRunner {
    async fn run(&self, workspace_root: &Path, log_path: &Path) -> Result<BuildStatus, UnitError> {
        // Held until the process exits so output is never written to a closed log.
        let log = File::create(log_path).map_err(|e| UnitError::io(log_path, e))?;
        let stdout = log.try_clone().map_err(|e| UnitError::io(log_path, e))?;
        let stderr = log.try_clone().map_err(|e| UnitError::io(log_path, e))?;

        debug!(
            command = %self.command,
            cwd = %workspace_root.display(),
            "Spawning build"
        );
        let mut child = self
            .shell_command()
            .current_dir(workspace_root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| UnitError::io(workspace_root, e))?;

        let status = child
            .wait()
            .await
            .map_err(|e| UnitError::io(workspace_root, e))?;
        drop(log);

        debug!(status = ?status.code(), "Build process exited");
        Ok(BuildStatus {
            code: status.code(),
        })
    }
}
