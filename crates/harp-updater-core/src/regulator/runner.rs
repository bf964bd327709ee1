//! Process execution seam for the regulator executable.
//!
//! Everything above this layer talks to a `CommandRunner`, so the device
//! manager and deploy flow can be driven by a scripted runner in tests.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::RegulatorError;

/// Hides the console window that would otherwise flash for every call on Windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of one regulator invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs the regulator with a list of arguments and captures its output.
///
/// Implementations must not interpret the exit code; that is the client's job.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        args: &[String],
    ) -> impl Future<Output = Result<CommandOutput, RegulatorError>> + Send;
}

/// Spawns one OS process per call. No pooling, no timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, args: &[String]) -> Result<CommandOutput, RegulatorError> {
        debug!(program = %self.program.display(), ?args, "running regulator");

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let output = cmd.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RegulatorError::ExecutableNotFound(self.program.clone()),
            _ => RegulatorError::Launch(e),
        })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(code = ?result.code, stdout_len = result.stdout.len(), "regulator exited");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable() {
        let runner = ProcessRunner::new("/nonexistent/dir/HarpRegulator");
        let err = runner.run(&["list".to_string()]).await.unwrap_err();
        assert!(matches!(err, RegulatorError::ExecutableNotFound(_)));
    }

    #[test]
    fn test_command_output_helpers() {
        assert!(CommandOutput::success("[]").is_success());
        let failed = CommandOutput::failure(1, "boom");
        assert!(!failed.is_success());
        assert_eq!(failed.stderr, "boom");
    }
}
