//! Shell process execution.
//!
//! The engine never talks to `std::process` directly; everything routes
//! through [`ProcessExecutor`] so tests can script exact command sequences.

use std::path::Path;
use std::process::Command;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Runs shell command lines and reports their exit codes.
///
/// Implementations must retain the standard error of the most recent command
/// so callers can attach it to failure diagnostics after the fact.
pub trait ProcessExecutor: Send + Sync {
    /// Executes `command` through the platform shell.
    ///
    /// When `output` is given it is replaced with the captured standard
    /// output. `cwd` sets the working directory for the child process.
    /// Returns the exit code; a spawn failure is an error, a non-zero exit
    /// is not.
    fn execute(&self, command: &str, output: Option<&mut String>, cwd: Option<&Path>)
    -> Result<i32>;

    /// Standard error captured from the most recent execution.
    fn error_output(&self) -> String;
}

/// [`ProcessExecutor`] backed by the platform shell.
///
/// Commands run through `sh -c` on unix and `cmd /C` on windows, so compound
/// command lines with `&&`, `||` and subshells work as written.
#[derive(Debug, Default)]
pub struct ShellExecutor {
    last_error: Mutex<String>,
}

impl ShellExecutor {
    /// Creates a new executor with no recorded error output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessExecutor for ShellExecutor {
    fn execute(
        &self,
        command: &str,
        output: Option<&mut String>,
        cwd: Option<&Path>,
    ) -> Result<i32> {
        debug!(command, cwd = ?cwd, "executing");

        let mut shell = if cfg!(windows) {
            let mut shell = Command::new("cmd");
            shell.arg("/C").arg(command);
            shell
        } else {
            let mut shell = Command::new("sh");
            shell.arg("-c").arg(command);
            shell
        };
        if let Some(dir) = cwd {
            shell.current_dir(dir);
        }

        let captured = shell
            .output()
            .map_err(|err| CoreError::spawn(command, &err))?;

        *self.last_error.lock() = String::from_utf8_lossy(&captured.stderr).into_owned();
        if let Some(buffer) = output {
            buffer.clear();
            buffer.push_str(&String::from_utf8_lossy(&captured.stdout));
        }

        // Killed by signal on unix yields no code
        Ok(captured.status.code().unwrap_or(-1))
    }

    fn error_output(&self) -> String {
        self.last_error.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn captures_stdout_and_exit_code() {
        let executor = ShellExecutor::new();
        let mut output = String::new();
        let code = executor
            .execute("printf 'hello'", Some(&mut output), None)
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(output, "hello");
    }

    #[test]
    #[cfg(unix)]
    fn reports_nonzero_exit_without_error() {
        let executor = ShellExecutor::new();
        let code = executor.execute("exit 3", None, None).unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    #[cfg(unix)]
    fn retains_stderr_of_last_command() {
        let executor = ShellExecutor::new();
        executor
            .execute("printf 'boom' >&2; exit 1", None, None)
            .unwrap();
        assert_eq!(executor.error_output(), "boom");
    }

    #[test]
    #[cfg(unix)]
    fn respects_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let executor = ShellExecutor::new();
        let mut output = String::new();
        executor.execute("pwd", Some(&mut output), Some(dir.path())).unwrap();
        let reported = std::fs::canonicalize(output.trim()).unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(reported, expected);
    }
}
