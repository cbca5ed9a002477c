//! Scripted process execution for tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use overture_core::{ProcessExecutor, Result};

/// One command the executor observed, with the working directory it ran in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct Script {
    command: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
    /// Directory created as a side effect, standing in for what the real
    /// command would have left on disk (e.g. a mirror clone).
    creates: Option<PathBuf>,
}

/// [`ProcessExecutor`] that replays a scripted sequence of commands.
///
/// Each expectation pins the exact command text. Executing a command that
/// does not match the next expectation, or executing past the end of the
/// script, panics with a diagnostic. Call [`verify`](Self::verify) at the end
/// of a test to assert the whole script was consumed.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<VecDeque<Script>>,
    invocations: Mutex<Vec<Invocation>>,
    last_error: Mutex<String>,
}

impl ScriptedExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects `command` next and scripts its exit code.
    #[must_use]
    pub fn expect(self, command: impl Into<String>, exit_code: i32) -> Self {
        self.push(command, exit_code, String::new(), String::new(), None)
    }

    /// Expects `command` next, scripting its exit code and standard output.
    #[must_use]
    pub fn expect_output(
        self,
        command: impl Into<String>,
        exit_code: i32,
        stdout: impl Into<String>,
    ) -> Self {
        self.push(command, exit_code, stdout.into(), String::new(), None)
    }

    /// Expects `command` next, scripting its exit code and standard error.
    #[must_use]
    pub fn expect_error(
        self,
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        self.push(command, exit_code, String::new(), stderr.into(), None)
    }

    /// Expects `command` next and creates `dir` when it executes, imitating
    /// the directory the real command would have produced.
    #[must_use]
    pub fn expect_creating(
        self,
        command: impl Into<String>,
        exit_code: i32,
        dir: impl Into<PathBuf>,
    ) -> Self {
        self.push(command, exit_code, String::new(), String::new(), Some(dir.into()))
    }

    fn push(
        self,
        command: impl Into<String>,
        exit_code: i32,
        stdout: String,
        stderr: String,
        creates: Option<PathBuf>,
    ) -> Self {
        self.scripts.lock().push_back(Script {
            command: command.into(),
            exit_code,
            stdout,
            stderr,
            creates,
        });
        self
    }

    /// Everything executed so far, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// The command texts executed so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.invocations
            .lock()
            .iter()
            .map(|call| call.command.clone())
            .collect()
    }

    /// Panics unless every scripted expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.scripts.lock();
        assert!(
            remaining.is_empty(),
            "expected {} more command(s), next: {:?}",
            remaining.len(),
            remaining.front().map(|s| s.command.as_str())
        );
    }
}

impl ProcessExecutor for ScriptedExecutor {
    fn execute(
        &self,
        command: &str,
        output: Option<&mut String>,
        cwd: Option<&Path>,
    ) -> Result<i32> {
        self.invocations.lock().push(Invocation {
            command: command.to_owned(),
            cwd: cwd.map(Path::to_path_buf),
        });

        let script = self
            .scripts
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command: {command}"));
        assert_eq!(
            script.command, command,
            "command mismatch\n  expected: {}\n  executed: {command}",
            script.command
        );

        if let Some(dir) = &script.creates {
            std::fs::create_dir_all(dir).unwrap_or_else(|err| {
                panic!("failed to create scripted directory {}: {err}", dir.display())
            });
        }

        *self.last_error.lock() = script.stderr;
        if let Some(buffer) = output {
            buffer.clear();
            buffer.push_str(&script.stdout);
        }
        Ok(script.exit_code)
    }

    fn error_output(&self) -> String {
        self.last_error.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn replays_script_in_order() {
        let executor = ScriptedExecutor::new()
            .expect_output("git --version", 0, "git version 2.39.2\n")
            .expect("git branch -r", 0);

        let mut output = String::new();
        assert_eq!(
            executor
                .execute("git --version", Some(&mut output), None)
                .unwrap(),
            0
        );
        assert_eq!(output, "git version 2.39.2\n");
        assert_eq!(executor.execute("git branch -r", None, None).unwrap(), 0);
        executor.verify();
    }

    #[test]
    fn records_invocations_with_cwd() {
        let executor = ScriptedExecutor::new().expect("git status", 0);
        executor
            .execute("git status", None, Some(Path::new("/tmp/pkg")))
            .unwrap();
        assert_eq!(
            executor.invocations(),
            vec![Invocation {
                command: "git status".to_owned(),
                cwd: Some(PathBuf::from("/tmp/pkg")),
            }]
        );
    }

    #[test]
    fn exposes_scripted_stderr() {
        let executor = ScriptedExecutor::new().expect_error("git fetch", 1, "fatal: repository not found");
        executor.execute("git fetch", None, None).unwrap();
        assert_eq!(executor.error_output(), "fatal: repository not found");
    }

    #[test]
    #[should_panic(expected = "unexpected command")]
    fn panics_past_end_of_script() {
        let executor = ScriptedExecutor::new();
        let _ = executor.execute("git status", None, None);
    }

    #[test]
    #[should_panic(expected = "command mismatch")]
    fn panics_on_wrong_command() {
        let executor = ScriptedExecutor::new().expect("git status", 0);
        let _ = executor.execute("git fetch", None, None);
    }
}
