//! External process execution.
//!
//! Every interaction with `rustup`, `rustc` and `cargo` goes through the
//! [`CommandRunner`] trait so the installation flow can be exercised against
//! a recording fake in tests. Commands are awaited one at a time; nothing in
//! this crate runs two child processes concurrently.

use std::cell::RefCell;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::ActionError;

/// Locates and executes external programs.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Resolves an executable name against the search path.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] if no such executable exists.
    fn which(&self, name: &str) -> Result<PathBuf, ActionError>;

    /// Prepends `dir` to the search path for lookups and child processes.
    fn add_path(&self, dir: PathBuf);

    /// Runs `program` with its output streamed to the job log.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or exits unsuccessfully.
    async fn run(&self, program: &Path, args: &[String]) -> Result<(), ActionError>;

    /// Runs `program` and returns its standard output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or exits unsuccessfully.
    async fn run_stdout(&self, program: &Path, args: &[String]) -> Result<String, ActionError>;
}

/// [`CommandRunner`] backed by real child processes.
///
/// The search path starts as a copy of `PATH` and only grows through
/// [`CommandRunner::add_path`]; the process environment itself is never
/// modified.
#[derive(Debug)]
pub struct ProcessRunner {
    search_path: RefCell<Vec<PathBuf>>,
    cwd: PathBuf,
}

impl ProcessRunner {
    /// Creates a runner searching `path_var` (a `PATH`-style list) and
    /// starting children in `cwd`.
    #[must_use]
    pub fn new(path_var: Option<&str>, cwd: PathBuf) -> Self {
        let search_path = path_var
            .map(|value| std::env::split_paths(value).collect())
            .unwrap_or_default();
        Self {
            search_path: RefCell::new(search_path),
            cwd,
        }
    }

    fn joined_path(&self) -> Option<OsString> {
        std::env::join_paths(self.search_path.borrow().iter()).ok()
    }

    fn command(&self, program: &Path, args: &[String]) -> Command {
        let mut command = Command::new(program);
        command.args(args).current_dir(&self.cwd);
        if let Some(path) = self.joined_path() {
            command.env("PATH", path);
        }
        command
    }
}

impl CommandRunner for ProcessRunner {
    fn which(&self, name: &str) -> Result<PathBuf, ActionError> {
        which::which_in(name, self.joined_path(), &self.cwd)
            .map_err(|e| ActionError::not_found(name, e))
    }

    fn add_path(&self, dir: PathBuf) {
        let mut search_path = self.search_path.borrow_mut();
        if !search_path.contains(&dir) {
            search_path.insert(0, dir);
        }
    }

    async fn run(&self, program: &Path, args: &[String]) -> Result<(), ActionError> {
        let command_line = command_line(program, args);
        info!("[command]{command_line}");

        let status = self
            .command(program, args)
            .status()
            .await
            .map_err(|e| ActionError::command_spawn(&command_line, e))?;
        check_status(&command_line, status)
    }

    async fn run_stdout(&self, program: &Path, args: &[String]) -> Result<String, ActionError> {
        let command_line = command_line(program, args);
        info!("[command]{command_line}");

        let child = self
            .command(program, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ActionError::command_spawn(&command_line, e))?;
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ActionError::command_spawn(&command_line, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Command: {command_line}\nOutput: {stdout}");
        check_status(&command_line, output.status)?;
        Ok(stdout)
    }
}

/// Renders a program and its arguments as a single display string.
#[must_use]
pub fn command_line(program: &Path, args: &[String]) -> String {
    std::iter::once(program.display().to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_status(command_line: &str, status: ExitStatus) -> Result<(), ActionError> {
    if status.success() {
        return Ok(());
    }
    let description = status
        .code()
        .map_or_else(|| "termination by signal".to_string(), |code| format!("exit code {code}"));
    Err(ActionError::command_failed(command_line, description))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_program_and_args() {
        let args = vec!["toolchain".to_string(), "install".to_string(), "stable".to_string()];
        assert_eq!(
            command_line(Path::new("/usr/bin/rustup"), &args),
            "/usr/bin/rustup toolchain install stable"
        );
    }

    #[test]
    fn add_path_prepends_once() {
        let runner = ProcessRunner::new(Some("/usr/bin"), PathBuf::from("."));
        runner.add_path(PathBuf::from("/home/runner/.cargo/bin"));
        runner.add_path(PathBuf::from("/home/runner/.cargo/bin"));

        assert_eq!(
            *runner.search_path.borrow(),
            vec![
                PathBuf::from("/home/runner/.cargo/bin"),
                PathBuf::from("/usr/bin")
            ]
        );
    }

    #[test]
    fn which_reports_missing_binary() {
        let runner = ProcessRunner::new(Some(""), std::env::temp_dir());
        let err = runner.which("surely-not-an-installed-binary").unwrap_err();
        assert!(matches!(err, ActionError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_stdout_captures_output() {
        let runner = ProcessRunner::new(Some("/bin:/usr/bin"), std::env::temp_dir());
        let sh = runner.which("sh").unwrap();

        let stdout = runner
            .run_stdout(&sh, &["-c".to_string(), "echo rustup 1.26.0".to_string()])
            .await
            .unwrap();
        assert_eq!(stdout, "rustup 1.26.0\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_reports_exit_code() {
        let runner = ProcessRunner::new(Some("/bin:/usr/bin"), std::env::temp_dir());
        let sh = runner.which("sh").unwrap();

        let err = runner
            .run(&sh, &["-c".to_string(), "exit 3".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("failed with exit code 3"), "{err}");
    }

    #[tokio::test]
    async fn run_reports_spawn_failure() {
        let runner = ProcessRunner::new(None, std::env::temp_dir());

        let err = runner
            .run(Path::new("/nonexistent/rustup"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::CommandSpawn { .. }));
    }
}
