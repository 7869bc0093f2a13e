//! GitHub Actions input/output protocol.
//!
//! Inputs arrive as `INPUT_<NAME>` environment variables. Outputs and PATH
//! additions are appended to the files named by `GITHUB_OUTPUT` and
//! `GITHUB_PATH`; when those are absent (older runners, local runs) the
//! legacy `::set-output` / `::add-path` workflow commands are printed instead.
//!
//! The environment is captured once in [`Workflow::from_env`] so the rest of
//! the action never reads process-global state.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::errors::ActionError;

const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";
const PATH_FILE_ENV: &str = "GITHUB_PATH";
const DELIMITER_SUFFIX_LEN: usize = 24;

/// Snapshot of the workflow environment.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    vars: HashMap<String, String>,
}

impl Workflow {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Builds a workflow from explicit variables.
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns a raw environment variable from the snapshot.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Reads a string input. Missing or blank inputs are `None`.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<String> {
        let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        self.var(&key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    }

    /// Reads a list input separated by commas or newlines.
    ///
    /// Items are trimmed and blank items dropped. An input without any items
    /// is `None`.
    #[must_use]
    pub fn input_list(&self, name: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .input(name)?
            .split([',', '\n'])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    /// Reads a boolean input using the YAML 1.2 core schema spellings.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidInput`] for any other value.
    pub fn input_bool(&self, name: &str) -> Result<Option<bool>, ActionError> {
        match self.input(name).as_deref() {
            None => Ok(None),
            Some("true" | "True" | "TRUE") => Ok(Some(true)),
            Some("false" | "False" | "FALSE") => Ok(Some(false)),
            Some(other) => Err(ActionError::invalid_input(
                name,
                format!("expected true or false, got \"{other}\""),
            )),
        }
    }

    /// Publishes a step output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file cannot be written or the value
    /// collides with the heredoc delimiter.
    pub fn set_output(&self, name: &str, value: &str) -> Result<(), ActionError> {
        match self.var(OUTPUT_FILE_ENV) {
            Some(file) => append_line(Path::new(file), &format_output(name, value)?),
            None => {
                println!("::set-output name={name}::{}", escape_data(value));
                Ok(())
            }
        }
    }

    /// Prepends `dir` to `PATH` for the following workflow steps.
    ///
    /// # Errors
    ///
    /// Returns an error if the path file cannot be written.
    pub fn add_path(&self, dir: &Path) -> Result<(), ActionError> {
        match self.var(PATH_FILE_ENV) {
            Some(file) => append_line(Path::new(file), &dir.display().to_string()),
            None => {
                println!("::add-path::{}", dir.display());
                Ok(())
            }
        }
    }

    /// Opens a collapsible log group that closes when the guard is dropped.
    #[must_use = "the group closes as soon as the guard is dropped"]
    pub fn group(&self, title: &str) -> LogGroup {
        println!("::group::{title}");
        LogGroup { _private: () }
    }

    /// Directory for temporary files provided by the runner.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.var("RUNNER_TEMP")
            .filter(|dir| !dir.is_empty())
            .map_or_else(std::env::temp_dir, PathBuf::from)
    }
}

/// Guard returned by [`Workflow::group`].
pub struct LogGroup {
    _private: (),
}

impl Drop for LogGroup {
    fn drop(&mut self) {
        println!("::endgroup::");
    }
}

/// Escapes data for a workflow command.
#[must_use]
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn format_output(name: &str, value: &str) -> Result<String, ActionError> {
    if !value.contains('\n') && !value.contains('\r') {
        return Ok(format!("{name}={value}"));
    }
    format_heredoc(name, value, &random_delimiter())
}

/// Heredoc delimiter with a random alphanumeric suffix.
fn random_delimiter() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DELIMITER_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("ghadelimiter_{suffix}")
}

fn format_heredoc(name: &str, value: &str, delimiter: &str) -> Result<String, ActionError> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(ActionError::invalid_input(
            name,
            format!("output value must not contain the delimiter {delimiter}"),
        ));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}"))
}

fn append_line(file: &Path, line: &str) -> Result<(), ActionError> {
    let mut handle = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .map_err(|e| ActionError::io(format!("failed to open {}", file.display()), e))?;
    writeln!(handle, "{line}")
        .map_err(|e| ActionError::io(format!("failed to write {}", file.display()), e))
}
