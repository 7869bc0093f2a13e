//! Error types for the toolchain action.
//!
//! Every failure the action can hit is one of the `ActionError` variants.
//! None of them are recovered locally except `NotFound` for the `rustup`
//! binary itself, which triggers the installer bootstrap instead.

use std::path::PathBuf;
use thiserror::Error;

/// Consolidated error type for the toolchain action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Required binary is absent from the search path.
    #[error("unable to locate executable \"{name}\"")]
    NotFound {
        /// Name of the executable that was looked up.
        name: String,
        /// The underlying lookup error.
        #[source]
        source: which::Error,
    },

    /// Installer download or execution failed, or the platform is unknown.
    #[error("rustup bootstrap failed: {message}")]
    Bootstrap {
        /// Description of the bootstrap failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A version string or command output did not have the expected shape.
    #[error("{message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// External command exited unsuccessfully.
    #[error("command `{command}` failed with {status}")]
    CommandFailed {
        /// The command line that was executed.
        command: String,
        /// Exit status description.
        status: String,
    },

    /// External command could not be started or awaited.
    #[error("failed to execute `{command}`")]
    CommandSpawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Toolchain declaration file exists but could not be parsed.
    #[error("malformed toolchain file {}", path.display())]
    MalformedDeclaration {
        /// Path of the offending file.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A CI input or command line value could not be interpreted.
    #[error("invalid input \"{name}\": {message}")]
    InvalidInput {
        /// Input name.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// Filesystem error outside of command execution.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ActionError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(name: impl Into<String>, source: which::Error) -> Self {
        Self::NotFound {
            name: name.into(),
            source,
        }
    }

    /// Creates a new `Bootstrap` error without an underlying cause.
    #[must_use]
    pub fn bootstrap(message: impl Into<String>) -> Self {
        Self::Bootstrap {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `Bootstrap` error wrapping its cause.
    #[must_use]
    pub fn bootstrap_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Bootstrap {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a new `CommandFailed` error.
    #[must_use]
    pub fn command_failed(command: impl Into<String>, status: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: status.into(),
        }
    }

    /// Creates a new `CommandSpawn` error.
    #[must_use]
    pub fn command_spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandSpawn {
            command: command.into(),
            source,
        }
    }

    /// Creates a new `MalformedDeclaration` error.
    #[must_use]
    pub fn malformed_declaration(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::MalformedDeclaration {
            path: path.into(),
            source,
        }
    }

    /// Creates a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Io` error from an I/O error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}
