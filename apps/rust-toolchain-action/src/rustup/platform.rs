//! Platform detection for the rustup installer.
//!
//! Two installer flavours exist: a shell script shared by Linux and macOS,
//! and a Windows executable. Any other OS cannot be bootstrapped.

use std::fmt;

use crate::errors::ActionError;

/// Operating systems the rustup installer can be bootstrapped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Macos,
    Windows,
}

impl Platform {
    /// Maps an OS name as reported by [`std::env::consts::OS`].
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Bootstrap`] for any OS without a rustup installer.
    pub fn from_os(os: &str) -> Result<Self, ActionError> {
        match os {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Macos),
            "windows" => Ok(Self::Windows),
            other => Err(ActionError::bootstrap(format!(
                "Unknown platform {other}, can't install rustup"
            ))),
        }
    }

    /// Returns the OS name this platform was detected from.
    #[must_use = "returns the platform string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
        }
    }

    /// Returns whether this platform is Windows.
    #[must_use = "returns platform check result without side effects"]
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Download location of the rustup installer for this platform.
    #[must_use]
    pub fn installer_url(self) -> &'static str {
        match self {
            Self::Linux | Self::Macos => "https://sh.rustup.rs",
            Self::Windows => "https://win.rustup.rs",
        }
    }

    /// File name the installer is saved under.
    #[must_use]
    pub fn installer_file_name(self) -> &'static str {
        match self {
            Self::Linux | Self::Macos => "rustup-init.sh",
            Self::Windows => "rustup-init.exe",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
