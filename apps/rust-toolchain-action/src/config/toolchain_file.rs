//! Discovery and parsing of rustup toolchain files.
//!
//! A project can pin its toolchain with a `rust-toolchain.toml` file, or with
//! the legacy extensionless `rust-toolchain` file holding the same TOML body:
//!
//! ```toml
//! [toolchain]
//! channel = "nightly-2024-01-01"
//! profile = "minimal"
//! components = ["rustfmt", "clippy"]
//! targets = ["wasm32-unknown-unknown"]
//! ```
//!
//! Keys this action does not act on (such as `path`) are ignored. The file
//! cannot express `default`, `override` or `force`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::options::Profile;
use super::raw::RawConfig;
use crate::errors::ActionError;

/// File names searched for, highest priority first.
pub const TOOLCHAIN_FILE_NAMES: &[&str] = &["rust-toolchain.toml", "rust-toolchain"];

/// Parsed content of a toolchain file.
#[derive(Debug, Default, Deserialize)]
pub struct ToolchainFile {
    pub toolchain: Option<ToolchainSection>,
}

/// The `[toolchain]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ToolchainSection {
    pub channel: Option<String>,
    pub profile: Option<Profile>,
    pub components: Option<Vec<String>>,
    pub targets: Option<Vec<String>>,
}

impl From<ToolchainSection> for RawConfig {
    fn from(section: ToolchainSection) -> Self {
        RawConfig {
            toolchain: section.channel,
            profile: section.profile,
            components: section.components,
            targets: section.targets,
            set_default: None,
            set_override: None,
            force: None,
        }
    }
}

/// Returns the first toolchain file present in `dir`, if any.
///
/// `rust-toolchain.toml` wins when both files exist.
#[must_use]
pub fn locate(dir: &Path) -> Option<PathBuf> {
    TOOLCHAIN_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Reads a toolchain file into a [`RawConfig`].
///
/// Empty strings and empty arrays in the file count as unspecified. A file
/// without a `[toolchain]` table yields an all-unspecified config.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or
/// [`ActionError::MalformedDeclaration`] if it is not valid TOML of the
/// expected shape.
pub fn load(path: &Path) -> Result<RawConfig, ActionError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ActionError::io(format!("failed to read {}", path.display()), e))?;
    parse(&content).map_err(|e| ActionError::malformed_declaration(path, e))
}

fn parse(content: &str) -> Result<RawConfig, toml::de::Error> {
    let file: ToolchainFile = toml::from_str(content)?;
    Ok(match file.toolchain {
        Some(section) => RawConfig::default().merge(section.into()),
        None => RawConfig::default(),
    })
}
