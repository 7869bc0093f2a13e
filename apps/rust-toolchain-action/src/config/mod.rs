//! Configuration for a single toolchain installation.
//!
//! ## Module Structure
//!
//! - [`raw`] - Per-source optional settings and the merge rules between sources
//! - [`options`] - Resolved, fully defaulted options and the [`Profile`] enum
//! - [`toolchain_file`] - `rust-toolchain.toml` / `rust-toolchain` discovery
//!
//! ## Precedence
//!
//! Command line values and CI inputs form the base. A toolchain file found in
//! the working directory is merged on top of it, so values pinned by the
//! project win over values passed to the action.

pub mod options;
pub mod raw;
pub mod toolchain_file;

use std::path::Path;

use tracing::debug;

pub use options::{Profile, ResolvedOptions};
pub use raw::RawConfig;

use crate::errors::ActionError;

/// Overlays the toolchain file found in `dir`, if any, on top of `base`.
///
/// # Errors
///
/// Returns an error if a toolchain file exists but cannot be read or parsed.
pub fn apply_toolchain_file(base: RawConfig, dir: &Path) -> Result<RawConfig, ActionError> {
    match toolchain_file::locate(dir) {
        Some(path) => {
            debug!("Using toolchain file {}", path.display());
            let declared = toolchain_file::load(&path)?;
            Ok(base.merge(declared))
        }
        None => Ok(base),
    }
}
