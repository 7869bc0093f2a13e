//! Fully resolved installation options.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

use crate::errors::ActionError;

/// Named bundle of default components installed with a toolchain.
///
/// See <https://rust-lang.github.io/rustup/concepts/profiles.html>.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// `rustc`, `rust-std` and `cargo` only.
    Minimal,
    /// `minimal` plus `rust-docs`, `rustfmt` and `clippy`.
    #[default]
    Default,
    /// Every component available for the toolchain.
    Complete,
}

impl Profile {
    /// Returns the profile name as understood by `rustup set profile`.
    #[must_use = "returns the profile name without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Default => "default",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Self::Minimal),
            "default" => Ok(Self::Default),
            "complete" => Ok(Self::Complete),
            other => Err(ActionError::invalid_input(
                "profile",
                format!("expected one of minimal, default, complete, got \"{other}\""),
            )),
        }
    }
}

/// Options handed to `rustup`, with every default applied.
///
/// Built once per run by [`RawConfig::resolve`](super::RawConfig::resolve).
/// The installer later flips `no_self_update` and `allow_downgrade`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub toolchain: String,
    pub profile: Profile,
    pub components: Vec<String>,
    pub targets: Vec<String>,
    pub set_default: bool,
    pub set_override: bool,
    pub force: bool,
    /// Pass `--no-self-update` because rustup was updated earlier in this run.
    pub no_self_update: bool,
    /// Pass `--allow-downgrade` so a nightly missing a component is skipped.
    pub allow_downgrade: bool,
}
