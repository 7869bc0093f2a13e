//! Unresolved configuration as supplied by a single source.
//!
//! A [`RawConfig`] is produced once per source (command line plus CI inputs,
//! or a toolchain file). Every field is optional: `None` means the source did
//! not specify it, which is different from an empty list or `false`.

use super::options::{Profile, ResolvedOptions};

/// Fallback channel when no source names one.
pub const DEFAULT_CHANNEL: &str = "stable";

/// Configuration as supplied by one source, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    /// Toolchain channel, e.g. `stable`, `1.75.0` or `nightly-2024-01-01`.
    pub toolchain: Option<String>,
    /// Installation profile.
    pub profile: Option<Profile>,
    /// Extra components, in the order they were supplied.
    pub components: Option<Vec<String>>,
    /// Extra target triples, in the order they were supplied.
    pub targets: Option<Vec<String>>,
    /// Make the toolchain the rustup default.
    pub set_default: Option<bool>,
    /// Make the toolchain the override for the working directory.
    pub set_override: Option<bool>,
    /// Pass `--force` to `rustup toolchain install`.
    pub force: Option<bool>,
}

impl RawConfig {
    /// Overlays `extra` on top of `self`.
    ///
    /// Strings and lists from `extra` replace the base value only when they
    /// are present and non-empty; a list is always taken whole. Flags are
    /// `true` when either side is `true`, otherwise the base value is kept.
    #[must_use]
    pub fn merge(self, extra: RawConfig) -> RawConfig {
        RawConfig {
            toolchain: pick_string(self.toolchain, extra.toolchain),
            profile: extra.profile.or(self.profile),
            components: pick_list(self.components, extra.components),
            targets: pick_list(self.targets, extra.targets),
            set_default: either_flag(self.set_default, extra.set_default),
            set_override: either_flag(self.set_override, extra.set_override),
            force: either_flag(self.force, extra.force),
        }
    }

    /// Applies defaults to every unspecified field.
    #[must_use]
    pub fn resolve(self) -> ResolvedOptions {
        ResolvedOptions {
            toolchain: self
                .toolchain
                .filter(|toolchain| !toolchain.is_empty())
                .unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            profile: self.profile.unwrap_or_default(),
            components: self.components.unwrap_or_default(),
            targets: self.targets.unwrap_or_default(),
            set_default: self.set_default.unwrap_or(false),
            set_override: self.set_override.unwrap_or(false),
            force: self.force.unwrap_or(false),
            no_self_update: false,
            allow_downgrade: false,
        }
    }
}

fn pick_string(base: Option<String>, extra: Option<String>) -> Option<String> {
    match extra {
        Some(value) if !value.is_empty() => Some(value),
        _ => base,
    }
}

fn pick_list(base: Option<Vec<String>>, extra: Option<Vec<String>>) -> Option<Vec<String>> {
    match extra {
        Some(values) if !values.is_empty() => Some(values),
        _ => base,
    }
}

fn either_flag(base: Option<bool>, extra: Option<bool>) -> Option<bool> {
    if extra == Some(true) {
        Some(true)
    } else {
        base
    }
}
