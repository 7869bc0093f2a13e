//! Feature gates keyed on the installed rustup version.

use semver::Version;

use crate::errors::ActionError;

/// Oldest rustup release with `rustup set profile`.
pub const PROFILES_MIN_VERSION: Version = Version::new(1, 20, 1);

/// Oldest rustup release with `rustup toolchain install --component`.
pub const COMPONENTS_MIN_VERSION: Version = Version::new(1, 20, 1);

/// rustup features whose availability depends on the installed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Profiles,
    Components,
}

impl Feature {
    /// Oldest rustup release providing this feature.
    #[must_use]
    pub fn min_version(self) -> Version {
        match self {
            Self::Profiles => PROFILES_MIN_VERSION,
            Self::Components => COMPONENTS_MIN_VERSION,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Components => "components",
        }
    }
}

/// Extracts the version from `rustup -V` output such as
/// `rustup 1.26.0 (5af9b9484 2023-04-05)`.
///
/// # Errors
///
/// Returns [`ActionError::Parse`] if the second word is not a semantic version.
pub fn parse_version(stdout: &str) -> Result<Version, ActionError> {
    let token = stdout.split_whitespace().nth(1).unwrap_or_default();
    Version::parse(token).map_err(|_| ActionError::parse(format!("Invalid semver: {token}")))
}

/// Compares release numbers only; pre-release tags are not considered.
#[must_use]
pub fn meets_minimum(installed: &Version, minimum: &Version) -> bool {
    (installed.major, installed.minor, installed.patch)
        >= (minimum.major, minimum.minor, minimum.patch)
}
