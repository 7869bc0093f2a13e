//! rustup integration.
//!
//! ## Module Structure
//!
//! - [`runner`] - Process execution behind the [`CommandRunner`] trait
//! - [`version`] - Version parsing and per-feature minimum versions
//! - [`platform`] - OS detection for the installer
//! - [`bootstrap`] - Download and run `rustup-init` when rustup is missing

pub mod bootstrap;
pub mod platform;
pub mod runner;
pub mod version;

use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{error, info, warn};

pub use bootstrap::BootstrapConfig;
pub use runner::{CommandRunner, ProcessRunner};
pub use version::Feature;

use crate::config::{Profile, ResolvedOptions};
use crate::errors::ActionError;
use crate::workflow::Workflow;

const BINARY_NAME: &str = "rustup";

/// Handle on an installed `rustup` binary.
pub struct Rustup<'r, R> {
    path: PathBuf,
    runner: &'r R,
}

impl<'r, R: CommandRunner> Rustup<'r, R> {
    /// Locates `rustup` on the search path.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NotFound`] if `rustup` is not installed.
    pub fn get(runner: &'r R) -> Result<Self, ActionError> {
        let path = runner.which(BINARY_NAME)?;
        Ok(Self { path, runner })
    }

    /// Locates `rustup`, bootstrapping it first if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the bootstrap fails or `rustup` still cannot be
    /// found afterwards.
    pub async fn get_or_install(
        runner: &'r R,
        workflow: &Workflow,
        config: &BootstrapConfig,
    ) -> Result<Self, ActionError> {
        match Self::get(runner) {
            Ok(rustup) => Ok(rustup),
            Err(reason) => {
                info!("Unable to find \"rustup\" executable, installing it now. Reason: {reason}");
                bootstrap::install(runner, workflow, config)
                    .await
                    .inspect_err(|e| error!("Error during rustup installation: {e}"))?;
                Self::get(runner)
            }
        }
    }

    /// Path of the `rustup` binary in use.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runner used for every `rustup` invocation.
    #[must_use]
    pub fn runner(&self) -> &'r R {
        self.runner
    }

    /// Queries the installed rustup version.
    ///
    /// # Errors
    ///
    /// Returns an error if `rustup -V` fails or prints an invalid version.
    pub async fn version(&self) -> Result<Version, ActionError> {
        let stdout = self.call_stdout(&["-V"]).await?;
        version::parse_version(&stdout).inspect_err(|e| error!("{e}"))
    }

    /// Checks whether the installed rustup provides `feature`.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be determined.
    pub async fn supports(&self, feature: Feature) -> Result<bool, ActionError> {
        let installed = self.version().await?;
        let minimum = feature.min_version();
        let supported = version::meets_minimum(&installed, &minimum);
        if supported {
            info!("Installed rustup {installed} supports {}", feature.name());
        } else {
            warn!(
                "Installed rustup {installed} does not support {}, expected at least {minimum}",
                feature.name()
            );
        }
        Ok(supported)
    }

    /// Checks whether the installed rustup supports `rustup set profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be determined.
    pub async fn supports_profiles(&self) -> Result<bool, ActionError> {
        self.supports(Feature::Profiles).await
    }

    /// Checks whether the installed rustup supports installing components.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be determined.
    pub async fn supports_components(&self) -> Result<bool, ActionError> {
        self.supports(Feature::Components).await
    }

    /// Runs `rustup self update`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn self_update(&self) -> Result<(), ActionError> {
        self.call(&["self", "update"]).await
    }

    /// Runs `rustup set profile <profile>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn set_profile(&self, profile: Profile) -> Result<(), ActionError> {
        self.call(&["set", "profile", profile.as_str()]).await
    }

    /// Installs the toolchain, then applies the default and override settings.
    ///
    /// # Errors
    ///
    /// Returns an error as soon as one of the commands fails.
    pub async fn install_toolchain(&self, options: &ResolvedOptions) -> Result<(), ActionError> {
        self.runner.run(&self.path, &install_args(options)).await?;

        if options.set_default {
            self.call(&["default", options.toolchain.as_str()]).await?;
        }
        if options.set_override {
            self.call(&["override", "set", options.toolchain.as_str()]).await?;
        }
        Ok(())
    }

    /// Runs `rustup target add` for every requested target.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn add_targets(&self, options: &ResolvedOptions) -> Result<(), ActionError> {
        self.runner.run(&self.path, &target_args(options)).await
    }

    /// Returns the name of the active toolchain.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Parse`] if rustup prints nothing.
    pub async fn active_toolchain(&self) -> Result<String, ActionError> {
        let stdout = self.call_stdout(&["show", "active-toolchain"]).await?;
        match stdout.split(' ').next().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => {
                let err = ActionError::parse("Unable to determine active toolchain");
                error!("{err}");
                Err(err)
            }
        }
    }

    async fn call(&self, args: &[&str]) -> Result<(), ActionError> {
        self.runner.run(&self.path, &owned(args)).await
    }

    async fn call_stdout(&self, args: &[&str]) -> Result<String, ActionError> {
        self.runner.run_stdout(&self.path, &owned(args)).await
    }
}

/// Arguments for `rustup toolchain install`.
#[must_use]
pub fn install_args(options: &ResolvedOptions) -> Vec<String> {
    let mut args = owned(&["toolchain", "install", options.toolchain.as_str()]);

    for component in &options.components {
        args.push("--component".to_string());
        args.push(component.clone());
    }
    if options.no_self_update {
        args.push("--no-self-update".to_string());
    }
    if options.allow_downgrade {
        args.push("--allow-downgrade".to_string());
    }
    if options.force {
        args.push("--force".to_string());
    }
    args
}

/// Arguments for `rustup target add`.
#[must_use]
pub fn target_args(options: &ResolvedOptions) -> Vec<String> {
    let mut args = owned(&["target", "add"]);
    args.extend(options.targets.iter().cloned());
    args.extend(owned(&["--toolchain", options.toolchain.as_str()]));
    args
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}
