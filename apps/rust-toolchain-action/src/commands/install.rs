//! Install command for the toolchain action.
//!
//! ## Process
//!
//! 1. Locate rustup, bootstrapping it if the runner does not have it
//! 2. Merge command line values and CI inputs with the project toolchain file
//! 3. Self-update rustup once if it is too old for profiles or components
//! 4. Set the profile, install the toolchain and add targets
//! 5. Report the active toolchain and publish version outputs

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use crate::config::{self, Profile, RawConfig, ResolvedOptions};
use crate::errors::ActionError;
use crate::outputs;
use crate::rustup::{BootstrapConfig, CommandRunner, ProcessRunner, Rustup};
use crate::workflow::Workflow;

/// Channel name that triggers the automatic downgrade allowance.
const NIGHTLY: &str = "nightly";

/// Arguments for the install command.
///
/// Every option falls back to the CI input of the same name when it is not
/// given on the command line.
#[derive(Args, Debug, Default)]
pub struct InstallArgs {
    /// Toolchain to install (e.g. "stable", "1.75.0", "nightly-2024-01-01").
    #[arg(long)]
    pub toolchain: Option<String>,

    /// Toolchain profile to install.
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,

    /// Components to install. May be repeated or comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub components: Vec<String>,

    /// Platform(s) to install the toolchain for. May be repeated or comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub targets: Vec<String>,

    /// Set the installed toolchain as the rustup default.
    #[arg(long)]
    pub default: bool,

    /// Set the installed toolchain as the override for the current directory.
    #[arg(long = "override")]
    pub set_override: bool,

    /// Force an update, even if some components are missing.
    #[arg(long)]
    pub force: bool,
}

impl InstallArgs {
    /// Combines the command line with the CI inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if a CI input cannot be interpreted.
    pub fn to_raw_config(&self, workflow: &Workflow) -> Result<RawConfig, ActionError> {
        let profile = match self.profile {
            Some(profile) => Some(profile),
            None => workflow
                .input("profile")
                .map(|value| value.parse::<Profile>())
                .transpose()?,
        };

        Ok(RawConfig {
            toolchain: self.toolchain.clone().or_else(|| workflow.input("toolchain")),
            profile,
            components: non_empty(&self.components).or_else(|| workflow.input_list("components")),
            targets: non_empty(&self.targets).or_else(|| workflow.input_list("targets")),
            set_default: flag(self.default, workflow, "default")?,
            set_override: flag(self.set_override, workflow, "override")?,
            force: flag(self.force, workflow, "force")?,
        })
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

fn flag(cli: bool, workflow: &Workflow, input: &str) -> Result<Option<bool>, ActionError> {
    if cli {
        Ok(Some(true))
    } else {
        workflow.input_bool(input)
    }
}

/// Executes the install command.
///
/// # Errors
///
/// Returns an error if any step fails; no step is retried.
pub async fn execute(args: &InstallArgs, workflow: &Workflow) -> Result<()> {
    let input = args.to_raw_config(workflow)?;

    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let runner = ProcessRunner::new(workflow.var("PATH"), cwd.clone());
    let bootstrap = BootstrapConfig::detect(workflow);

    let rustup = Rustup::get_or_install(&runner, workflow, &bootstrap).await?;
    debug!("Using rustup at {}", rustup.path().display());

    let input = config::apply_toolchain_file(input, &cwd)?;
    debug!("{input:?}");
    let options = input.resolve();

    run(&rustup, options, workflow).await?;
    Ok(())
}

/// Installs the toolchain described by `options` and publishes the outputs.
///
/// # Errors
///
/// Returns the first failing step's error.
pub async fn run<R: CommandRunner>(
    rustup: &Rustup<'_, R>,
    mut options: ResolvedOptions,
    workflow: &Workflow,
) -> Result<(), ActionError> {
    let mut should_self_update = !rustup.supports_profiles().await?;

    if !options.components.is_empty() && !rustup.supports_components().await? {
        should_self_update = true;
    }

    if should_self_update {
        let _group = workflow.group("Updating rustup");
        rustup.self_update().await?;
        options.no_self_update = true;
    }

    rustup.set_profile(options.profile).await?;

    apply_downgrade_policy(&mut options);

    rustup.install_toolchain(&options).await?;

    if !options.targets.is_empty() {
        rustup.add_targets(&options).await?;
    }

    info!("{}", rustup.active_toolchain().await?);

    for output in outputs::collect(rustup.runner()).await? {
        workflow.set_output(output.name, &output.value)?;
    }
    Ok(())
}

/// Allows rustup to fall back to an older nightly that has every requested
/// component.
///
/// Applies only to the bare `nightly` channel with at least one component;
/// a dated nightly is left pinned. See rust-lang/rustup#2146.
pub fn apply_downgrade_policy(options: &mut ResolvedOptions) {
    if options.toolchain == NIGHTLY && !options.components.is_empty() {
        options.allow_downgrade = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rustup::runner::fake::FakeRunner;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn resolved(toolchain: &str, components: &[&str]) -> ResolvedOptions {
        RawConfig {
            toolchain: Some(toolchain.into()),
            components: Some(strings(components)),
            ..RawConfig::default()
        }
        .resolve()
    }

    /// Workflow writing outputs into a fresh temporary file.
    fn workflow_with_output(temp: &TempDir) -> Workflow {
        let output = temp.child("output").path().display().to_string();
        Workflow::from_vars([("GITHUB_OUTPUT", output)])
    }

    #[test]
    fn downgrade_allowed_for_bare_nightly_with_components() {
        let mut options = resolved("nightly", &["rustfmt"]);
        apply_downgrade_policy(&mut options);
        assert!(options.allow_downgrade);
    }

    #[test]
    fn downgrade_not_allowed_otherwise() {
        for (toolchain, components) in [
            ("nightly-2020-03-20", &["rustfmt"][..]),
            ("stable", &["rustfmt"][..]),
            ("nightly", &[][..]),
            ("Nightly", &["clippy"][..]),
        ] {
            let mut options = resolved(toolchain, components);
            apply_downgrade_policy(&mut options);
            assert!(
                !options.allow_downgrade,
                "{toolchain} with {components:?} must not allow downgrade"
            );
        }
    }

    #[test]
    fn cli_values_win_over_inputs() {
        let workflow = Workflow::from_vars([
            ("INPUT_TOOLCHAIN", "beta"),
            ("INPUT_COMPONENTS", "miri"),
            ("INPUT_PROFILE", "complete"),
        ]);
        let args = InstallArgs {
            toolchain: Some("nightly".into()),
            components: strings(&["rustfmt", "clippy"]),
            ..InstallArgs::default()
        };

        let raw = args.to_raw_config(&workflow).unwrap();
        assert_eq!(raw.toolchain.as_deref(), Some("nightly"));
        assert_eq!(raw.components, Some(strings(&["rustfmt", "clippy"])));
        assert_eq!(raw.profile, Some(Profile::Complete));
    }

    #[test]
    fn inputs_fill_unset_options() {
        let workflow = Workflow::from_vars([
            ("INPUT_TOOLCHAIN", "1.75.0"),
            ("INPUT_TARGETS", "wasm32-unknown-unknown, thumbv7em-none-eabihf"),
            ("INPUT_DEFAULT", "true"),
            ("INPUT_OVERRIDE", "false"),
        ]);

        let raw = InstallArgs::default().to_raw_config(&workflow).unwrap();
        assert_eq!(raw.toolchain.as_deref(), Some("1.75.0"));
        assert_eq!(
            raw.targets,
            Some(strings(&["wasm32-unknown-unknown", "thumbv7em-none-eabihf"]))
        );
        assert_eq!(raw.set_default, Some(true));
        assert_eq!(raw.set_override, Some(false));
        assert_eq!(raw.force, None);
        assert_eq!(raw.components, None);
    }

    #[test]
    fn invalid_profile_input_is_rejected() {
        let workflow = Workflow::from_vars([("INPUT_PROFILE", "everything")]);
        let err = InstallArgs::default().to_raw_config(&workflow).unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput { .. }));
    }

    #[test]
    fn cli_flag_wins_over_false_input() {
        let workflow = Workflow::from_vars([("INPUT_FORCE", "false")]);
        let args = InstallArgs {
            force: true,
            ..InstallArgs::default()
        };

        assert_eq!(args.to_raw_config(&workflow).unwrap().force, Some(true));
    }

    #[tokio::test]
    async fn nightly_with_components_on_current_rustup() {
        let temp = TempDir::new().unwrap();
        let workflow = workflow_with_output(&temp);
        let runner = FakeRunner::with_rustup_version("1.25.0");
        let rustup = Rustup::get(&runner).unwrap();

        run(&rustup, resolved("nightly", &["c1", "c2"]), &workflow)
            .await
            .unwrap();

        assert_eq!(
            runner.rustup_actions(),
            vec![
                strings(&["set", "profile", "default"]),
                strings(&[
                    "toolchain",
                    "install",
                    "nightly",
                    "--component",
                    "c1",
                    "--component",
                    "c2",
                    "--allow-downgrade"
                ]),
            ]
        );
    }

    #[tokio::test]
    async fn old_rustup_self_updates_once() {
        let temp = TempDir::new().unwrap();
        let workflow = workflow_with_output(&temp);
        let runner = FakeRunner::with_rustup_version("1.19.0");
        let rustup = Rustup::get(&runner).unwrap();

        run(&rustup, resolved("stable", &["clippy"]), &workflow)
            .await
            .unwrap();

        let actions = runner.rustup_actions();
        let self_updates = actions
            .iter()
            .filter(|args| *args == &strings(&["self", "update"]))
            .count();
        assert_eq!(self_updates, 1);
        assert_eq!(actions[0], strings(&["self", "update"]));
        assert_eq!(
            actions[2],
            strings(&[
                "toolchain",
                "install",
                "stable",
                "--component",
                "clippy",
                "--no-self-update"
            ])
        );
    }

    #[tokio::test]
    async fn components_version_only_checked_when_components_requested() {
        let temp = TempDir::new().unwrap();
        let workflow = workflow_with_output(&temp);
        let runner = FakeRunner::with_rustup_version("1.26.0");
        let rustup = Rustup::get(&runner).unwrap();

        run(&rustup, resolved("stable", &[]), &workflow).await.unwrap();

        let version_queries = runner
            .calls_to("rustup")
            .iter()
            .filter(|args| *args == &strings(&["-V"]))
            .count();
        // one for profiles, one for the `rustup` output
        assert_eq!(version_queries, 2);
    }

    #[tokio::test]
    async fn failed_self_update_aborts_run() {
        let temp = TempDir::new().unwrap();
        let workflow = workflow_with_output(&temp);
        let runner = FakeRunner::with_rustup_version("1.19.0").failing_on(&["rustup", "self"]);
        let rustup = Rustup::get(&runner).unwrap();

        let err = run(&rustup, resolved("stable", &[]), &workflow)
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::CommandFailed { .. }));
        assert_eq!(runner.rustup_actions(), vec![strings(&["self", "update"])]);
        temp.child("output").assert(predicates::path::missing());
    }

    #[tokio::test]
    async fn targets_added_after_install_and_outputs_published() {
        let temp = TempDir::new().unwrap();
        let workflow = workflow_with_output(&temp);
        let runner = FakeRunner::default();
        let rustup = Rustup::get(&runner).unwrap();
        let mut options = resolved("1.75.0", &[]);
        options.targets = strings(&["wasm32-wasip1"]);
        options.set_default = true;
        options.profile = Profile::Minimal;

        run(&rustup, options, &workflow).await.unwrap();

        assert_eq!(
            runner.rustup_actions(),
            vec![
                strings(&["set", "profile", "minimal"]),
                strings(&["toolchain", "install", "1.75.0"]),
                strings(&["default", "1.75.0"]),
                strings(&["target", "add", "wasm32-wasip1", "--toolchain", "1.75.0"]),
            ]
        );
        temp.child("output").assert(
            "rustc=1.75.0\nrustc_hash=82e1608df\ncargo=1.75.0\nrustup=1.26.0\n",
        );
    }

    #[tokio::test]
    async fn failed_install_skips_targets() {
        let temp = TempDir::new().unwrap();
        let workflow = workflow_with_output(&temp);
        let runner = FakeRunner::default().failing_on(&["rustup", "toolchain", "install"]);
        let rustup = Rustup::get(&runner).unwrap();
        let mut options = resolved("stable", &[]);
        options.targets = strings(&["wasm32-wasip1"]);

        assert!(run(&rustup, options, &workflow).await.is_err());
        assert!(
            runner
                .rustup_actions()
                .iter()
                .all(|args| args[0] != "target")
        );
    }
}
