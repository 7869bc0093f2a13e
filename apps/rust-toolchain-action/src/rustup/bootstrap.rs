//! Installs rustup itself when the runner image does not ship it.
//!
//! The platform installer is downloaded from the official rustup URLs and run
//! non-interactively without a default toolchain; the requested toolchain is
//! installed afterwards by the regular flow. The cargo `bin` directory is then
//! added to the search path of this run and of every later workflow step.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::platform::Platform;
use super::runner::CommandRunner;
use crate::errors::ActionError;
use crate::workflow::Workflow;

/// Arguments passed to `rustup-init`.
pub const INSTALLER_ARGS: &[&str] = &["--default-toolchain", "none", "-y"];

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Environment-derived settings for the bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// OS name as reported by [`std::env::consts::OS`].
    pub os: String,
    /// Home directory; rustup installs into `<home>/.cargo`.
    pub home: Option<PathBuf>,
    /// Where the installer is downloaded to.
    pub download_dir: PathBuf,
}

impl BootstrapConfig {
    /// Builds the configuration for the current process.
    #[must_use]
    pub fn detect(workflow: &Workflow) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            home: dirs::home_dir(),
            download_dir: workflow.temp_dir(),
        }
    }

    /// Directory holding the `rustup`, `rustc` and `cargo` binaries.
    #[must_use]
    pub fn cargo_bin_dir(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(".cargo").join("bin"))
    }
}

/// Downloads and runs the rustup installer.
///
/// # Errors
///
/// Returns [`ActionError::Bootstrap`] if the platform is unknown, the home
/// directory cannot be determined, or the download or installer fails.
pub async fn install<R: CommandRunner>(
    runner: &R,
    workflow: &Workflow,
    config: &BootstrapConfig,
) -> Result<(), ActionError> {
    let platform = Platform::from_os(&config.os)?;
    let bin_dir = config
        .cargo_bin_dir()
        .ok_or_else(|| ActionError::bootstrap("unable to determine the home directory"))?;

    let installer = config.download_dir.join(platform.installer_file_name());
    download_file(platform.installer_url(), &installer).await?;

    run_installer(runner, workflow, platform, &installer, &bin_dir).await
}

/// Runs a downloaded `rustup-init` and puts `bin_dir` on the search path.
///
/// # Errors
///
/// Returns [`ActionError::Bootstrap`] if the installer fails, in which case
/// no path is added.
pub async fn run_installer<R: CommandRunner>(
    runner: &R,
    workflow: &Workflow,
    platform: Platform,
    installer: &Path,
    bin_dir: &Path,
) -> Result<(), ActionError> {
    if !platform.is_windows() {
        debug!("Executing chmod 755 on the {}", installer.display());
        make_executable(installer)?;
    }

    let args: Vec<String> = INSTALLER_ARGS.iter().map(ToString::to_string).collect();
    runner
        .run(installer, &args)
        .await
        .map_err(|e| ActionError::bootstrap_with_source("rustup-init did not succeed", e))?;

    runner.add_path(bin_dir.to_path_buf());
    workflow.add_path(bin_dir)
}

/// Streams `url` into `dest`.
async fn download_file(url: &str, dest: &Path) -> Result<(), ActionError> {
    let download_failed = |e: reqwest::Error| {
        ActionError::bootstrap_with_source(format!("failed to download {url}"), e)
    };

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ActionError::io(format!("failed to create directory {}", parent.display()), e)
        })?;
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(download_failed)?;
    let response = client.get(url).send().await.map_err(download_failed)?;

    if !response.status().is_success() {
        return Err(ActionError::bootstrap(format!(
            "HTTP error {}: {url}",
            response.status()
        )));
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| ActionError::io(format!("failed to create {}", dest.display()), e))?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(download_failed)?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ActionError::io(format!("failed to write {}", dest.display()), e))?;
        downloaded += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| ActionError::io(format!("failed to flush {}", dest.display()), e))?;

    debug!("Downloaded {downloaded} bytes from {url} to {}", dest.display());
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), ActionError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| ActionError::io(format!("failed to set permissions on {}", path.display()), e))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn make_executable(_path: &Path) -> Result<(), ActionError> {
    Ok(())
}
