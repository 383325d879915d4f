//! Startup sequence of the large file app: download, then hand over to the viewer.

use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;

use crate::config::{AuthMode, VolumeConfig};
use crate::volume::download_file_from_volume;
use crate::workspace::{WorkspaceApi, WorkspaceClient};

pub const VIEWER_BINARY: &str = "large-file-viewer";

const RULE_WIDTH: usize = 50;

pub fn banner(config: &VolumeConfig) -> Vec<String> {
    vec![
        "Databricks App Startup".to_string(),
        "=".repeat(RULE_WIDTH),
        "Configuration:".to_string(),
        format!("  Volume: {}", config.file.volume_path()),
        format!("  File: {}", config.file.file_name),
        format!("  Local path: {}", config.local_path.display()),
        "=".repeat(RULE_WIDTH),
    ]
}

/// Downloads the configured file with a client built from the environment.
/// Failures are logged, never fatal.
pub async fn download_step(config: &VolumeConfig) -> bool {
    let client = match AuthMode::from_env() {
        Ok(auth) => WorkspaceClient::new(auth).map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };

    match client {
        Ok(client) => download_with(&client, config).await,
        Err(err) => {
            warn!("Failed to initialize workspace client: {}", err);
            report_download(false)
        }
    }
}

pub async fn download_with(api: &dyn WorkspaceApi, config: &VolumeConfig) -> bool {
    let downloaded = download_file_from_volume(api, &config.file, &config.local_path)
        .await
        .is_ok();
    report_download(downloaded)
}

fn report_download(downloaded: bool) -> bool {
    if downloaded {
        info!("File download completed successfully");
    } else {
        warn!("File download failed, but continuing with app startup");
    }
    info!("{}", "-".repeat(RULE_WIDTH));

    downloaded
}

/// The viewer binary is installed next to the startup binary.
pub fn viewer_executable() -> io::Result<PathBuf> {
    let current = std::env::current_exe()?;
    Ok(current.with_file_name(format!(
        "{}{}",
        VIEWER_BINARY,
        std::env::consts::EXE_SUFFIX
    )))
}

/// Runs `program` and waits for it. Ctrl-C kills the child and waits for it to exit.
pub async fn run_viewer(program: &Path) -> io::Result<ExitStatus> {
    info!("Running: {}", program.display());
    let mut child = Command::new(program).spawn()?;

    tokio::select! {
        status = child.wait() => status,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            child.start_kill()?;
            child.wait().await
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
