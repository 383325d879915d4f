use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::workspace::{WorkspaceApi, WorkspaceError};

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

/// A file inside a Unity Catalog volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFile {
    pub catalog: String,
    pub schema: String,
    pub volume: String,
    pub file_name: String,
}

impl VolumeFile {
    pub fn volume_path(&self) -> String {
        format!("/Volumes/{}/{}/{}", self.catalog, self.schema, self.volume)
    }

    pub fn path(&self) -> String {
        format!("{}/{}", self.volume_path(), self.file_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    #[error("SDK download failed: {0}")]
    Download(#[from] WorkspaceError),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Downloads `file` and writes it verbatim to `local_path`. Returns the byte count.
pub async fn download_file_from_volume(
    api: &dyn WorkspaceApi,
    file: &VolumeFile,
    local_path: &Path,
) -> Result<u64, VolumeError> {
    let volume_file_path = file.path();
    info!(
        "Downloading {} to {}...",
        volume_file_path,
        local_path.display()
    );

    let download = match api.download_file(&volume_file_path).await {
        Ok(download) => download,
        Err(err) => {
            let err = VolumeError::from(err);
            error!("{}", err);
            return Err(err);
        }
    };

    if let Some(expected) = download.content_length {
        if expected != download.contents.len() as u64 {
            warn!(
                "Content-Length was {} but {} bytes were received",
                expected,
                download.contents.len()
            );
        }
    }

    tokio::fs::write(local_path, &download.contents)
        .await
        .map_err(|source| {
            let err = VolumeError::Write {
                path: local_path.to_path_buf(),
                source,
            };
            error!("{}", err);
            err
        })?;

    let file_size = download.contents.len() as u64;
    info!(
        "Successfully downloaded {} ({})",
        file.file_name,
        format_megabytes(file_size)
    );

    Ok(file_size)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
