//! Filesystem storage for generated report files.

use std::path::{Component, Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;
use tokio::fs;
use tracing::warn;

use crate::error::AppError;

const FILE_NAME_LENGTH: usize = 24;

/// Stores report files under a root directory as `<user_id>/<random>.<ext>`.
///
/// Paths handed back to callers are relative to the root; every read
/// re-validates them so a tampered path cannot escape the root.
#[derive(Debug, Clone)]
pub struct ReportStorage {
    root: PathBuf,
}

impl ReportStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` to a new file and returns its relative path.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the directory or file cannot be written.
    pub async fn store(
        &self,
        user_id: i64,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let name: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(FILE_NAME_LENGTH)
            .map(char::from)
            .collect();
        let relative = format!("{user_id}/{name}.{extension}");

        let dir = self.root.join(user_id.to_string());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("create report directory", e))?;
        fs::write(self.root.join(&relative), bytes)
            .await
            .map_err(|e| storage_error("write report file", e))?;

        Ok(relative)
    }

    /// Reads a stored file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the path is invalid or the file is missing.
    /// Returns [`AppError::Internal`] on other I/O errors.
    pub async fn read(&self, relative: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(relative)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found(
                "Report file not found",
                json!({ "path": relative }),
            )),
            Err(e) => Err(storage_error("read report file", e)),
        }
    }

    /// Deletes a stored file, ignoring failures.
    pub async fn remove(&self, relative: &str) {
        let Ok(path) = self.resolve(relative) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            warn!(path = relative, error = %e, "Failed to remove report file");
        }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, AppError> {
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::not_found(
                "Report file not found",
                json!({ "path": relative }),
            ));
        }
        Ok(self.root.join(path))
    }
}

fn storage_error(action: &str, e: std::io::Error) -> AppError {
    AppError::internal(
        "Report storage error",
        json!({ "action": action, "reason": e.to_string() }),
    )
}
