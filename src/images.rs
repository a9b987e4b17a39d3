//! Storage of uploaded place images on the local filesystem.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 500_000;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("unsupported content type {0:?}")]
    UnsupportedType(Option<String>),
    #[error("image of {0} bytes exceeds the upload limit")]
    TooLarge(usize),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn prepare(&self) -> Result<(), ImageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        Ok(())
    }

    /// Writes `bytes` under a fresh name and returns the stored path.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn save(
        &self,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<PathBuf, ImageError> {
        let extension = check_content_type(content_type)?;
        check_size(bytes.len())?;

        let path = self.dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, bytes).await?;

        Ok(path)
    }
}

/// Returns the file extension for an accepted image content type.
pub fn check_content_type(content_type: Option<&str>) -> Result<&'static str, ImageError> {
    content_type
        .and_then(extension_for)
        .ok_or_else(|| ImageError::UnsupportedType(content_type.map(str::to_owned)))
}

pub fn check_size(len: usize) -> Result<(), ImageError> {
    if len > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge(len));
    }

    Ok(())
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpeg"),
        "image/jpg" => Some("jpg"),
        _ => None,
    }
}

/// Best-effort removal. Failures are logged and otherwise ignored.
pub async fn remove_image(path: impl AsRef<Path>) {
    let path = path.as_ref();

    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::info!(path = %path.display(), "image deleted"),
        Err(err) => tracing::error!(path = %path.display(), error = %err, "failed to delete image"),
    }
}
