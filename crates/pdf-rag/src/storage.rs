//! Persistence of uploaded documents

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Writes uploads into a single directory under their original filename
///
/// A later upload with the same name replaces the earlier file.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` as `filename`, keeping only its final path component
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let name = sanitize_filename(filename)
            .ok_or_else(|| Error::Config(format!("invalid upload filename: {:?}", filename)))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, data).await?;

        tracing::debug!("Saved upload to {}", path.display());
        Ok(path)
    }
}

/// Final component of a client-supplied name, or `None` if nothing usable remains
fn sanitize_filename(filename: &str) -> Option<String> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
