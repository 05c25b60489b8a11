//! Media storage on the local filesystem.
//!
//! Recipe images land under `<media_root>/recipe/<uuid>.<ext>`. API responses
//! carry the path relative to the media root, which is also what the `image`
//! column stores.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Subdirectory for recipe images, relative to the media root.
const RECIPE_DIR: &str = "recipe";

/// Fallback extension when the uploaded filename has none.
const DEFAULT_EXTENSION: &str = "jpg";

/// Filesystem-backed store for uploaded media.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Create a store rooted at the given directory. The directory is created
    /// lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist a recipe image and return its path relative to the media root.
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` if the directory or file cannot be written.
    pub async fn save_recipe_image(
        &self,
        original_filename: Option<&str>,
        data: &[u8],
    ) -> std::io::Result<String> {
        let extension = extension_for(original_filename);
        let relative = format!("{RECIPE_DIR}/{}.{extension}", Uuid::new_v4());

        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        Ok(relative)
    }

    /// Delete a previously stored image. Missing files are ignored so that a
    /// replaced image whose file was already cleaned up does not fail the
    /// upload that replaces it.
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` for failures other than the file being absent.
    pub async fn remove(&self, relative: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Root directory served under `/media`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Extract a lowercase file extension from an uploaded filename.
fn extension_for(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map_or_else(|| DEFAULT_EXTENSION.to_owned(), str::to_lowercase)
}
