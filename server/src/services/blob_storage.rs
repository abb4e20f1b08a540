// kitchenmate_server/src/services/blob_storage.rs

//! Filesystem-backed image storage. The server mounts the root at `/uploads`;
//! `public_base_url` may point there or at any host serving the same files.

use async_trait::async_trait;
use kitchenmate::{BlobStore, ImageUpload, StorefrontError, StorefrontResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use uuid::Uuid;

pub struct LocalBlobStore {
  root: PathBuf,
  public_base_url: String,
}

impl LocalBlobStore {
  pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Resolves a relative `a/b/c` path below the root, refusing traversal.
  fn resolve(&self, relative: &str) -> StorefrontResult<PathBuf> {
    let mut path = self.root.clone();
    for segment in relative.split('/') {
      if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
        return Err(StorefrontError::Validation(format!("Invalid storage path '{}'", relative)));
      }
      path.push(segment);
    }
    Ok(path)
  }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
  #[instrument(name = "LocalBlobStore::upload", skip(self, image), fields(file_name = %image.file_name), err(Display))]
  async fn upload(&self, folder: &str, image: ImageUpload) -> StorefrontResult<String> {
    if image.bytes.is_empty() {
      return Err(StorefrontError::Validation(format!("Image '{}' is empty", image.file_name)));
    }
    let dir = self.resolve(folder)?;
    tokio::fs::create_dir_all(&dir).await.map_err(StorefrontError::blob)?;

    let name = Uuid::new_v4().simple().to_string();
    let extension = image.extension().unwrap_or_else(|| "bin".to_string());
    let file_name = format!("{}.{}", name, extension);
    tokio::fs::write(dir.join(&file_name), &image.bytes)
      .await
      .map_err(StorefrontError::blob)?;

    debug!(folder, %file_name, bytes = image.bytes.len(), "Image stored.");
    Ok(format!("{}/{}/{}", self.public_base_url, folder, file_name))
  }

  /// Removes every file whose stem matches the public id's last segment.
  #[instrument(name = "LocalBlobStore::destroy", skip(self), err(Display))]
  async fn destroy(&self, public_id: &str) -> StorefrontResult<()> {
    let target = self.resolve(public_id)?;
    let (Some(dir), Some(stem)) = (target.parent(), target.file_name()) else {
      return Ok(());
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(StorefrontError::blob(e)),
    };
    while let Some(entry) = entries.next_entry().await.map_err(StorefrontError::blob)? {
      let path = entry.path();
      if path.file_stem() == Some(stem) {
        match tokio::fs::remove_file(&path).await {
          Ok(()) => debug!(path = %path.display(), "Image removed."),
          Err(e) if e.kind() == io::ErrorKind::NotFound => {}
          Err(e) => return Err(StorefrontError::blob(e)),
        }
      }
    }
    Ok(())
  }
}
