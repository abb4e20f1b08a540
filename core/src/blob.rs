// kitchenmate/src/blob.rs

//! Binary object storage for product images.

use crate::error::{StorefrontError, StorefrontResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Folder every product image is stored under.
pub const PRODUCT_IMAGE_FOLDER: &str = "kitchenmate/products";

/// An uploaded image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
  pub file_name: String,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

impl ImageUpload {
  /// Lower-cased extension of `file_name`, if any.
  pub fn extension(&self) -> Option<String> {
    std::path::Path::new(&self.file_name)
      .extension()
      .and_then(|ext| ext.to_str())
      .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
      .map(|ext| ext.to_ascii_lowercase())
  }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
  /// Stores `image` under `folder` and returns its public URL.
  async fn upload(&self, folder: &str, image: ImageUpload) -> StorefrontResult<String>;

  /// Removes the object addressed by `public_id` (`folder/name`, no extension).
  async fn destroy(&self, public_id: &str) -> StorefrontResult<()>;
}

/// Derives the public id of an uploaded image from its URL: the last path
/// segment up to its first `.`, prefixed with `folder`.
pub fn public_id_from_url(url: &str, folder: &str) -> Option<String> {
  let path = url.split(['?', '#']).next().unwrap_or_default();
  let last_segment = path.rsplit('/').next()?;
  let name = last_segment.split('.').next()?;
  if name.is_empty() {
    return None;
  }
  Some(format!("{}/{}", folder, name))
}

/// Keeps image bytes in memory; for tests and local tooling.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
  base_url: String,
  objects: Arc<Mutex<BTreeMap<String, ImageUpload>>>,
}

impl MemoryBlobStore {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      objects: Arc::new(Mutex::new(BTreeMap::new())),
    }
  }

  pub fn public_ids(&self) -> Vec<String> {
    self.objects.lock().keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.objects.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.objects.lock().is_empty()
  }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
  async fn upload(&self, folder: &str, image: ImageUpload) -> StorefrontResult<String> {
    if image.bytes.is_empty() {
      return Err(StorefrontError::Validation(format!("Image '{}' is empty", image.file_name)));
    }
    let name = Uuid::new_v4().simple().to_string();
    let extension = image.extension().unwrap_or_else(|| "bin".to_string());
    let url = format!("{}/{}/{}.{}", self.base_url, folder, name, extension);
    self.objects.lock().insert(format!("{}/{}", folder, name), image);
    Ok(url)
  }

  async fn destroy(&self, public_id: &str) -> StorefrontResult<()> {
    // Destroying an unknown id is not an error, matching hosted blob services.
    self.objects.lock().remove(public_id);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn public_id_uses_last_segment_before_first_dot() {
    let url = "https://cdn.example.com/v1/kitchenmate/products/abc123.jpg";
    assert_eq!(
      public_id_from_url(url, PRODUCT_IMAGE_FOLDER).as_deref(),
      Some("kitchenmate/products/abc123")
    );
    assert_eq!(
      public_id_from_url("https://x/y/photo.min.png?v=2", "f").as_deref(),
      Some("f/photo")
    );
  }

  #[test]
  fn public_id_rejects_urls_without_a_name() {
    assert_eq!(public_id_from_url("https://cdn.example.com/", PRODUCT_IMAGE_FOLDER), None);
  }

  #[test]
  fn extension_is_normalized() {
    let image = ImageUpload {
      file_name: "Apple.JPG".to_string(),
      content_type: None,
      bytes: vec![1],
    };
    assert_eq!(image.extension().as_deref(), Some("jpg"));
    let image = ImageUpload {
      file_name: "noext".to_string(),
      ..image
    };
    assert_eq!(image.extension(), None);
  }
}
