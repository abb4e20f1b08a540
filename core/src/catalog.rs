// kitchenmate/src/catalog.rs

//! Product catalog maintenance. Images live in a [`BlobStore`]; products keep
//! only their public URLs.

use crate::blob::{public_id_from_url, BlobStore, ImageUpload, PRODUCT_IMAGE_FOLDER};
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{NewProduct, Product, ProductPatch};
use crate::store::ProductStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const MAX_PRODUCT_IMAGES: usize = 5;

pub struct CatalogService {
  products: Arc<dyn ProductStore>,
  blobs: Arc<dyn BlobStore>,
}

impl CatalogService {
  pub fn new(products: Arc<dyn ProductStore>, blobs: Arc<dyn BlobStore>) -> Self {
    Self { products, blobs }
  }

  #[instrument(
    name = "CatalogService::create_product",
    skip(self, product, images),
    fields(title = %product.title, images = images.len()),
    err(Display)
  )]
  pub async fn create_product(&self, product: NewProduct, images: Vec<ImageUpload>) -> StorefrontResult<Product> {
    product.validate()?;
    if images.is_empty() {
      return Err(StorefrontError::Validation("At least one product image is required".to_string()));
    }
    check_image_count(images.len())?;

    let image_urls = self.upload_all(images).await?;
    let product = product.into_product(image_urls);
    if let Err(e) = self.products.insert_product(&product).await {
      self.destroy_best_effort(&product.image_urls).await;
      return Err(e);
    }

    info!(product_id = %product.id, "Product created.");
    Ok(product)
  }

  /// Applies `patch`. Non-empty `images` replace the stored set; the old
  /// images are destroyed only after the update is persisted.
  #[instrument(
    name = "CatalogService::update_product",
    skip(self, patch, images),
    fields(images = images.len()),
    err(Display)
  )]
  pub async fn update_product(
    &self,
    product_id: Uuid,
    patch: ProductPatch,
    images: Vec<ImageUpload>,
  ) -> StorefrontResult<Product> {
    patch.validate()?;
    check_image_count(images.len())?;

    let mut product = self.get_product(product_id).await?;

    let replaced_urls = if images.is_empty() {
      Vec::new()
    } else {
      let new_urls = self.upload_all(images).await?;
      std::mem::replace(&mut product.image_urls, new_urls)
    };

    patch.apply_to(&mut product);
    product.updated_at = Utc::now();

    if let Err(e) = self.products.update_product(&product).await {
      if !replaced_urls.is_empty() {
        self.destroy_best_effort(&product.image_urls).await;
      }
      return Err(e);
    }
    self.destroy_best_effort(&replaced_urls).await;

    info!(product_id = %product.id, "Product updated.");
    Ok(product)
  }

  #[instrument(name = "CatalogService::list_products", skip(self), err(Display))]
  pub async fn list_products(&self) -> StorefrontResult<Vec<Product>> {
    self.products.list_products().await
  }

  #[instrument(name = "CatalogService::get_product", skip(self), err(Display))]
  pub async fn get_product(&self, product_id: Uuid) -> StorefrontResult<Product> {
    self
      .products
      .find_product(product_id)
      .await?
      .ok_or_else(|| StorefrontError::not_found("Product", product_id))
  }

  /// Destroys the product's images, then its record. Destroying an already
  /// removed image succeeds, so a failed delete can be retried.
  #[instrument(name = "CatalogService::delete_product", skip(self), err(Display))]
  pub async fn delete_product(&self, product_id: Uuid) -> StorefrontResult<()> {
    let product = self.get_product(product_id).await?;

    for url in &product.image_urls {
      match public_id_from_url(url, PRODUCT_IMAGE_FOLDER) {
        Some(public_id) => self.blobs.destroy(&public_id).await?,
        None => warn!(url = %url, "Image URL has no public id; nothing to destroy."),
      }
    }

    if !self.products.delete_product(product_id).await? {
      return Err(StorefrontError::not_found("Product", product_id));
    }
    info!(product_id = %product_id, images = product.image_urls.len(), "Product deleted.");
    Ok(())
  }

  /// Uploads in order. On failure the images uploaded so far are destroyed.
  async fn upload_all(&self, images: Vec<ImageUpload>) -> StorefrontResult<Vec<String>> {
    let mut urls = Vec::with_capacity(images.len());
    for image in images {
      match self.blobs.upload(PRODUCT_IMAGE_FOLDER, image).await {
        Ok(url) => urls.push(url),
        Err(e) => {
          self.destroy_best_effort(&urls).await;
          return Err(e);
        }
      }
    }
    Ok(urls)
  }

  async fn destroy_best_effort(&self, urls: &[String]) {
    for url in urls {
      let Some(public_id) = public_id_from_url(url, PRODUCT_IMAGE_FOLDER) else {
        continue;
      };
      if let Err(e) = self.blobs.destroy(&public_id).await {
        warn!(public_id = %public_id, error = %e, "Failed to destroy image.");
      }
    }
  }
}

fn check_image_count(count: usize) -> StorefrontResult<()> {
  if count > MAX_PRODUCT_IMAGES {
    return Err(StorefrontError::Validation(format!(
      "At most {} product images are allowed",
      MAX_PRODUCT_IMAGES
    )));
  }
  Ok(())
}
