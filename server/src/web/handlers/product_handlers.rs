// kitchenmate_server/src/web/handlers/product_handlers.rs

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use kitchenmate::models::{Category, NewProduct, ProductPatch};
use kitchenmate::{ImageUpload, MAX_PRODUCT_IMAGES};

/// Multipart field carrying product images.
pub const IMAGE_FIELD: &str = "images";
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Text fields and image files of a product form.
#[derive(Debug, Default)]
pub struct ProductForm {
  fields: HashMap<String, String>,
  images: Vec<ImageUpload>,
}

impl ProductForm {
  pub async fn read(mut payload: Multipart) -> Result<Self, AppError> {
    let mut form = ProductForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
      let name = field.name().unwrap_or_default().to_string();
      if name == IMAGE_FIELD {
        if form.images.len() >= MAX_PRODUCT_IMAGES {
          return Err(AppError::Validation(format!(
            "At most {} images can be uploaded",
            MAX_PRODUCT_IMAGES
          )));
        }
        let file_name = field
          .content_disposition()
          .and_then(|cd| cd.get_filename())
          .unwrap_or_default()
          .to_string();
        let content_type = field.content_type().map(|mime| mime.to_string());
        let bytes = read_field(&mut field, MAX_IMAGE_BYTES).await?;
        if bytes.is_empty() {
          // Browsers send an empty part when no file was picked.
          continue;
        }
        debug!(%file_name, size = bytes.len(), "Received product image.");
        form.images.push(ImageUpload {
          file_name,
          content_type,
          bytes,
        });
      } else {
        let bytes = read_field(&mut field, MAX_TEXT_FIELD_BYTES).await?;
        let value = String::from_utf8(bytes)
          .map_err(|_| AppError::Validation(format!("Field '{}' must be UTF-8 text", name)))?;
        form.fields.insert(name, value);
      }
    }

    Ok(form)
  }

  fn text(&mut self, name: &str) -> Option<String> {
    self.fields.remove(name).filter(|v| !v.trim().is_empty())
  }

  fn required(&mut self, name: &str) -> Result<String, AppError> {
    self
      .text(name)
      .ok_or_else(|| AppError::Validation(format!("Product {} is required", name)))
  }

  fn category(&mut self) -> Result<Option<Category>, AppError> {
    Ok(self.text("category").map(|c| c.parse()).transpose()?)
  }

  fn stock(&mut self) -> Result<Option<i32>, AppError> {
    self
      .text("stock")
      .map(|raw| {
        raw
          .trim()
          .parse::<i32>()
          .map_err(|_| AppError::Validation(format!("Product stock '{}' is not a whole number", raw)))
      })
      .transpose()
  }

  pub fn into_new_product(mut self) -> Result<(NewProduct, Vec<ImageUpload>), AppError> {
    let category = self
      .category()?
      .ok_or_else(|| AppError::Validation("Product category is required".to_string()))?;
    let stock = self
      .stock()?
      .ok_or_else(|| AppError::Validation("Product stock is required".to_string()))?;
    let product = NewProduct {
      title: self.required("title")?,
      category,
      price: self.required("price")?,
      stock,
      description: self.required("description")?,
      origin: self.required("origin")?,
      quality: self.required("quality")?,
      storage: self.required("storage")?,
      packaging: self.required("packaging")?,
      weight: self.required("weight")?,
    };
    Ok((product, self.images))
  }

  pub fn into_patch(mut self) -> Result<(ProductPatch, Vec<ImageUpload>), AppError> {
    let patch = ProductPatch {
      title: self.text("title"),
      category: self.category()?,
      price: self.text("price"),
      stock: self.stock()?,
      description: self.text("description"),
      origin: self.text("origin"),
      quality: self.text("quality"),
      storage: self.text("storage"),
      packaging: self.text("packaging"),
      weight: self.text("weight"),
    };
    Ok((patch, self.images))
  }
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, AppError> {
  let mut buf = Vec::new();
  while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
    if buf.len() + chunk.len() > limit {
      return Err(AppError::Validation(format!(
        "Field '{}' exceeds the {} byte limit",
        field.name().unwrap_or_default(),
        limit
      )));
    }
    buf.extend_from_slice(&chunk);
  }
  Ok(buf)
}

fn multipart_error(e: actix_multipart::MultipartError) -> AppError {
  AppError::Validation(format!("Malformed multipart body: {}", e))
}

// --- Handler Implementations ---

#[instrument(name = "handler::add_product", skip(app_state, payload))]
pub async fn add_product_handler(
  app_state: web::Data<AppState>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let form = ProductForm::read(payload).await?;
  if form.images.is_empty() {
    return Err(AppError::Validation("Please upload at least one image".to_string()));
  }
  let (new_product, images) = form.into_new_product()?;

  let product = app_state.catalog.create_product(new_product, images).await?;
  info!(product_id = %product.id, "Product added.");
  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "message": "Product created successfully",
    "data": product
  })))
}

#[instrument(name = "handler::update_product", skip(app_state, path, payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let (patch, images) = ProductForm::read(payload).await?.into_patch()?;

  let product = app_state
    .catalog
    .update_product(path.into_inner(), patch, images)
    .await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Product updated successfully",
    "data": product
  })))
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.list_products().await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "data": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.get_product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "data": product })))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.catalog.delete_product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Product deleted successfully"
  })))
}
