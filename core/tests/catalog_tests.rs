// tests/catalog_tests.rs
mod common;

use common::*;
use kitchenmate::models::{Category, ProductPatch};
use kitchenmate::{StorefrontError, MAX_PRODUCT_IMAGES, PRODUCT_IMAGE_FOLDER};
use serial_test::serial;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_create_product_uploads_images_in_order() {
  setup_tracing();
  let shop = Storefront::new();

  let product = shop
    .catalog()
    .create_product(new_product("Apples", 12), vec![image("front.jpg"), image("back.PNG")])
    .await
    .unwrap();

  assert_eq!(product.image_urls.len(), 2);
  assert!(product.image_urls[0].starts_with("https://cdn.test/kitchenmate/products/"));
  assert!(product.image_urls[0].ends_with(".jpg"));
  assert!(product.image_urls[1].ends_with(".png"));
  assert_eq!(shop.blobs.len(), 2);
  assert_eq!(shop.stock_of(&product), 12);
}

#[tokio::test]
#[serial]
async fn test_create_product_requires_images_within_limit() {
  setup_tracing();
  let shop = Storefront::new();
  let catalog = shop.catalog();

  let none = catalog.create_product(new_product("Apples", 1), Vec::new()).await;
  assert!(matches!(none, Err(StorefrontError::Validation(_))));

  let too_many: Vec<_> = (0..=MAX_PRODUCT_IMAGES).map(|i| image(&format!("{}.jpg", i))).collect();
  let over = catalog.create_product(new_product("Apples", 1), too_many).await;
  assert!(matches!(over, Err(StorefrontError::Validation(_))));

  assert!(shop.blobs.is_empty());
}

#[tokio::test]
#[serial]
async fn test_failed_upload_cleans_up_earlier_images() {
  setup_tracing();
  let shop = Storefront::new();
  let mut empty = image("broken.jpg");
  empty.bytes.clear();

  let result = shop
    .catalog()
    .create_product(new_product("Apples", 1), vec![image("ok.jpg"), empty])
    .await;

  assert!(result.is_err());
  assert!(shop.blobs.is_empty());
  assert!(shop.catalog().list_products().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_create_product_rejects_blank_fields() {
  setup_tracing();
  let shop = Storefront::new();
  let mut product = new_product("Apples", 1);
  product.origin = " ".to_string();

  match shop.catalog().create_product(product, vec![image("a.jpg")]).await {
    Err(StorefrontError::Validation(message)) => assert!(message.contains("origin")),
    other => panic!("Expected a validation error, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_update_product_patches_fields_and_allows_zero_stock() {
  setup_tracing();
  let shop = Storefront::new();
  let catalog = shop.catalog();
  let created = catalog
    .create_product(new_product("Apples", 12), vec![image("a.jpg")])
    .await
    .unwrap();

  let patch = ProductPatch {
    title: Some("Green Apples".to_string()),
    category: Some(Category::Groceries),
    stock: Some(0),
    description: Some("".to_string()),
    ..ProductPatch::default()
  };
  let updated = catalog.update_product(created.id, patch, Vec::new()).await.unwrap();

  assert_eq!(updated.title, "Green Apples");
  assert_eq!(updated.category, Category::Groceries);
  assert_eq!(updated.stock, 0);
  assert_eq!(updated.description, created.description);
  assert_eq!(updated.image_urls, created.image_urls);
  assert!(updated.updated_at >= created.updated_at);
  assert_eq!(catalog.get_product(created.id).await.unwrap(), updated);
}

#[tokio::test]
#[serial]
async fn test_update_product_replaces_images() {
  setup_tracing();
  let shop = Storefront::new();
  let catalog = shop.catalog();
  let created = catalog
    .create_product(new_product("Apples", 12), vec![image("a.jpg"), image("b.jpg")])
    .await
    .unwrap();
  let old_ids = shop.blobs.public_ids();

  let updated = catalog
    .update_product(created.id, ProductPatch::default(), vec![image("c.webp")])
    .await
    .unwrap();

  assert_eq!(updated.image_urls.len(), 1);
  assert!(updated.image_urls[0].ends_with(".webp"));
  let remaining = shop.blobs.public_ids();
  assert_eq!(remaining.len(), 1);
  assert!(old_ids.iter().all(|id| !remaining.contains(id)));
}

#[tokio::test]
#[serial]
async fn test_update_unknown_product_is_not_found() {
  setup_tracing();
  let shop = Storefront::new();

  let err = shop
    .catalog()
    .update_product(Uuid::new_v4(), ProductPatch::default(), Vec::new())
    .await
    .unwrap_err();

  assert!(matches!(err, StorefrontError::NotFound { entity: "Product", .. }));
}

#[tokio::test]
#[serial]
async fn test_delete_product_destroys_all_images() {
  setup_tracing();
  let shop = Storefront::new();
  let catalog = shop.catalog();
  let created = catalog
    .create_product(new_product("Apples", 12), vec![image("a.jpg"), image("b.jpg"), image("c.jpg")])
    .await
    .unwrap();
  assert_eq!(shop.blobs.len(), 3);
  assert!(shop
    .blobs
    .public_ids()
    .iter()
    .all(|id| id.starts_with(PRODUCT_IMAGE_FOLDER)));

  catalog.delete_product(created.id).await.unwrap();

  assert!(shop.blobs.is_empty());
  assert!(matches!(
    catalog.get_product(created.id).await,
    Err(StorefrontError::NotFound { .. })
  ));
  assert!(matches!(
    catalog.delete_product(created.id).await,
    Err(StorefrontError::NotFound { .. })
  ));
}

#[tokio::test]
#[serial]
async fn test_list_products_newest_first() {
  setup_tracing();
  let shop = Storefront::new();
  let catalog = shop.catalog();
  let first = catalog
    .create_product(new_product("Apples", 1), vec![image("a.jpg")])
    .await
    .unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  let second = catalog
    .create_product(new_product("Bread", 1), vec![image("b.jpg")])
    .await
    .unwrap();

  let listed = catalog.list_products().await.unwrap();
  let ids: Vec<Uuid> = listed.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![second.id, first.id]);
}
