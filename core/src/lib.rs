// src/lib.rs

//! KitchenMate: storefront domain services.
//!
//! The crate covers the parts of the storefront that carry business rules:
//!  - Order placement as a named-step pipeline that validates the request,
//!    resolves products and commits the order together with its stock
//!    decrements.
//!  - Order status changes checked against a configurable transition table.
//!  - Dashboard statistics computed from concurrent aggregate queries.
//!  - Catalog maintenance with image storage behind a blob store.
//!
//! Persistence and blob storage are traits; in-memory implementations ship
//! with the crate for tests and local tooling.

pub mod blob;
pub mod catalog;
pub mod error;
pub mod models;
pub mod orders;
pub mod pipeline;
pub mod stats;
pub mod store;

pub use crate::blob::{BlobStore, ImageUpload, MemoryBlobStore, PRODUCT_IMAGE_FOLDER};
pub use crate::catalog::{CatalogService, MAX_PRODUCT_IMAGES};
pub use crate::error::{StorefrontError, StorefrontResult};
pub use crate::orders::{MissingProductPolicy, OrderService, StatusPolicy, TransitionTable};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult};
pub use crate::stats::StatsAggregator;
pub use crate::store::{MemoryStore, OrderStore, ProductStore, StockDecrement};
