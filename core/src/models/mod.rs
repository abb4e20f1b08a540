// kitchenmate/src/models/mod.rs

//! Records stored by the persistence layer and the payloads that create them.

pub mod order;
pub mod product;
pub mod stats;
pub mod user;

pub use order::{LineItem, NewOrder, Order, OrderOwner, OrderStatus, OwnedOrder, ShippingInfo};
pub use product::{Category, NewProduct, Product, ProductPatch};
pub use stats::{MonthlyOrderCount, ProductSales, StatsSnapshot, StatusCount};
pub use user::User;
