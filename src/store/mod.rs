//! Persistence seam between the HTTP layer and the database.
//!
//! [`ShopStore`] is what handlers talk to. Operations spanning several
//! statements are written once in [`crate::services`] against [`CartTx`], and
//! each store runs them inside its own notion of a transaction.

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::{
    app_error::AppError,
    models::{
        CartItemEntity, CartLineView, CheckoutReceipt, CreateOrderItemEntity, NewCartLine,
        OrderDetail, OrderEntity, OrderItemEntity, ProductEntity,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ShopStore: Send + Sync + 'static {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<ProductEntity>, AppError>;

    async fn find_product(&self, id: i32) -> Result<Option<ProductEntity>, AppError>;

    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLineView>, AppError>;

    /// Removes every cart line of the user, returning how many were deleted.
    async fn clear_cart(&self, user_id: i32) -> Result<usize, AppError>;

    /// Runs [`crate::services::cart::add_line`] in one transaction.
    async fn add_to_cart(&self, line: NewCartLine) -> Result<CartItemEntity, AppError>;

    /// Runs [`crate::services::checkout::place_order`] in one transaction.
    async fn checkout(&self, user_id: i32) -> Result<CheckoutReceipt, AppError>;

    async fn find_order(&self, id: i32) -> Result<Option<OrderDetail>, AppError>;

    /// Orders of a user, newest first.
    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<OrderEntity>, AppError>;
}

/// Statements available inside a store transaction.
///
/// Nothing written through a `CartTx` is visible to other callers until the
/// owning store commits, and an `Err` from the unit of work discards it all.
#[async_trait]
pub trait CartTx: Send {
    /// Serialises every cart-changing transaction of one user.
    ///
    /// Taken before any row lock, so adds and checkouts of the same user
    /// cannot lock cart and product rows in opposite orders.
    async fn lock_owner(&mut self, user_id: i32) -> Result<(), AppError>;

    /// Reads a product and holds it against concurrent changes until commit.
    async fn lock_product(&mut self, id: i32) -> Result<Option<ProductEntity>, AppError>;

    async fn cart_quantity(&mut self, user_id: i32, product_id: i32)
    -> Result<Option<i32>, AppError>;

    async fn upsert_cart_line(
        &mut self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartItemEntity, AppError>;

    /// Reads the user's cart and holds its lines until commit.
    async fn lock_cart(&mut self, user_id: i32) -> Result<Vec<CartItemEntity>, AppError>;

    /// Creates an order with a zero total.
    async fn insert_order(&mut self, user_id: i32) -> Result<OrderEntity, AppError>;

    async fn insert_order_item(
        &mut self,
        item: CreateOrderItemEntity,
    ) -> Result<OrderItemEntity, AppError>;

    async fn set_order_total(&mut self, order_id: i32, total: &BigDecimal) -> Result<(), AppError>;

    async fn delete_cart(&mut self, user_id: i32) -> Result<usize, AppError>;
}
