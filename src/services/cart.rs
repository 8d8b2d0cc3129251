use tracing::info;

use crate::{
    app_error::AppError,
    models::{CartItemEntity, NewCartLine},
    store::CartTx,
};

/// Adds `line.quantity` units to the user's cart, never beyond stock.
///
/// The stored quantity becomes the existing quantity plus the requested one;
/// the add is rejected when that sum exceeds the product's current stock.
pub async fn add_line(tx: &mut dyn CartTx, line: NewCartLine) -> Result<CartItemEntity, AppError> {
    tx.lock_owner(line.user_id).await?;

    let product = tx
        .lock_product(line.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} does not exist", line.product_id)))?;

    let current = tx
        .cart_quantity(line.user_id, line.product_id)
        .await?
        .unwrap_or(0);

    let requested = i64::from(current) + i64::from(line.quantity);
    if requested > i64::from(product.stock) {
        return Err(AppError::InsufficientStock {
            product_id: product.id,
            requested,
            available: product.stock,
        });
    }

    // requested <= stock, so it fits in an i32
    let quantity = requested as i32;
    let item = tx
        .upsert_cart_line(line.user_id, line.product_id, quantity)
        .await?;

    info!(
        "User #{} now has {} x product #{} in cart",
        item.user_id, item.quantity, item.product_id
    );

    Ok(item)
}
