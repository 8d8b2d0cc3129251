use bigdecimal::BigDecimal;
use tracing::info;

use crate::{
    app_error::AppError,
    models::{CheckoutReceipt, CreateOrderItemEntity},
    store::CartTx,
};

/// Turns the user's cart into an order.
///
/// Prices are read fresh from the catalog, never from the cart. Any error
/// leaves the caller's transaction to roll back, so the order shell, the
/// lines written so far and the cart deletion are discarded together.
pub async fn place_order(tx: &mut dyn CartTx, user_id: i32) -> Result<CheckoutReceipt, AppError> {
    tx.lock_owner(user_id).await?;

    let lines = tx.lock_cart(user_id).await?;
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let order = tx.insert_order(user_id).await?;

    let mut total = BigDecimal::from(0_i32);
    for line in &lines {
        let product = tx.lock_product(line.product_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Product with ID {} not found", line.product_id))
        })?;

        if line.quantity > product.stock {
            return Err(AppError::InsufficientStock {
                product_id: product.id,
                requested: i64::from(line.quantity),
                available: product.stock,
            });
        }

        let subtotal = &product.price * BigDecimal::from(line.quantity);
        total += &subtotal;

        tx.insert_order_item(CreateOrderItemEntity {
            order_id: order.id,
            product_id: product.id,
            unit_price: product.price,
            quantity: line.quantity,
            subtotal,
        })
        .await?;
    }

    tx.set_order_total(order.id, &total).await?;
    tx.delete_cart(user_id).await?;

    info!(
        "Order #{} placed for user #{} with {} line(s), total {}",
        order.id,
        user_id,
        lines.len(),
        total
    );

    Ok(CheckoutReceipt {
        order_id: order.id,
        total,
    })
}
