//! Multi-statement operations, run by a store inside one transaction.

pub mod cart;
pub mod checkout;

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::{cart, checkout};
    use crate::{
        app_error::AppError,
        models::{
            CartItemEntity, CreateOrderItemEntity, NewCartLine, OrderEntity, OrderItemEntity,
            ProductEntity,
        },
        store::CartTx,
        testing::product,
    };

    /// Answers every statement with a one-line cart and records the call order.
    #[derive(Default)]
    struct RecordingTx {
        calls: Vec<&'static str>,
    }

    fn cart_item(user_id: i32, product_id: i32, quantity: i32) -> CartItemEntity {
        CartItemEntity {
            user_id,
            product_id,
            quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl CartTx for RecordingTx {
        async fn lock_owner(&mut self, _user_id: i32) -> Result<(), AppError> {
            self.calls.push("lock_owner");
            Ok(())
        }

        async fn lock_product(&mut self, id: i32) -> Result<Option<ProductEntity>, AppError> {
            self.calls.push("lock_product");
            Ok(Some(product(id, "Yerba", "5.00", 10)))
        }

        async fn cart_quantity(&mut self, _: i32, _: i32) -> Result<Option<i32>, AppError> {
            self.calls.push("cart_quantity");
            Ok(None)
        }

        async fn upsert_cart_line(
            &mut self,
            user_id: i32,
            product_id: i32,
            quantity: i32,
        ) -> Result<CartItemEntity, AppError> {
            self.calls.push("upsert_cart_line");
            Ok(cart_item(user_id, product_id, quantity))
        }

        async fn lock_cart(&mut self, user_id: i32) -> Result<Vec<CartItemEntity>, AppError> {
            self.calls.push("lock_cart");
            Ok(vec![cart_item(user_id, 1, 2)])
        }

        async fn insert_order(&mut self, user_id: i32) -> Result<OrderEntity, AppError> {
            self.calls.push("insert_order");
            Ok(OrderEntity {
                id: 1,
                user_id,
                total: BigDecimal::from(0_i32),
                created_at: Utc::now(),
            })
        }

        async fn insert_order_item(
            &mut self,
            item: CreateOrderItemEntity,
        ) -> Result<OrderItemEntity, AppError> {
            self.calls.push("insert_order_item");
            Ok(OrderItemEntity {
                id: 1,
                order_id: item.order_id,
                product_id: item.product_id,
                unit_price: item.unit_price,
                quantity: item.quantity,
                subtotal: item.subtotal,
            })
        }

        async fn set_order_total(&mut self, _: i32, _: &BigDecimal) -> Result<(), AppError> {
            self.calls.push("set_order_total");
            Ok(())
        }

        async fn delete_cart(&mut self, _: i32) -> Result<usize, AppError> {
            self.calls.push("delete_cart");
            Ok(1)
        }
    }

    #[tokio::test]
    async fn add_line_locks_the_owner_before_any_row() {
        let mut tx = RecordingTx::default();
        let line = NewCartLine {
            user_id: 1,
            product_id: 1,
            quantity: 1,
        };

        cart::add_line(&mut tx, line).await.unwrap();

        assert_eq!(
            tx.calls,
            ["lock_owner", "lock_product", "cart_quantity", "upsert_cart_line"]
        );
    }

    #[tokio::test]
    async fn place_order_locks_the_owner_before_any_row() {
        let mut tx = RecordingTx::default();

        checkout::place_order(&mut tx, 1).await.unwrap();

        assert_eq!(
            tx.calls,
            [
                "lock_owner",
                "lock_cart",
                "insert_order",
                "lock_product",
                "insert_order_item",
                "set_order_total",
                "delete_cart"
            ]
        );
    }
}
