//! In-process store with the same transactional contract as [`super::PgStore`].
//!
//! A transaction runs against a cloned draft of the whole state while the
//! store mutex is held; the draft replaces the state only when the unit of
//! work succeeds. Concurrent transactions are therefore fully serialised.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{CartTx, ShopStore};
use crate::{
    app_error::AppError,
    models::{
        CartItemEntity, CartLineView, CheckoutReceipt, CreateOrderItemEntity, NewCartLine,
        OrderDetail, OrderEntity, OrderItemEntity, ProductEntity,
    },
    services::{cart, checkout},
};

#[derive(Clone, Default)]
struct MemoryState {
    products: BTreeMap<i32, ProductEntity>,
    cart_items: BTreeMap<(i32, i32), CartItemEntity>,
    orders: BTreeMap<i32, OrderEntity>,
    order_items: Vec<OrderItemEntity>,
    last_order_id: i32,
    last_order_item_id: i32,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = ProductEntity>) -> Self {
        let state = MemoryState {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A small seeded catalog for local runs without PostgreSQL.
    pub fn demo() -> Self {
        let product = |id: i32, name: &str, cents: i64, category: &str, stock: i32| ProductEntity {
            id,
            name: name.into(),
            price: BigDecimal::new(cents.into(), 2),
            category: category.into(),
            stock,
        };

        Self::with_products([
            product(1, "Espresso beans 1kg", 2450, "coffee", 20),
            product(2, "Ceramic mug", 900, "kitchen", 35),
            product(3, "Pour-over kettle", 4299, "kitchen", 8),
            product(4, "Paper filters (100)", 550, "coffee", 60),
        ])
    }

    /// Inserts or replaces a product, as the external inventory process would.
    pub async fn put_product(&self, product: ProductEntity) {
        self.state.lock().await.products.insert(product.id, product);
    }

    pub async fn remove_product(&self, id: i32) -> Option<ProductEntity> {
        self.state.lock().await.products.remove(&id)
    }

    /// Number of stored cart lines, including ones whose product is gone.
    pub async fn raw_cart_len(&self, user_id: i32) -> usize {
        self.state
            .lock()
            .await
            .cart_items
            .keys()
            .filter(|(owner, _)| *owner == user_id)
            .count()
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<ProductEntity>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .values()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect())
    }

    async fn find_product(&self, id: i32) -> Result<Option<ProductEntity>, AppError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLineView>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .cart_items
            .values()
            .filter(|item| item.user_id == user_id)
            .filter_map(|item| {
                let product = state.products.get(&item.product_id)?;
                Some(CartLineView {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    name: product.name.clone(),
                    price: product.price.clone(),
                })
            })
            .collect())
    }

    async fn clear_cart(&self, user_id: i32) -> Result<usize, AppError> {
        let mut state = self.state.lock().await;
        Ok(state.remove_cart(user_id))
    }

    async fn add_to_cart(&self, line: NewCartLine) -> Result<CartItemEntity, AppError> {
        let mut state = self.state.lock().await;
        let mut draft = state.clone();
        let item = cart::add_line(&mut MemoryTx { state: &mut draft }, line).await?;
        *state = draft;
        Ok(item)
    }

    async fn checkout(&self, user_id: i32) -> Result<CheckoutReceipt, AppError> {
        let mut state = self.state.lock().await;
        let mut draft = state.clone();
        let receipt = checkout::place_order(&mut MemoryTx { state: &mut draft }, user_id).await?;
        *state = draft;
        Ok(receipt)
    }

    async fn find_order(&self, id: i32) -> Result<Option<OrderDetail>, AppError> {
        let state = self.state.lock().await;
        Ok(state.orders.get(&id).map(|order| OrderDetail {
            order: order.clone(),
            order_items: state
                .order_items
                .iter()
                .filter(|item| item.order_id == id)
                .cloned()
                .collect(),
        }))
    }

    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<OrderEntity>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl MemoryState {
    fn remove_cart(&mut self, user_id: i32) -> usize {
        let before = self.cart_items.len();
        self.cart_items.retain(|(owner, _), _| *owner != user_id);
        before - self.cart_items.len()
    }
}

struct MemoryTx<'s> {
    state: &'s mut MemoryState,
}

#[async_trait]
impl CartTx for MemoryTx<'_> {
    // The store mutex is held for the whole transaction.
    async fn lock_owner(&mut self, _user_id: i32) -> Result<(), AppError> {
        Ok(())
    }

    async fn lock_product(&mut self, id: i32) -> Result<Option<ProductEntity>, AppError> {
        Ok(self.state.products.get(&id).cloned())
    }

    async fn cart_quantity(
        &mut self,
        user_id: i32,
        product_id: i32,
    ) -> Result<Option<i32>, AppError> {
        Ok(self
            .state
            .cart_items
            .get(&(user_id, product_id))
            .map(|item| item.quantity))
    }

    async fn upsert_cart_line(
        &mut self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartItemEntity, AppError> {
        let now = Utc::now();
        let item = self
            .state
            .cart_items
            .entry((user_id, product_id))
            .and_modify(|item| {
                item.quantity = quantity;
                item.updated_at = now;
            })
            .or_insert_with(|| CartItemEntity {
                user_id,
                product_id,
                quantity,
                created_at: now,
                updated_at: now,
            });
        Ok(item.clone())
    }

    async fn lock_cart(&mut self, user_id: i32) -> Result<Vec<CartItemEntity>, AppError> {
        Ok(self
            .state
            .cart_items
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_order(&mut self, user_id: i32) -> Result<OrderEntity, AppError> {
        self.state.last_order_id += 1;
        let order = OrderEntity {
            id: self.state.last_order_id,
            user_id,
            total: BigDecimal::from(0_i32),
            created_at: Utc::now(),
        };
        self.state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn insert_order_item(
        &mut self,
        item: CreateOrderItemEntity,
    ) -> Result<OrderItemEntity, AppError> {
        self.state.last_order_item_id += 1;
        let item = OrderItemEntity {
            id: self.state.last_order_item_id,
            order_id: item.order_id,
            product_id: item.product_id,
            unit_price: item.unit_price,
            quantity: item.quantity,
            subtotal: item.subtotal,
        };
        self.state.order_items.push(item.clone());
        Ok(item)
    }

    async fn set_order_total(&mut self, order_id: i32, total: &BigDecimal) -> Result<(), AppError> {
        let order = self
            .state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))?;
        order.total = total.clone();
        Ok(())
    }

    async fn delete_cart(&mut self, user_id: i32) -> Result<usize, AppError> {
        Ok(self.state.remove_cart(user_id))
    }
}
