use anyhow::Context;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use diesel::{
    BelongingToDsl, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper,
    sql_types::BigInt,
};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use super::{CartTx, ShopStore};
use crate::{
    app_error::AppError,
    db::{DbConnection, DbPool},
    models::{
        CartItemEntity, CartLineView, CheckoutReceipt, CreateOrderEntity, CreateOrderItemEntity,
        NewCartLine, OrderDetail, OrderEntity, OrderItemEntity, ProductEntity,
    },
    schema::{cart_items, order_items, orders, products},
    services::{cart, checkout},
};

/// PostgreSQL-backed store. Every call checks a connection out of the pool
/// and hands it back when the call returns.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<DbConnection<'_>, AppError> {
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;
        Ok(conn)
    }
}

#[async_trait]
impl ShopStore for PgStore {
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<ProductEntity>, AppError> {
        let conn = &mut self.connection().await?;

        let mut query = products::table
            .select(ProductEntity::as_select())
            .order_by(products::id.asc())
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(products::category.eq(category.to_owned()));
        }

        let products = query
            .load(conn)
            .await
            .context("Failed to get products")?;
        Ok(products)
    }

    async fn find_product(&self, id: i32) -> Result<Option<ProductEntity>, AppError> {
        let conn = &mut self.connection().await?;

        let product = products::table
            .find(id)
            .select(ProductEntity::as_select())
            .first(conn)
            .await
            .optional()?;
        Ok(product)
    }

    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLineView>, AppError> {
        let conn = &mut self.connection().await?;

        let lines = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(user_id))
            .order_by(cart_items::product_id.asc())
            .select((
                cart_items::product_id,
                cart_items::quantity,
                products::name,
                products::price,
            ))
            .load::<CartLineView>(conn)
            .await
            .context("Failed to get cart items")?;
        Ok(lines)
    }

    async fn clear_cart(&self, user_id: i32) -> Result<usize, AppError> {
        let conn = &mut self.connection().await?;

        let removed = diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(conn)
            .await
            .context("Failed to clear cart")?;
        Ok(removed)
    }

    async fn add_to_cart(&self, line: NewCartLine) -> Result<CartItemEntity, AppError> {
        let mut conn = self.connection().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction(move |conn| {
            Box::pin(async move { cart::add_line(&mut PgTx { conn }, line).await })
        })
        .await
    }

    async fn checkout(&self, user_id: i32) -> Result<CheckoutReceipt, AppError> {
        let mut conn = self.connection().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction(move |conn| {
            Box::pin(async move { checkout::place_order(&mut PgTx { conn }, user_id).await })
        })
        .await
    }

    async fn find_order(&self, id: i32) -> Result<Option<OrderDetail>, AppError> {
        let conn = &mut self.connection().await?;

        let Some(order) = orders::table
            .find(id)
            .select(OrderEntity::as_select())
            .first(conn)
            .await
            .optional()?
        else {
            return Ok(None);
        };

        let order_items = OrderItemEntity::belonging_to(&order)
            .select(OrderItemEntity::as_select())
            .order_by(order_items::id.asc())
            .load(conn)
            .await
            .context("Failed to get order items")?;

        Ok(Some(OrderDetail { order, order_items }))
    }

    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<OrderEntity>, AppError> {
        let conn = &mut self.connection().await?;

        let orders = orders::table
            .filter(orders::user_id.eq(user_id))
            .order_by((orders::created_at.desc(), orders::id.desc()))
            .select(OrderEntity::as_select())
            .load(conn)
            .await
            .context("Failed to get user orders")?;
        Ok(orders)
    }
}

/// Statements issued on a connection that is inside an open transaction.
struct PgTx<'c> {
    conn: &'c mut AsyncPgConnection,
}

#[async_trait]
impl CartTx for PgTx<'_> {
    async fn lock_owner(&mut self, user_id: i32) -> Result<(), AppError> {
        diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
            .bind::<BigInt, _>(i64::from(user_id))
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    async fn lock_product(&mut self, id: i32) -> Result<Option<ProductEntity>, AppError> {
        let product = products::table
            .find(id)
            .select(ProductEntity::as_select())
            .for_update()
            .first(&mut *self.conn)
            .await
            .optional()?;
        Ok(product)
    }

    async fn cart_quantity(
        &mut self,
        user_id: i32,
        product_id: i32,
    ) -> Result<Option<i32>, AppError> {
        let quantity = cart_items::table
            .find((user_id, product_id))
            .select(cart_items::quantity)
            .first(&mut *self.conn)
            .await
            .optional()?;
        Ok(quantity)
    }

    async fn upsert_cart_line(
        &mut self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartItemEntity, AppError> {
        let item = diesel::insert_into(cart_items::table)
            .values((
                cart_items::user_id.eq(user_id),
                cart_items::product_id.eq(product_id),
                cart_items::quantity.eq(quantity),
            ))
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set((
                cart_items::quantity.eq(quantity),
                cart_items::updated_at.eq(diesel::dsl::now),
            ))
            .returning(CartItemEntity::as_returning())
            .get_result(&mut *self.conn)
            .await?;
        Ok(item)
    }

    async fn lock_cart(&mut self, user_id: i32) -> Result<Vec<CartItemEntity>, AppError> {
        let items = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .order_by(cart_items::product_id.asc())
            .select(CartItemEntity::as_select())
            .for_update()
            .load(&mut *self.conn)
            .await?;
        debug!("Locked {} cart line(s) of user #{}", items.len(), user_id);
        Ok(items)
    }

    async fn insert_order(&mut self, user_id: i32) -> Result<OrderEntity, AppError> {
        let order = diesel::insert_into(orders::table)
            .values(CreateOrderEntity {
                user_id,
                total: BigDecimal::from(0_i32),
            })
            .returning(OrderEntity::as_returning())
            .get_result(&mut *self.conn)
            .await?;
        Ok(order)
    }

    async fn insert_order_item(
        &mut self,
        item: CreateOrderItemEntity,
    ) -> Result<OrderItemEntity, AppError> {
        let item = diesel::insert_into(order_items::table)
            .values(item)
            .returning(OrderItemEntity::as_returning())
            .get_result(&mut *self.conn)
            .await?;
        Ok(item)
    }

    async fn set_order_total(&mut self, order_id: i32, total: &BigDecimal) -> Result<(), AppError> {
        diesel::update(orders::table.find(order_id))
            .set(orders::total.eq(total))
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    async fn delete_cart(&mut self, user_id: i32) -> Result<usize, AppError> {
        let removed = diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(&mut *self.conn)
            .await?;
        Ok(removed)
    }
}
