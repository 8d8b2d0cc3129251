use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Associations, Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Products

#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Clone, Debug, ToSchema)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductEntity {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "5.00")]
    pub price: BigDecimal,
    pub category: String,
    pub stock: i32,
}

// Carts

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, ToSchema)]
#[diesel(table_name = crate::schema::cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemEntity {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the product it points at.
#[derive(Queryable, Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct CartLineView {
    pub product_id: i32,
    pub quantity: i32,
    pub name: String,
    #[schema(value_type = String, example = "5.00")]
    pub price: BigDecimal,
}

/// Validated input of an add-to-cart request.
#[derive(Debug, Clone, Copy)]
pub struct NewCartLine {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Clone, Debug, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub user_id: i32,
    #[schema(value_type = String, example = "13.00")]
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub user_id: i32,
    pub total: BigDecimal,
}

#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize, Clone, Debug, ToSchema,
)]
#[diesel(belongs_to(OrderEntity, foreign_key = order_id))]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    #[schema(value_type = String, example = "5.00")]
    pub unit_price: BigDecimal,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub subtotal: BigDecimal,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderItemEntity {
    pub order_id: i32,
    pub product_id: i32,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order_id: i32,
    pub total: BigDecimal,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct OrderDetail {
    pub order: OrderEntity,
    pub order_items: Vec<OrderItemEntity>,
}
