use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{cart_item_entity, menu_item_entity};
use crate::models::order::OrderTotals;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub order_id: i64,
    pub item_id: i64,
    /// Defaults to 1 when omitted.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItemBrief {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub is_available: bool,
}

impl From<menu_item_entity::Model> for MenuItemBrief {
    fn from(m: menu_item_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: m.price,
            is_available: m.is_available,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i64,
    pub order_id: i64,
    pub item: MenuItemBrief,
    pub quantity: i32,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItemResponse {
    pub fn from_line(line: cart_item_entity::Model, item: menu_item_entity::Model) -> Self {
        Self {
            id: line.id,
            order_id: line.order_id,
            item: MenuItemBrief::from(item),
            quantity: line.quantity,
            created_by: line.created_by,
            created_at: line.created_at,
            updated_at: line.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartMutationResponse {
    pub cart_item: CartItemResponse,
    pub order: OrderTotals,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartRemovalResponse {
    pub order: OrderTotals,
    /// Compensating kitchen diff, present when the kitchen had already
    /// been told about the removed line.
    pub kot_row: Option<crate::models::kot::KotResponse>,
}
