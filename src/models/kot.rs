use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::order_kot_entity;

#[derive(Debug, Deserialize, IntoParams)]
pub struct KotQuery {
    pub order: Option<i64>,
    pub batch: Option<i32>,
    /// Only rows issued at or after this instant.
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KotResponse {
    pub id: i64,
    pub order_id: i64,
    pub cart_item_id: Option<i64>,
    pub item_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub quantity_diff: i32,
    pub batch: i32,
    pub timestamp: DateTime<Utc>,
}

impl From<order_kot_entity::Model> for KotResponse {
    fn from(m: order_kot_entity::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            cart_item_id: m.cart_item_id,
            item_id: m.item_id,
            item_name: None,
            quantity_diff: m.quantity_diff,
            batch: m.batch,
            timestamp: m.timestamp,
        }
    }
}

impl KotResponse {
    pub fn with_item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }
}
