use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{order_entity, PaymentType};
use crate::models::cart::CartItemResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub custom_location: Option<String>,
    pub custom_contact: Option<String>,
    pub custom_email: Option<String>,
    pub payment_type: Option<PaymentType>,
}

/// Manual override while closing an order: totals are recomputed from the
/// cart lines and the supplied charge/discount replace the policy values.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub delivery_charge: Option<i64>,
    pub loyalty_discount: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderQuery {
    pub delivery_started: Option<bool>,
    pub is_delivered: Option<bool>,
    pub done_from_customer: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub custom_location: String,
    pub custom_contact: String,
    pub custom_email: Option<String>,
    pub payment_type: PaymentType,
    pub total_items: i64,
    pub total_price: i64,
    pub delivery_charge: i64,
    pub loyalty_discount: i32,
    pub grand_total: i64,
    pub delivery_started: bool,
    pub delivery_started_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub done_from_customer: bool,
    pub done_from_customer_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            id: m.id,
            custom_location: m.custom_location,
            custom_contact: m.custom_contact,
            custom_email: m.custom_email,
            payment_type: m.payment_type,
            total_items: m.total_items,
            total_price: m.total_price,
            delivery_charge: m.delivery_charge,
            loyalty_discount: m.loyalty_discount,
            grand_total: m.grand_total,
            delivery_started: m.delivery_started,
            delivery_started_at: m.delivery_started_at,
            is_delivered: m.is_delivered,
            delivered_at: m.delivered_at,
            done_from_customer: m.done_from_customer,
            done_from_customer_at: m.done_from_customer_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            created_by: m.created_by,
            updated_by: m.updated_by,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithCartResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub cart_items: Vec<CartItemResponse>,
}

/// Running totals snapshot returned alongside every cart mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderTotals {
    pub total_items: i64,
    pub total_price: i64,
    pub delivery_charge: i64,
    pub loyalty_discount: i32,
    pub grand_total: i64,
}

impl From<&order_entity::Model> for OrderTotals {
    fn from(m: &order_entity::Model) -> Self {
        Self {
            total_items: m.total_items,
            total_price: m.total_price,
            delivery_charge: m.delivery_charge,
            loyalty_discount: m.loyalty_discount,
            grand_total: m.grand_total,
        }
    }
}
