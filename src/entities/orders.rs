use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
pub enum PaymentType {
    #[sea_orm(string_value = "Cash")]
    Cash,
}

impl Default for PaymentType {
    fn default() -> Self {
        PaymentType::Cash
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentType::Cash => write!(f, "Cash"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub custom_location: String,
    pub custom_contact: String,
    pub custom_email: Option<String>,
    pub payment_type: PaymentType,
    pub total_items: i64,
    /// Subtotal over all cart lines, in cents.
    pub total_price: i64,
    pub delivery_charge: i64,
    /// Loyalty discount as an integer percentage.
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::order_kots::Entity")]
    OrderKots,
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_kots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderKots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
