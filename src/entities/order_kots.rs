use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One appended kitchen-ticket diff row. Never updated after insert.
///
/// `item_id` is denormalized from the cart line so that communicated
/// quantities can still be aggregated per menu item after the line itself
/// has been removed; `cart_item_id` goes NULL in that case.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "order_kots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub cart_item_id: Option<i64>,
    pub item_id: i64,
    pub quantity_diff: i32,
    pub batch: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::menu_items::Entity",
        from = "Column::ItemId",
        to = "super::menu_items::Column::Id"
    )]
    Item,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::menu_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
