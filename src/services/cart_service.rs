//! Cart line engine: creates, resizes and removes cart lines while keeping
//! the owning order's running totals and pricing in lock-step.

use chrono::{Local, Timelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    cart_item_entity as cart_items, menu_item_entity as menu_items, order_entity as orders,
    order_kot_entity as order_kots,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddCartItemRequest, CartItemResponse, CartMutationResponse, CartRemovalResponse, KotResponse,
    OrderTotals,
};
use crate::pricing::PricingPolicy;
use crate::services::kot_service;

const MAX_LINE_QUANTITY: i32 = 999;

/// Load an order's lines together with their menu items.
pub(crate) async fn lines_with_items<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> AppResult<Vec<(cart_items::Model, menu_items::Model)>> {
    let rows = cart_items::Entity::find()
        .filter(cart_items::Column::OrderId.eq(order_id))
        .find_also_related(menu_items::Entity)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(line, item)| {
            item.map(|item| (line, item)).ok_or_else(|| {
                AppError::InternalError("Cart line references a missing menu item".to_string())
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
    pricing: PricingPolicy,
}

impl CartService {
    pub fn new(pool: DatabaseConnection, pricing: PricingPolicy) -> Self {
        Self { pool, pricing }
    }

    /// Add an item to an order's cart, or resize the existing line when the
    /// order already holds that item. Quantity defaults to 1.
    pub async fn add_line(
        &self,
        actor: Option<i64>,
        request: AddCartItemRequest,
    ) -> AppResult<CartMutationResponse> {
        let quantity = request.quantity.unwrap_or(1);
        validate_quantity(quantity)?;

        let txn = self.pool.begin().await?;

        let order = find_order(&txn, request.order_id).await?;
        guard_line_mutation(&order, actor)?;

        let item = menu_items::Entity::find_by_id(request.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;
        if !item.is_available {
            return Err(AppError::ValidationError(format!(
                "Menu item '{}' is currently unavailable",
                item.name
            )));
        }

        let existing = cart_items::Entity::find()
            .filter(cart_items::Column::OrderId.eq(order.id))
            .filter(cart_items::Column::ItemId.eq(item.id))
            .one(&txn)
            .await?;

        let line = match existing {
            // (order, item) is unique: re-adding resizes the line
            Some(line) => {
                let mut am = line.into_active_model();
                am.quantity = Set(quantity);
                am.updated_at = Set(Utc::now());
                am.update(&txn).await?
            }
            None => cart_items::ActiveModel {
                order_id: Set(order.id),
                item_id: Set(item.id),
                quantity: Set(quantity),
                created_by: Set(actor),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?,
        };

        let order = self.refresh_totals(&txn, order, actor).await?;
        txn.commit().await?;

        Ok(CartMutationResponse {
            cart_item: CartItemResponse::from_line(line, item),
            order: OrderTotals::from(&order),
        })
    }

    /// Set a line to a new quantity. A no-op when the quantity is unchanged.
    pub async fn update_quantity(
        &self,
        actor: Option<i64>,
        cart_item_id: i64,
        quantity: i32,
    ) -> AppResult<CartMutationResponse> {
        validate_quantity(quantity)?;

        let txn = self.pool.begin().await?;

        let line = find_line(&txn, cart_item_id).await?;
        let order = find_order(&txn, line.order_id).await?;
        guard_line_mutation(&order, actor)?;

        let item = menu_items::Entity::find_by_id(line.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError("Cart line references a missing menu item".to_string())
            })?;

        if line.quantity == quantity {
            txn.commit().await?;
            return Ok(CartMutationResponse {
                cart_item: CartItemResponse::from_line(line, item),
                order: OrderTotals::from(&order),
            });
        }

        let mut am = line.into_active_model();
        am.quantity = Set(quantity);
        am.updated_at = Set(Utc::now());
        let line = am.update(&txn).await?;

        let order = self.refresh_totals(&txn, order, actor).await?;
        txn.commit().await?;

        Ok(CartMutationResponse {
            cart_item: CartItemResponse::from_line(line, item),
            order: OrderTotals::from(&order),
        })
    }

    /// Delete a line, refresh the order's totals and, when the kitchen had
    /// already been told about the item, append a compensating negative
    /// diff so the next ticket cancels what is no longer wanted.
    pub async fn remove_line(
        &self,
        actor: Option<i64>,
        cart_item_id: i64,
    ) -> AppResult<CartRemovalResponse> {
        let txn = self.pool.begin().await?;

        let line = find_line(&txn, cart_item_id).await?;
        let order = find_order(&txn, line.order_id).await?;
        guard_line_mutation(&order, actor)?;

        let communicated = kot_service::communicated_by_item(&txn, order.id)
            .await?
            .get(&line.item_id)
            .copied()
            .unwrap_or(0);

        let kot_row = if communicated != 0 {
            let next_batch = kot_service::max_batch(&txn, order.id).await? + 1;
            let row = order_kots::ActiveModel {
                order_id: Set(order.id),
                cart_item_id: Set(None),
                item_id: Set(line.item_id),
                quantity_diff: Set(-(communicated as i32)),
                batch: Set(next_batch),
                timestamp: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            Some(KotResponse::from(row))
        } else {
            None
        };

        cart_items::Entity::delete_by_id(line.id).exec(&txn).await?;

        let order = self.refresh_totals(&txn, order, actor).await?;
        txn.commit().await?;

        Ok(CartRemovalResponse {
            order: OrderTotals::from(&order),
            kot_row,
        })
    }

    /// Recompute item count and subtotal from all current lines, then let
    /// the pricing policy refresh charge, discount and grand total.
    async fn refresh_totals<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: orders::Model,
        actor: Option<i64>,
    ) -> AppResult<orders::Model> {
        let lines = lines_with_items(conn, order.id).await?;

        let total_items: i64 = lines.iter().map(|(line, _)| line.quantity as i64).sum();
        let subtotal: i64 = lines
            .iter()
            .map(|(line, item)| line.quantity as i64 * item.price)
            .sum();

        let quote = self.pricing.quote(subtotal, Local::now().hour());

        let mut am = order.into_active_model();
        am.total_items = Set(total_items);
        am.total_price = Set(subtotal);
        am.delivery_charge = Set(quote.delivery_charge);
        am.loyalty_discount = Set(quote.loyalty_discount);
        am.grand_total = Set(quote.grand_total);
        am.updated_at = Set(Utc::now());
        am.updated_by = Set(actor);
        let order = am.update(conn).await?;
        Ok(order)
    }
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(AppError::ValidationError(format!(
            "Quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

/// Fetch the order under an exclusive row lock so concurrent mutations of
/// the same order serialize. SQLite has no row locks; there the whole
/// database write path is serial anyway.
async fn find_order<C: ConnectionTrait>(conn: &C, order_id: i64) -> AppResult<orders::Model> {
    orders::Entity::find_by_id(order_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

async fn find_line<C: ConnectionTrait>(conn: &C, cart_item_id: i64) -> AppResult<cart_items::Model> {
    cart_items::Entity::find_by_id(cart_item_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))
}

/// Guests lose write access once they submit; staff keep adjusting the cart
/// (feeding incremental KOT batches) until delivery starts.
fn guard_line_mutation(order: &orders::Model, actor: Option<i64>) -> AppResult<()> {
    if order.is_delivered || order.delivery_started {
        return Err(AppError::InvalidState(format!(
            "Order #{} is already out for delivery",
            order.id
        )));
    }
    if order.done_from_customer && actor.is_none() {
        return Err(AppError::InvalidState(format!(
            "Order #{} has already been submitted",
            order.id
        )));
    }
    Ok(())
}
