//! Kitchen Order Ticket batching: derives, from current cart-line
//! quantities versus previously issued batches, the minimal incremental
//! diff the kitchen still needs to hear about.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    cart_item_entity as cart_items, menu_item_entity as menu_items,
    order_entity as orders, order_kot_entity as order_kots,
};
use crate::error::{AppError, AppResult};
use crate::models::{KotQuery, KotResponse};

/// Quantity already communicated to the kitchen, summed per menu item.
/// Diffs are aggregated by item (not by cart-line id) so the baseline
/// survives line removal and re-adding.
pub(crate) async fn communicated_by_item<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> AppResult<HashMap<i64, i64>> {
    let rows = order_kots::Entity::find()
        .filter(order_kots::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;

    let mut communicated: HashMap<i64, i64> = HashMap::new();
    for row in rows {
        *communicated.entry(row.item_id).or_insert(0) += row.quantity_diff as i64;
    }
    Ok(communicated)
}

/// Highest batch number issued for the order so far, 0 when none.
pub(crate) async fn max_batch<C: ConnectionTrait>(conn: &C, order_id: i64) -> AppResult<i32> {
    let rows = order_kots::Entity::find()
        .filter(order_kots::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;
    Ok(rows.iter().map(|r| r.batch).max().unwrap_or(0))
}

/// Issue batch 1: one row per current cart line carrying its full
/// quantity. Caller must have verified that no batch exists yet.
pub(crate) async fn create_first_batch<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> AppResult<Vec<order_kots::Model>> {
    let lines = cart_items::Entity::find()
        .filter(cart_items::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;

    let mut created = Vec::with_capacity(lines.len());
    for line in lines {
        let row = order_kots::ActiveModel {
            order_id: Set(order_id),
            cart_item_id: Set(Some(line.id)),
            item_id: Set(line.item_id),
            quantity_diff: Set(line.quantity),
            batch: Set(1),
            timestamp: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        created.push(row);
    }
    Ok(created)
}

/// Take an exclusive row lock on the order so batch allocation
/// (`max(batch) + 1`) is atomic with the inserts that follow. SQLite has
/// no row locks; there the whole database write path is serial anyway.
async fn lock_order<C: ConnectionTrait>(conn: &C, order_id: i64) -> AppResult<orders::Model> {
    orders::Entity::find_by_id(order_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

#[derive(Clone)]
pub struct KotService {
    pool: DatabaseConnection,
}

impl KotService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Issue the first batch for an order. Fails with `Conflict` if any
    /// ticket row already exists for it.
    pub async fn init_first_batch(&self, order_id: i64) -> AppResult<Vec<KotResponse>> {
        let txn = self.pool.begin().await?;

        lock_order(&txn, order_id).await?;

        let existing = order_kots::Entity::find()
            .filter(order_kots::Column::OrderId.eq(order_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "KOT batches already exist for order #{order_id}"
            )));
        }

        let created = create_first_batch(&txn, order_id).await?;
        txn.commit().await?;

        Ok(created.into_iter().map(KotResponse::from).collect())
    }

    /// Issue the next incremental batch: one row per cart line whose net
    /// quantity differs from what previous batches already communicated.
    /// Returns an empty list when the kitchen is up to date; calling it
    /// again with no intervening cart change never creates rows.
    ///
    /// Lines that vanished from the cart are not zeroed here; the removal
    /// path emits its own compensating diff.
    pub async fn generate_next_batch(&self, order_id: i64) -> AppResult<Vec<KotResponse>> {
        let txn = self.pool.begin().await?;

        lock_order(&txn, order_id).await?;

        let last_batch = max_batch(&txn, order_id).await?;
        if last_batch == 0 {
            return Err(AppError::InvalidState(
                "First KOT batch has not been issued for this order".to_string(),
            ));
        }

        let communicated = communicated_by_item(&txn, order_id).await?;
        let lines = cart_items::Entity::find()
            .filter(cart_items::Column::OrderId.eq(order_id))
            .all(&txn)
            .await?;

        let next_batch = last_batch + 1;
        let mut created = Vec::new();
        for line in lines {
            let target = line.quantity as i64;
            let sent = communicated.get(&line.item_id).copied().unwrap_or(0);
            let diff = target - sent;
            if diff == 0 {
                continue;
            }
            let row = order_kots::ActiveModel {
                order_id: Set(order_id),
                cart_item_id: Set(Some(line.id)),
                item_id: Set(line.item_id),
                quantity_diff: Set(diff as i32),
                batch: Set(next_batch),
                timestamp: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.push(row);
        }

        txn.commit().await?;
        Ok(created.into_iter().map(KotResponse::from).collect())
    }

    /// Ticket rows, newest first, with their menu item names resolved.
    pub async fn list_kots(&self, query: &KotQuery) -> AppResult<Vec<KotResponse>> {
        let mut select = order_kots::Entity::find();
        if let Some(order_id) = query.order {
            select = select.filter(order_kots::Column::OrderId.eq(order_id));
        }
        if let Some(batch) = query.batch {
            select = select.filter(order_kots::Column::Batch.eq(batch));
        }
        if let Some(since) = query.since {
            select = select.filter(order_kots::Column::Timestamp.gte(since));
        }

        let rows = select
            .find_also_related(menu_items::Entity)
            .order_by_desc(order_kots::Column::Timestamp)
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(row, item)| {
                let response = KotResponse::from(row);
                match item {
                    Some(item) => response.with_item_name(item.name),
                    None => response,
                }
            })
            .collect())
    }
}
