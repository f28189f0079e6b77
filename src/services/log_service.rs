//! Append-only audit trail. The ordering core only ever writes here.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

use crate::entities::{log_entity, LogMode};
use crate::error::AppResult;

/// Append one audit row inside the caller's transaction.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    mode: LogMode,
    actor_id: Option<i64>,
    detail: String,
) -> AppResult<()> {
    log_entity::ActiveModel {
        mode: Set(mode),
        actor_id: Set(actor_id),
        detail: Set(detail),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}
