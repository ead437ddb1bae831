//! Round history repository functions (generic over ConnectionTrait).
//!
//! The history is append-only: rows are inserted when a round completes and
//! only ever removed wholesale by an operator reset.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::domain::round::Round;
use crate::entities::completed_rounds;
use crate::error::AppError;

/// Append one completed round. The caller guarantees the round is `Done`
/// and not aborted.
pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round: &Round,
) -> Result<(), AppError> {
    let model = completed_rounds::ActiveModel {
        round_no: Set(round.number as i64),
        prompter_id: Set(round.prompter.id.clone()),
        prompt: Set(round.prompt_text.clone().unwrap_or_default()),
        winner_id: Set(round.winner_id().map(str::to_string)),
        payload: Set(serde_json::to_value(round)?),
        completed_at: Set(round.completed_at.unwrap_or_else(OffsetDateTime::now_utc)),
        ..Default::default()
    };
    model.insert(conn).await?;
    Ok(())
}

/// The `n` most recent rounds, newest first.
pub async fn list_recent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<completed_rounds::Model>, AppError> {
    let rows = completed_rounds::Entity::find()
        .order_by(completed_rounds::Column::RoundNo, Order::Desc)
        .limit(limit)
        .all(conn)
        .await?;
    Ok(rows)
}

/// Full dump, oldest first.
pub async fn export_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<completed_rounds::Model>, AppError> {
    let rows = completed_rounds::Entity::find()
        .order_by(completed_rounds::Column::RoundNo, Order::Asc)
        .all(conn)
        .await?;
    Ok(rows)
}

/// Remove every persisted round.
pub async fn wipe_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<(), AppError> {
    completed_rounds::Entity::delete_many()
        .filter(completed_rounds::Column::Id.gte(0))
        .exec(conn)
        .await?;
    Ok(())
}
