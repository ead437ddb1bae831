use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Append-only record of a completed (non-aborted) round. Immutable once
/// written; the full round is stored as JSON alongside the queryable
/// columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "completed_rounds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub round_no: i64,
    pub prompter_id: String,
    pub prompt: String,
    pub winner_id: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub payload: Json,
    pub completed_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
