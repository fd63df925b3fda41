//! Audit trail for manual/boost priority adjustments (distinct from the
//! queue item's own status history).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "priority_adjustment_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub queue_item_id: i64,

    pub previous_score: f64,
    pub new_score: f64,

    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub actor_id: Option<i64>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
