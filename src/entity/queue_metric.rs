//! Hourly rollup of queue throughput. Unique on `(queue_id, date, hour)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queue_metrics")]
#[sea_orm(index(unique, name = "idx_queue_metrics_unique", col = "queue_id, date, hour"))]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub queue_id: i64,
    pub date: Date,
    pub hour: i16,

    pub items_admitted: i32,
    pub items_completed: i32,
    pub items_cancelled: i32,
    pub avg_wait_time_min: Option<f64>,
    pub avg_prep_time_min: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
