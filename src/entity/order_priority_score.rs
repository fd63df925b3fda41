//! Cached per-queue-item priority score. Unique on `queue_item_id`.
//! Invariant: `total` stays within `[profile.min_total_score,
//! profile.max_total_score]`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_priority_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub queue_item_id: i64,
    pub profile_id: i64,

    pub total: f64,
    pub base: f64,
    pub boost: f64,

    /// `{rule_name: weighted_component_value}`.
    pub components: Json,

    pub calculated_at: DateTimeWithTimeZone,

    pub is_boosted: bool,
    pub boost_expires_at: Option<DateTimeWithTimeZone>,

    pub suggested_sequence: Option<i32>,
}

impl Model {
    pub fn tier(&self) -> &'static str {
        if self.total >= 80.0 {
            "high"
        } else if self.total >= 50.0 {
            "medium"
        } else {
            "low"
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::queue_item::Entity",
        from = "Column::QueueItemId",
        to = "super::queue_item::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    QueueItem,
}

impl Related<super::queue_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QueueItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
