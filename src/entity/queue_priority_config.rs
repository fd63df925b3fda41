//! Binds a profile to one queue and carries rebalance policy + boost
//! constants. Unique on `queue_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queue_priority_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub queue_id: i64,
    pub profile_id: i64,

    pub is_active: bool,

    pub rebalance_enabled: bool,
    /// Rebalance fires when `fairness < rebalance_threshold` (or forced).
    pub rebalance_threshold: f64,
    pub max_position_change: i32,

    pub boost_vip: f64,
    pub boost_delayed: f64,
    pub boost_large_party: f64,
    pub peak_multiplier: f64,

    /// JSON array of integer hours (0-23) considered "peak".
    pub peak_hours: Json,

    pub boost_duration_seconds: i64,
}

impl Model {
    pub fn peak_hour_set(&self) -> Vec<u32> {
        self.peak_hours
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_u64().map(|n| n as u32)).collect())
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_queue::Entity",
        from = "Column::QueueId",
        to = "super::order_queue::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Queue,

    #[sea_orm(
        belongs_to = "super::priority_profile::Entity",
        from = "Column::ProfileId",
        to = "super::priority_profile::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Profile,
}

impl Related<super::order_queue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Queue.def()
    }
}

impl Related<super::priority_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
