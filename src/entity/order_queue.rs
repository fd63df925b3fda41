//! Order queue — identity per logical station. spec.md §3 invariant:
//! `current_size` equals the number of live items referencing this queue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum QueueStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_queues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub restaurant_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub queue_type: String,

    pub status: QueueStatus,
    pub capacity: i32,

    pub default_prep_time_min: i32,
    pub warning_sla_min: i32,
    pub critical_sla_min: i32,

    pub current_size: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::queue_item::Entity")]
    Items,

    #[sea_orm(has_one = "super::queue_priority_config::Entity")]
    PriorityConfig,

    #[sea_orm(has_many = "super::queue_sequence_rule::Entity")]
    SequenceRules,
}

impl Related<super::queue_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::queue_priority_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriorityConfig.def()
    }
}

impl Related<super::queue_sequence_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SequenceRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
