//! Sequence rule — stored per queue, ordered by its own `priority` desc.
//! A rule whose `conditions` match the order may adjust priority, adjust
//! sequence position, auto-expedite, or set station assignment
//! (spec.md §4.4 step "Apply sequence rules").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queue_sequence_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub queue_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub priority: i32,
    pub is_active: bool,

    /// `{menu_item_ids?, min_quantity?, min_order_value?, order_types?}` —
    /// a small fixed match schema, not the full pricing-rule condition
    /// document.
    pub conditions: Json,

    pub priority_adjustment: Option<f64>,
    pub position_adjustment: Option<i32>,
    pub auto_expedite: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub set_station: Option<String>,
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
}

impl Related<super::order_queue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Queue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
