//! Append-only log of status transitions for a queue item. Written on every
//! admit (old=null) and every subsequent transition.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queue_item_status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub queue_item_id: i64,

    pub old_status: Option<super::queue_item::QueueItemStatus>,
    pub new_status: super::queue_item::QueueItemStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub actor_id: Option<i64>,

    pub created_at: DateTimeWithTimeZone,
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
