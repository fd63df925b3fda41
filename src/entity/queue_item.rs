//! Queue item — spec.md §3 "Queue item" / §4.4 status DAG.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum QueueItemStatus {
    #[sea_orm(string_value = "queued")]
    Queued,
    #[sea_orm(string_value = "in_preparation")]
    InPreparation,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "delayed")]
    Delayed,
}

impl QueueItemStatus {
    /// Status transition DAG, spec.md §4.4.
    pub fn can_transition_to(&self, next: &QueueItemStatus) -> bool {
        use QueueItemStatus::*;
        matches!(
            (self, next),
            (Queued, InPreparation) | (Queued, OnHold) | (Queued, Cancelled) |
            (InPreparation, Ready) | (InPreparation, OnHold) | (InPreparation, Cancelled) |
            (Ready, Completed) | (Ready, OnHold) |
            (OnHold, Queued) | (OnHold, InPreparation) | (OnHold, Cancelled) |
            (Delayed, Queued) | (Delayed, Cancelled)
        )
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, QueueItemStatus::Completed | QueueItemStatus::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueItemStatus::Completed | QueueItemStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queue_items")]
#[sea_orm(index(unique, name = "idx_queue_items_sequence_unique", col = "queue_id, sequence_number"))]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub queue_id: i64,
    #[sea_orm(unique)]
    pub order_id: i64,

    pub sequence_number: i32,
    pub priority: f64,
    pub expedited: bool,

    pub status: QueueItemStatus,

    pub queued_at: DateTimeWithTimeZone,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub ready_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,

    pub hold_until: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub hold_reason: Option<String>,

    pub estimated_ready_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text", nullable)]
    pub assigned_staff: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub assigned_station: Option<String>,

    /// Minutes, populated once READY/COMPLETED are reached.
    pub prep_time_actual_min: Option<f64>,
    pub wait_time_actual_min: Option<f64>,
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

    #[sea_orm(has_one = "super::order_priority_score::Entity")]
    PriorityScore,

    #[sea_orm(has_many = "super::queue_item_status_history::Entity")]
    StatusHistory,
}

impl Related<super::order_queue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Queue.def()
    }
}

impl Related<super::order_priority_score::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriorityScore.def()
    }
}

impl Related<super::queue_item_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::QueueItemStatus::*;

    #[test]
    fn queued_item_is_live() {
        assert!(Queued.is_live());
        assert!(!Queued.is_terminal());
    }

    #[test]
    fn completed_and_cancelled_are_terminal_not_live() {
        assert!(!Completed.is_live());
        assert!(!Cancelled.is_live());
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn on_hold_returns_to_queued_or_in_preparation() {
        assert!(OnHold.can_transition_to(&Queued));
        assert!(OnHold.can_transition_to(&InPreparation));
        assert!(OnHold.can_transition_to(&Cancelled));
        assert!(!OnHold.can_transition_to(&Ready));
    }

    #[test]
    fn ready_can_only_complete_or_go_on_hold() {
        assert!(Ready.can_transition_to(&Completed));
        assert!(Ready.can_transition_to(&OnHold));
        assert!(!Ready.can_transition_to(&InPreparation));
        assert!(!Ready.can_transition_to(&Cancelled));
    }

    #[test]
    fn delayed_only_resumes_to_queued_or_cancels() {
        assert!(Delayed.can_transition_to(&Queued));
        assert!(Delayed.can_transition_to(&Cancelled));
        assert!(!Delayed.can_transition_to(&InPreparation));
    }
}
