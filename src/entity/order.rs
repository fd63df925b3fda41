//! Order — drives the Order Lifecycle Controller (C5). Status transitions
//! are validated against the DAG in [`OrderStatus::can_transition_to`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Order-level status DAG, analogous to the queue-item DAG of spec.md
    /// §4.4: `PENDING → {IN_PROGRESS, CANCELLED}`,
    /// `IN_PROGRESS → {COMPLETED, CANCELLED}`, both terminal states are
    /// sinks.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress) | (Pending, Cancelled) |
            (InProgress, Completed) | (InProgress, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub restaurant_id: i64,
    pub customer_id: Option<i64>,

    pub status: OrderStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub channel: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub order_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_method: Option<String>,

    /// Free-text notes from the customer/front-of-house, scanned for
    /// keyword hits by the `special_needs` priority rule (spec.md §4.3).
    #[sea_orm(column_type = "Text", nullable)]
    pub special_instructions: Option<String>,

    pub party_size: i32,

    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,

    pub promised_at: Option<DateTimeWithTimeZone>,

    /// Set once the pricing engine has evaluated this order, so C5 does not
    /// re-evaluate on a second transition into the deduction trigger status.
    pub pricing_evaluated: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn pending_can_move_to_in_progress_or_cancelled() {
        assert!(Pending.can_transition_to(&InProgress));
        assert!(Pending.can_transition_to(&Cancelled));
        assert!(!Pending.can_transition_to(&Completed));
    }

    #[test]
    fn in_progress_can_complete_or_cancel() {
        assert!(InProgress.can_transition_to(&Completed));
        assert!(InProgress.can_transition_to(&Cancelled));
        assert!(!InProgress.can_transition_to(&Pending));
    }

    #[test]
    fn terminal_states_are_sinks() {
        assert!(!Completed.can_transition_to(&InProgress));
        assert!(!Cancelled.can_transition_to(&Pending));
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
    }
}
