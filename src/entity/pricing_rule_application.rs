//! Immutable record of a rule having been applied to an order. spec.md §3
//! invariant: `final_amount = original_amount - discount_amount >= 0`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Provenance {
    #[sea_orm(string_value = "system")]
    System,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "api")]
    Api,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pricing_rule_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub rule_id: String,
    pub order_id: i64,
    pub customer_id: Option<i64>,

    pub discount_amount: Decimal,
    pub original_amount: Decimal,
    pub final_amount: Decimal,

    /// Per-section conditions-met map, recorded for audit/debug replay.
    pub conditions_met: Json,

    pub provenance: Provenance,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pricing_rule::Entity",
        from = "Column::RuleId",
        to = "super::pricing_rule::Column::RuleId",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Rule,
}

impl Related<super::pricing_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
