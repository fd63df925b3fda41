//! Per-rule, per-day rolled-up counters. Unique on `(rule_id, date)`.
//! Populated by [`crate::services::pricing_engine::PricingEngine`] and
//! purged by the rule-expiry worker's daily cleanup task (90 day retention,
//! spec.md §4.2).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pricing_rule_metrics")]
#[sea_orm(index(unique, name = "idx_pricing_rule_metrics_unique", col = "rule_id, date"))]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub rule_id: String,
    pub date: Date,

    pub evaluated_count: i32,
    pub applied_count: i32,
    pub skipped_count: i32,
    pub conflicts_resolved: i32,
    pub stacking_count: i32,
    pub total_discount: Decimal,
    pub distinct_customers: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
