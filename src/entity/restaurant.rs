//! Restaurant — the single-tenant scoping root.
//!
//! Every other table carries a `restaurant_id` foreign key to this one. This
//! is the full extent of multi-tenant isolation the core provides: rows are
//! scoped, but no row-level security or per-tenant connection pooling exists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ConflictResolution {
    #[sea_orm(string_value = "highest_discount")]
    HighestDiscount,
    #[sea_orm(string_value = "first_match")]
    FirstMatch,
    #[sea_orm(string_value = "priority_based")]
    PriorityBased,
    #[sea_orm(string_value = "combine_additive")]
    CombineAdditive,
    #[sea_orm(string_value = "combine_multiplicative")]
    CombineMultiplicative,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub default_conflict_resolution: ConflictResolution,

    /// See spec.md §9 open question 1 — both deduction paths are
    /// implemented, selected by this flag.
    pub use_recipe_based_deduction: bool,
    pub deduct_on_completion: bool,
    pub auto_reverse_on_cancellation: bool,
    pub allow_partial_fulfillment: bool,
    pub allow_negative_inventory: bool,

    /// Percent (0-100) of threshold at which a low-stock warning fires.
    pub low_stock_warning_threshold_pct: Decimal,
    pub max_sub_recipe_depth: i32,
    pub max_batch_size: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Default for Model {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            default_conflict_resolution: ConflictResolution::HighestDiscount,
            use_recipe_based_deduction: true,
            deduct_on_completion: false,
            auto_reverse_on_cancellation: true,
            allow_partial_fulfillment: true,
            allow_negative_inventory: false,
            low_stock_warning_threshold_pct: Decimal::new(20, 0),
            max_sub_recipe_depth: 8,
            max_batch_size: 200,
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }
}
