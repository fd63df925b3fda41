//! Priority rule — a named scoring factor with a declarative `score_config`
//! (spec.md §3 "Priority rule / profile / queue-config / score", §4.3).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ScoreType {
    #[sea_orm(string_value = "wait_time")]
    WaitTime,
    #[sea_orm(string_value = "order_value")]
    OrderValue,
    #[sea_orm(string_value = "vip")]
    Vip,
    #[sea_orm(string_value = "delivery_time")]
    DeliveryTime,
    #[sea_orm(string_value = "prep_complexity")]
    PrepComplexity,
    #[sea_orm(string_value = "loyalty")]
    Loyalty,
    #[sea_orm(string_value = "peak_hours")]
    PeakHours,
    #[sea_orm(string_value = "group_size")]
    GroupSize,
    #[sea_orm(string_value = "special_needs")]
    SpecialNeeds,
    #[sea_orm(string_value = "custom")]
    Custom,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "priority_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub restaurant_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub score_type: ScoreType,

    /// `{type, base, multiplier, exponent, steps, bounds}` per spec.md §6.
    pub score_config: Json,

    pub default_weight: f64,
    pub min_score: f64,
    pub max_score: f64,

    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::priority_profile_rule::Entity")]
    ProfileRules,
}

impl Related<super::priority_profile_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfileRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
