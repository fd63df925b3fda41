//! Priority profile — bundles rules with per-rule weights and an
//! aggregation method.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AggregationMethod {
    #[sea_orm(string_value = "weighted_sum")]
    WeightedSum,
    #[sea_orm(string_value = "max")]
    Max,
    #[sea_orm(string_value = "min")]
    Min,
    #[sea_orm(string_value = "average")]
    Average,
    #[sea_orm(string_value = "multiply")]
    Multiply,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "priority_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub restaurant_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub aggregation_method: AggregationMethod,

    pub total_weight_normalization: bool,

    pub min_total_score: f64,
    pub max_total_score: f64,

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
