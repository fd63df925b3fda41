//! Join row binding a rule into a profile with a weight override and
//! optional fallback thresholds. Unique on `(profile_id, rule_id)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "priority_profile_rules")]
#[sea_orm(index(unique, name = "idx_priority_profile_rule_unique", col = "profile_id, rule_id"))]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub profile_id: i64,
    pub rule_id: i64,

    pub weight_override: Option<f64>,
    pub required: bool,

    /// Replace the computed score with `fallback_score` when the raw base
    /// value falls outside `[min_threshold, max_threshold]`.
    pub min_threshold: Option<f64>,
    pub max_threshold: Option<f64>,
    pub fallback_score: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::priority_profile::Entity",
        from = "Column::ProfileId",
        to = "super::priority_profile::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Profile,

    #[sea_orm(
        belongs_to = "super::priority_rule::Entity",
        from = "Column::RuleId",
        to = "super::priority_rule::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Rule,
}

impl Related<super::priority_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::priority_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
