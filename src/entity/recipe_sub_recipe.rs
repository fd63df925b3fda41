//! Sub-recipe edge: `parent_recipe_id` includes `child_recipe_id` scaled by
//! `multiplier`. The graph formed by these edges must be acyclic; the
//! Deductor's expansion guards against cycles in pathological data anyway
//! (spec.md §4.1 step 2 and §9).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_sub_recipes")]
#[sea_orm(index(unique, name = "idx_recipe_sub_recipe_unique", col = "parent_recipe_id, child_recipe_id"))]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub parent_recipe_id: i64,
    pub child_recipe_id: i64,

    pub multiplier: Decimal,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
