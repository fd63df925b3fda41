//! Flat menu-item → inventory mapping used by the legacy (non-recipe)
//! deduction path when `use_recipe_based_deduction=false` (spec.md §9 open
//! question 1: both deduction variants are implemented, selected by
//! config).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_item_inventory")]
#[sea_orm(index(unique, name = "idx_menu_item_inventory_unique", col = "menu_item_id, inventory_id"))]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub menu_item_id: i64,
    pub inventory_id: i64,

    pub quantity_per_item: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
