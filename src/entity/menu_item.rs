//! Menu item — the sellable unit an order line references. Recipes attach
//! 1:1 via `recipe::Model::menu_item_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub restaurant_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub price: Decimal,

    /// Used by the `prep_complexity` priority score type when an order item
    /// doesn't carry its own override.
    pub complexity_score: Decimal,

    #[sea_orm(column_type = "Text", nullable)]
    pub category_id: Option<String>,

    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::recipe::Entity")]
    Recipe,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
