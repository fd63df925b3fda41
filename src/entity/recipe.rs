//! Recipe — 1:1 with a menu item. Ingredients and sub-recipe edges live in
//! their own tables; see [`super::recipe_ingredient`] and
//! [`super::recipe_sub_recipe`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub menu_item_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    Ingredients,

    #[sea_orm(has_many = "super::recipe_sub_recipe::Entity")]
    SubRecipes,
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl Related<super::recipe_sub_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubRecipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
