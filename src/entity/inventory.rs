//! Inventory item — spec.md §3 "Inventory item". Mutated only by the
//! Deductor through typed adjustments; `quantity` must stay non-negative at
//! every committed transaction boundary unless the restaurant allows it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub restaurant_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub quantity: Decimal,

    #[sea_orm(column_type = "Text")]
    pub unit: String,

    pub low_stock_threshold: Decimal,

    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_adjustment::Entity")]
    Adjustments,
}

impl Related<super::inventory_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
