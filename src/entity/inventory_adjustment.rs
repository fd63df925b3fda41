//! Inventory adjustment — immutable audit row. spec.md §3 invariant:
//! `quantity_before + quantity_change == quantity_after`, and the running
//! sum of `quantity_change` against an inventory id equals the current
//! quantity minus the initial quantity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AdjustmentKind {
    #[sea_orm(string_value = "consumption")]
    Consumption,
    #[sea_orm(string_value = "return")]
    Return,
    #[sea_orm(string_value = "manual")]
    Manual,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ReferenceKind {
    #[sea_orm(string_value = "order")]
    Order,
    #[sea_orm(string_value = "order_reversal")]
    OrderReversal,
    #[sea_orm(string_value = "manual")]
    Manual,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_adjustments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub inventory_id: i64,
    pub kind: AdjustmentKind,

    pub quantity_before: Decimal,
    pub quantity_change: Decimal,
    pub quantity_after: Decimal,

    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,

    pub reference_kind: ReferenceKind,
    /// Order id for `Order`/`OrderReversal`, null for `Manual`.
    pub reference_id: Option<i64>,

    pub actor_id: Option<i64>,

    /// JSON blob: contributing order items / recipes, `synced_to_external`
    /// flag, original adjustment id for reversals, etc.
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn synced_to_external(&self) -> bool {
        self.metadata
            .get("synced_to_external")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory::Entity",
        from = "Column::InventoryId",
        to = "super::inventory::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Inventory,
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
