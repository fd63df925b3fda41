//! Request/response DTOs for the Recipe Inventory Deductor (C1).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMode {
    OnStart,
    OnCompletion,
    Partial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemQty {
    pub menu_item_id: i64,
    pub quantity: Decimal,
}

/// `map[inventory_id -> required quantity + provenance]`, spec.md §4.1
/// step 5 output shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequiredIngredient {
    pub quantity: Decimal,
    pub unit: String,
    pub contributing_order_items: Vec<i64>,
    pub contributing_recipes: Vec<RecipeContribution>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeContribution {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub quantity_used: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeductedItem {
    pub inventory_id: i64,
    pub item_name: String,
    pub quantity_deducted: Decimal,
    pub unit: String,
    pub new_quantity: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct LowStockWarning {
    pub inventory_id: i64,
    pub item_name: String,
    pub current_quantity: Decimal,
    pub threshold: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemWithoutRecipe {
    pub menu_item_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeductionResult {
    pub deducted_items: Vec<DeductedItem>,
    pub low_stock_warnings: Vec<LowStockWarning>,
    pub items_without_recipes: Vec<ItemWithoutRecipe>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReversalResult {
    pub reversed_items: Vec<DeductedItem>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReverseRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartialFulfillItem {
    pub inventory_id: i64,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreviewRequest {
    pub restaurant_id: i64,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemQty>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PartialFulfillRequest {
    pub restaurant_id: i64,
    #[validate(length(min = 1))]
    pub items: Vec<PartialFulfillItem>,
}
