//! Recipe Inventory Deductor (C1) — recipe-graph expansion and atomic
//! inventory deduction/reversal (spec.md §4.1).

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::{HashMap, HashSet};

use crate::context::CoreContext;
use crate::entity::inventory_adjustment::{AdjustmentKind, ReferenceKind};
use crate::entity::{
    inventory, inventory_adjustment, menu_item_inventory, recipe, recipe_ingredient,
    recipe_sub_recipe, restaurant,
};
use crate::errors::{AppError, ShortageDetail};
use crate::models::inventory::{
    DeductedItem, DeductionResult, ItemWithoutRecipe, LowStockWarning, OrderItemQty,
    PartialFulfillItem, RecipeContribution, RequiredIngredient, ReversalResult,
};

pub struct RecipeInventoryDeductor {
    ctx: CoreContext,
}

#[derive(Clone)]
struct RecipeGraph {
    recipe_by_menu_item: HashMap<i64, recipe::Model>,
    ingredients_by_recipe: HashMap<i64, Vec<recipe_ingredient::Model>>,
    sub_recipes_by_parent: HashMap<i64, Vec<recipe_sub_recipe::Model>>,
}

impl RecipeInventoryDeductor {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// `deductForOrder(order_items, order_id, actor_id, mode)`, spec.md
    /// §4.1.
    pub async fn deduct_for_order(
        &self,
        restaurant_id: i64,
        order_items: &[OrderItemQty],
        order_id: i64,
        actor_id: Option<i64>,
    ) -> Result<DeductionResult, AppError> {
        let restaurant = restaurant::Entity::find_by_id(restaurant_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("restaurant".into()))?;

        let (required, items_without_recipes) = if restaurant.use_recipe_based_deduction {
            self.required_ingredients(order_items, restaurant.max_sub_recipe_depth)
                .await?
        } else {
            self.required_ingredients_flat(order_items).await?
        };

        let (deducted_items, low_stock_warnings) = self
            .deduct_required(&required, order_id, actor_id, ReferenceKind::Order, restaurant.allow_negative_inventory)
            .await?;

        Ok(DeductionResult {
            deducted_items,
            low_stock_warnings,
            items_without_recipes: items_without_recipes
                .into_iter()
                .map(|menu_item_id| ItemWithoutRecipe { menu_item_id })
                .collect(),
        })
    }

    /// `partialFulfill(fulfilled_items, order_id, actor_id)` — like
    /// `deductForOrder` but quantities are explicit.
    pub async fn partial_fulfill(
        &self,
        restaurant_id: i64,
        items: &[PartialFulfillItem],
        order_id: i64,
        actor_id: Option<i64>,
    ) -> Result<DeductionResult, AppError> {
        let restaurant = restaurant::Entity::find_by_id(restaurant_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("restaurant".into()))?;

        if !restaurant.allow_partial_fulfillment {
            return Err(AppError::PermissionDenied);
        }

        let mut required = HashMap::new();
        for item in items {
            required.insert(
                item.inventory_id,
                RequiredIngredient {
                    quantity: item.quantity,
                    unit: String::new(),
                    contributing_order_items: Vec::new(),
                    contributing_recipes: Vec::new(),
                },
            );
        }

        let (deducted_items, low_stock_warnings) = self
            .deduct_required(&required, order_id, actor_id, ReferenceKind::Order, restaurant.allow_negative_inventory)
            .await?;

        Ok(DeductionResult {
            deducted_items,
            low_stock_warnings,
            items_without_recipes: Vec::new(),
        })
    }

    /// `previewImpact(order_items)` — read-only projection, no mutation.
    pub async fn preview_impact(
        &self,
        restaurant_id: i64,
        order_items: &[OrderItemQty],
    ) -> Result<HashMap<i64, RequiredIngredient>, AppError> {
        let restaurant = restaurant::Entity::find_by_id(restaurant_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("restaurant".into()))?;

        if restaurant.use_recipe_based_deduction {
            let (required, _) = self
                .required_ingredients(order_items, restaurant.max_sub_recipe_depth)
                .await?;
            Ok(required)
        } else {
            let (required, _) = self.required_ingredients_flat(order_items).await?;
            Ok(required)
        }
    }

    /// `reverseForOrder(order_id, actor_id, reason, force)`, spec.md §4.1
    /// "Reversal".
    pub async fn reverse_for_order(
        &self,
        order_id: i64,
        actor_id: Option<i64>,
        reason: String,
        force: bool,
    ) -> Result<ReversalResult, AppError> {
        let mut consumptions = inventory_adjustment::Entity::find()
            .filter(inventory_adjustment::Column::ReferenceKind.eq(ReferenceKind::Order))
            .filter(inventory_adjustment::Column::ReferenceId.eq(order_id))
            .filter(inventory_adjustment::Column::Kind.eq(AdjustmentKind::Consumption))
            .all(&self.ctx.db)
            .await?;

        if !force && consumptions.iter().any(|c| c.synced_to_external()) {
            return Err(AppError::AlreadySynced);
        }

        consumptions.sort_by_key(|c| c.inventory_id);

        let txn = self.ctx.db.begin().await?;
        let now = self.ctx.now();
        let mut reversed = Vec::with_capacity(consumptions.len());

        for consumption in consumptions {
            let inv = inventory::Entity::find_by_id(consumption.inventory_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("inventory item".into()))?;

            let return_qty = -consumption.quantity_change;
            let quantity_before = inv.quantity;
            let quantity_after = quantity_before + return_qty;

            let mut active: inventory::ActiveModel = inv.clone().into();
            active.quantity = Set(quantity_after);
            active.update(&txn).await?;

            let adjustment = inventory_adjustment::ActiveModel {
                inventory_id: Set(consumption.inventory_id),
                kind: Set(AdjustmentKind::Return),
                quantity_before: Set(quantity_before),
                quantity_change: Set(return_qty),
                quantity_after: Set(quantity_after),
                reason: Set(Some(reason.clone())),
                reference_kind: Set(ReferenceKind::OrderReversal),
                reference_id: Set(Some(order_id)),
                actor_id: Set(actor_id),
                metadata: Set(serde_json::json!({ "original_adjustment_id": consumption.id })),
                created_at: Set(now.fixed_offset()),
                ..Default::default()
            };
            adjustment.insert(&txn).await?;

            reversed.push(DeductedItem {
                inventory_id: consumption.inventory_id,
                item_name: inv.name,
                quantity_deducted: return_qty,
                unit: inv.unit,
                new_quantity: quantity_after,
            });
        }

        txn.commit().await?;

        Ok(ReversalResult {
            reversed_items: reversed,
        })
    }

    /// Required-ingredient calculation over the recipe graph, spec.md §4.1
    /// algorithm steps 1-5.
    async fn required_ingredients(
        &self,
        order_items: &[OrderItemQty],
        max_depth: i32,
    ) -> Result<(HashMap<i64, RequiredIngredient>, Vec<i64>), AppError> {
        let menu_item_ids: Vec<i64> = order_items.iter().map(|i| i.menu_item_id).collect();
        let graph = self.load_recipe_graph(&menu_item_ids).await?;

        let mut required: HashMap<i64, RequiredIngredient> = HashMap::new();
        let mut without_recipe = Vec::new();

        for item in order_items {
            let Some(recipe) = graph.recipe_by_menu_item.get(&item.menu_item_id) else {
                without_recipe.push(item.menu_item_id);
                continue;
            };

            self.expand_recipe(
                &graph,
                recipe.id,
                item.quantity,
                item.menu_item_id,
                &mut HashSet::new(),
                0,
                max_depth,
                &mut required,
            );
        }

        Ok((required, without_recipe))
    }

    /// Recursive expansion with a per-path visited-set cycle guard (spec.md
    /// §4.1 step 2): copies the set at each branch rather than sharing it,
    /// and silently stops descent on a repeat — input recipes are assumed
    /// acyclic, the guard only bounds pathological data.
    #[allow(clippy::too_many_arguments)]
    fn expand_recipe(
        &self,
        graph: &RecipeGraph,
        recipe_id: i64,
        multiplier: Decimal,
        source_menu_item_id: i64,
        visited: &mut HashSet<i64>,
        depth: i32,
        max_depth: i32,
        required: &mut HashMap<i64, RequiredIngredient>,
    ) {
        if visited.contains(&recipe_id) || depth > max_depth {
            return;
        }
        visited.insert(recipe_id);

        if let Some(ingredients) = graph.ingredients_by_recipe.get(&recipe_id) {
            for ing in ingredients {
                if ing.is_optional || !ing.is_active {
                    continue;
                }
                let entry = required.entry(ing.inventory_id).or_insert_with(|| RequiredIngredient {
                    quantity: Decimal::ZERO,
                    unit: ing.unit.clone(),
                    contributing_order_items: Vec::new(),
                    contributing_recipes: Vec::new(),
                });
                entry.quantity += ing.quantity * multiplier;
                if !entry.contributing_order_items.contains(&source_menu_item_id) {
                    entry.contributing_order_items.push(source_menu_item_id);
                }
                entry.contributing_recipes.push(RecipeContribution {
                    recipe_id,
                    recipe_name: String::new(),
                    quantity_used: ing.quantity * multiplier,
                });
            }
        }

        if let Some(sub_recipes) = graph.sub_recipes_by_parent.get(&recipe_id) {
            for sub in sub_recipes {
                if !sub.is_active {
                    continue;
                }
                let mut branch_visited = visited.clone();
                self.expand_recipe(
                    graph,
                    sub.child_recipe_id,
                    multiplier * sub.multiplier,
                    source_menu_item_id,
                    &mut branch_visited,
                    depth + 1,
                    max_depth,
                    required,
                );
            }
        }
    }

    async fn load_recipe_graph(&self, menu_item_ids: &[i64]) -> Result<RecipeGraph, AppError> {
        let recipes = recipe::Entity::find()
            .filter(recipe::Column::MenuItemId.is_in(menu_item_ids.to_vec()))
            .filter(recipe::Column::DeletedAt.is_null())
            .all(&self.ctx.db)
            .await?;

        let recipe_ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();

        let ingredients = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.clone()))
            .order_by_asc(recipe_ingredient::Column::DisplayOrder)
            .all(&self.ctx.db)
            .await?;

        let sub_recipes = recipe_sub_recipe::Entity::find()
            .filter(recipe_sub_recipe::Column::ParentRecipeId.is_in(recipe_ids.clone()))
            .all(&self.ctx.db)
            .await?;

        let mut ingredients_by_recipe: HashMap<i64, Vec<recipe_ingredient::Model>> = HashMap::new();
        for ing in ingredients {
            ingredients_by_recipe.entry(ing.recipe_id).or_default().push(ing);
        }

        let mut sub_recipes_by_parent: HashMap<i64, Vec<recipe_sub_recipe::Model>> = HashMap::new();
        for sub in sub_recipes {
            sub_recipes_by_parent
                .entry(sub.parent_recipe_id)
                .or_default()
                .push(sub);
        }

        let recipe_by_menu_item = recipes
            .into_iter()
            .map(|r| (r.menu_item_id, r))
            .collect();

        Ok(RecipeGraph {
            recipe_by_menu_item,
            ingredients_by_recipe,
            sub_recipes_by_parent,
        })
    }

    /// Legacy flat-mapping deduction path (spec.md §9 open question 1),
    /// selected when `use_recipe_based_deduction=false`.
    async fn required_ingredients_flat(
        &self,
        order_items: &[OrderItemQty],
    ) -> Result<(HashMap<i64, RequiredIngredient>, Vec<i64>), AppError> {
        let menu_item_ids: Vec<i64> = order_items.iter().map(|i| i.menu_item_id).collect();
        let mappings = menu_item_inventory::Entity::find()
            .filter(menu_item_inventory::Column::MenuItemId.is_in(menu_item_ids))
            .all(&self.ctx.db)
            .await?;

        let mut by_menu_item: HashMap<i64, Vec<menu_item_inventory::Model>> = HashMap::new();
        for m in mappings {
            by_menu_item.entry(m.menu_item_id).or_default().push(m);
        }

        let mut required: HashMap<i64, RequiredIngredient> = HashMap::new();
        let mut without_mapping = Vec::new();

        for item in order_items {
            let Some(mappings) = by_menu_item.get(&item.menu_item_id) else {
                without_mapping.push(item.menu_item_id);
                continue;
            };
            for mapping in mappings {
                let entry = required
                    .entry(mapping.inventory_id)
                    .or_insert_with(|| RequiredIngredient {
                        quantity: Decimal::ZERO,
                        unit: String::new(),
                        contributing_order_items: Vec::new(),
                        contributing_recipes: Vec::new(),
                    });
                entry.quantity += mapping.quantity_per_item * item.quantity;
                entry.contributing_order_items.push(item.menu_item_id);
            }
        }

        Ok((required, without_mapping))
    }

    /// Atomic deduction, spec.md §4.1 "Algorithm — atomic deduction".
    async fn deduct_required(
        &self,
        required: &HashMap<i64, RequiredIngredient>,
        order_id: i64,
        actor_id: Option<i64>,
        reference_kind: ReferenceKind,
        allow_negative: bool,
    ) -> Result<(Vec<DeductedItem>, Vec<LowStockWarning>), AppError> {
        if required.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let mut inventory_ids: Vec<i64> = required.keys().copied().collect();
        inventory_ids.sort();

        let txn = self.ctx.db.begin().await?;

        // Ascending id order plus an exclusive row lock inside the
        // transaction: two concurrent deductions on the same ingredient
        // serialize here instead of both reading the pre-deduction quantity.
        let mut rows = Vec::with_capacity(inventory_ids.len());
        for id in &inventory_ids {
            let row = inventory::Entity::find_by_id(*id)
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("inventory item".into()))?;
            rows.push(row);
        }

        if !allow_negative {
            let mut shortages = Vec::new();
            for row in &rows {
                let need = required.get(&row.id).unwrap().quantity;
                if row.quantity < need {
                    shortages.push(ShortageDetail {
                        inventory_id: row.id,
                        item_name: row.name.clone(),
                        available: row.quantity,
                        required: need,
                        unit: row.unit.clone(),
                    });
                }
            }
            if !shortages.is_empty() {
                return Err(AppError::InsufficientInventory(shortages));
            }
        }

        let now = self.ctx.now();
        let mut deducted = Vec::with_capacity(rows.len());
        let mut warnings = Vec::new();

        for row in rows {
            let need = required.get(&row.id).unwrap();
            let quantity_before = row.quantity;
            let quantity_after = quantity_before - need.quantity;

            let mut active: inventory::ActiveModel = row.clone().into();
            active.quantity = Set(quantity_after);
            active.update(&txn).await?;

            let adjustment = inventory_adjustment::ActiveModel {
                inventory_id: Set(row.id),
                kind: Set(AdjustmentKind::Consumption),
                quantity_before: Set(quantity_before),
                quantity_change: Set(-need.quantity),
                quantity_after: Set(quantity_after),
                reason: Set(None),
                reference_kind: Set(reference_kind.clone()),
                reference_id: Set(Some(order_id)),
                actor_id: Set(actor_id),
                metadata: Set(serde_json::json!({
                    "contributing_order_items": need.contributing_order_items,
                    "synced_to_external": false,
                })),
                created_at: Set(now.fixed_offset()),
                ..Default::default()
            };
            adjustment.insert(&txn).await?;

            // Post-deduction quantity at or below the item's own configured
            // threshold (spec.md §4.1 algorithm step 5).
            if quantity_after <= row.low_stock_threshold {
                warnings.push(LowStockWarning {
                    inventory_id: row.id,
                    item_name: row.name.clone(),
                    current_quantity: quantity_after,
                    threshold: row.low_stock_threshold,
                    unit: row.unit.clone(),
                });
            }

            deducted.push(DeductedItem {
                inventory_id: row.id,
                item_name: row.name,
                quantity_deducted: need.quantity,
                unit: row.unit,
                new_quantity: quantity_after,
            });
        }

        txn.commit().await?;

        Ok((deducted, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CoreContext, FixedClock, TracingAuditSink, TracingEventBus};
    use chrono::{TimeZone, Utc};

    fn ingredient(recipe_id: i64, inventory_id: i64, quantity: &str) -> recipe_ingredient::Model {
        recipe_ingredient::Model {
            id: inventory_id,
            recipe_id,
            inventory_id,
            quantity: quantity.parse().unwrap(),
            unit: "g".into(),
            is_optional: false,
            is_active: true,
            display_order: 0,
        }
    }

    fn sub_recipe(parent: i64, child: i64, multiplier: &str) -> recipe_sub_recipe::Model {
        recipe_sub_recipe::Model {
            id: parent * 100 + child,
            parent_recipe_id: parent,
            child_recipe_id: child,
            multiplier: multiplier.parse().unwrap(),
            is_active: true,
        }
    }

    async fn deductor() -> RecipeInventoryDeductor {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        RecipeInventoryDeductor::new(CoreContext {
            db,
            clock: std::sync::Arc::new(FixedClock(Utc.timestamp_opt(0, 0).unwrap())),
            audit: std::sync::Arc::new(TracingAuditSink),
            events: std::sync::Arc::new(TracingEventBus),
            custom_score_fn: None,
        })
    }

    #[tokio::test]
    async fn flat_recipe_sums_ingredient_quantities_by_multiplier() {
        let d = deductor().await;
        let graph = RecipeGraph {
            recipe_by_menu_item: HashMap::new(),
            ingredients_by_recipe: HashMap::from([(1, vec![ingredient(1, 10, "2.00")])]),
            sub_recipes_by_parent: HashMap::new(),
        };
        let mut required = HashMap::new();
        d.expand_recipe(&graph, 1, "3".parse().unwrap(), 100, &mut HashSet::new(), 0, 5, &mut required);

        let entry = required.get(&10).unwrap();
        assert_eq!(entry.quantity, "6.00".parse().unwrap());
        assert_eq!(entry.contributing_order_items, vec![100]);
    }

    #[tokio::test]
    async fn sub_recipe_multiplier_compounds_into_child_quantities() {
        let d = deductor().await;
        let graph = RecipeGraph {
            recipe_by_menu_item: HashMap::new(),
            ingredients_by_recipe: HashMap::from([(2, vec![ingredient(2, 20, "1.00")])]),
            sub_recipes_by_parent: HashMap::from([(1, vec![sub_recipe(1, 2, "4")])]),
        };
        let mut required = HashMap::new();
        d.expand_recipe(&graph, 1, "2".parse().unwrap(), 100, &mut HashSet::new(), 0, 5, &mut required);

        let entry = required.get(&20).unwrap();
        assert_eq!(entry.quantity, "8.00".parse().unwrap());
    }

    #[tokio::test]
    async fn optional_and_inactive_ingredients_are_skipped() {
        let d = deductor().await;
        let mut optional = ingredient(1, 30, "5.00");
        optional.is_optional = true;
        let mut inactive = ingredient(1, 31, "5.00");
        inactive.is_active = false;
        let graph = RecipeGraph {
            recipe_by_menu_item: HashMap::new(),
            ingredients_by_recipe: HashMap::from([(1, vec![optional, inactive])]),
            sub_recipes_by_parent: HashMap::new(),
        };
        let mut required = HashMap::new();
        d.expand_recipe(&graph, 1, "1".parse().unwrap(), 100, &mut HashSet::new(), 0, 5, &mut required);

        assert!(required.is_empty());
    }

    #[tokio::test]
    async fn max_depth_halts_descent_into_sub_recipes() {
        let d = deductor().await;
        let graph = RecipeGraph {
            recipe_by_menu_item: HashMap::new(),
            ingredients_by_recipe: HashMap::from([(2, vec![ingredient(2, 40, "1.00")])]),
            sub_recipes_by_parent: HashMap::from([(1, vec![sub_recipe(1, 2, "1")])]),
        };
        let mut required = HashMap::new();
        // max_depth=0 means the parent (depth 0) expands but the child
        // branch (depth 1) is past the limit.
        d.expand_recipe(&graph, 1, "1".parse().unwrap(), 100, &mut HashSet::new(), 0, 0, &mut required);

        assert!(required.get(&40).is_none());
    }
}
