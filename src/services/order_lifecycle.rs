//! Order Lifecycle Controller (C5) — drives the composition of the pricing
//! engine and inventory deductor across order status transitions (spec.md
//! §4.5).

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::context::{AuditEntry, CoreContext};
use crate::entity::order::OrderStatus;
use crate::entity::{order, order_item, restaurant};
use crate::errors::AppError;
use crate::models::inventory::OrderItemQty;
use crate::models::order::{CreateOrderRequest, TransitionResult};
use crate::services::pricing_engine::PricingEngine;
use crate::services::recipe_inventory::RecipeInventoryDeductor;

pub struct OrderLifecycleController {
    ctx: CoreContext,
}

impl OrderLifecycleController {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<order::Model, AppError> {
        let now = self.ctx.now();

        let menu_item_ids: Vec<i64> = req.items.iter().map(|i| i.menu_item_id).collect();
        let menu_items = crate::entity::menu_item::Entity::find()
            .filter(crate::entity::menu_item::Column::Id.is_in(menu_item_ids))
            .all(&self.ctx.db)
            .await?;

        let subtotal: rust_decimal::Decimal = req
            .items
            .iter()
            .filter_map(|item| {
                menu_items
                    .iter()
                    .find(|m| m.id == item.menu_item_id)
                    .map(|m| m.price * item.quantity)
            })
            .sum();

        let order = order::ActiveModel {
            restaurant_id: Set(req.restaurant_id),
            customer_id: Set(req.customer_id),
            status: Set(OrderStatus::Pending),
            channel: Set(Some(req.channel.clone())),
            order_type: Set(Some(req.order_type.clone())),
            payment_method: Set(Some(req.payment_method.clone())),
            special_instructions: Set(req.special_instructions.clone()),
            party_size: Set(1),
            subtotal: Set(subtotal),
            discount_total: Set(rust_decimal::Decimal::ZERO),
            total: Set(subtotal),
            promised_at: Set(None),
            pricing_evaluated: Set(false),
            created_at: Set(now.fixed_offset()),
            updated_at: Set(now.fixed_offset()),
            ..Default::default()
        };
        let saved = order.insert(&self.ctx.db).await?;

        for item in &req.items {
            let price = menu_items
                .iter()
                .find(|m| m.id == item.menu_item_id)
                .map(|m| m.price)
                .unwrap_or_default();
            let order_item = order_item::ActiveModel {
                order_id: Set(saved.id),
                menu_item_id: Set(item.menu_item_id),
                quantity: Set(item.quantity),
                unit_price: Set(price),
                ..Default::default()
            };
            order_item.insert(&self.ctx.db).await?;
        }

        Ok(saved)
    }

    /// Drives one status transition request through the composition,
    /// spec.md §4.5 steps 1-5.
    pub async fn transition(
        &self,
        order_id: i64,
        target_status: OrderStatus,
        actor_id: Option<i64>,
        reason: Option<String>,
    ) -> Result<TransitionResult, AppError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("order".into()))?;

        if !order.status.can_transition_to(&target_status) {
            return Err(AppError::InvalidTransition {
                from: format!("{:?}", order.status),
                to: format!("{:?}", target_status),
            });
        }

        let restaurant = restaurant::Entity::find_by_id(order.restaurant_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("restaurant".into()))?;

        let deduction_trigger = if restaurant.deduct_on_completion {
            OrderStatus::Completed
        } else {
            OrderStatus::InProgress
        };

        if target_status == deduction_trigger {
            self.run_pricing_and_deduction(&order, &restaurant).await?;
        }

        if target_status == OrderStatus::Cancelled && restaurant.auto_reverse_on_cancellation {
            let deductor = RecipeInventoryDeductor::new(self.ctx.clone());
            deductor
                .reverse_for_order(
                    order_id,
                    actor_id,
                    reason.clone().unwrap_or_else(|| "order cancelled".into()),
                    false,
                )
                .await?;
        }

        let old_status = order.status.clone();
        let mut active: order::ActiveModel = order.into();
        active.status = Set(target_status.clone());
        active.updated_at = Set(self.ctx.now().fixed_offset());
        active.update(&self.ctx.db).await?;

        self.ctx
            .audit
            .record(AuditEntry {
                actor_id,
                action: "order.status_transition".into(),
                entity_kind: "order".into(),
                entity_id: order_id.to_string(),
                detail: serde_json::json!({
                    "from": format!("{:?}", old_status),
                    "to": format!("{:?}", target_status),
                    "reason": reason,
                }),
            })
            .await;

        Ok(TransitionResult {
            order_id,
            from_status: format!("{:?}", old_status),
            to_status: format!("{:?}", target_status),
        })
    }

    /// Step 2: evaluate pricing (if not yet applied) then deduct inventory.
    /// Both must succeed or the transition is refused entirely.
    async fn run_pricing_and_deduction(
        &self,
        order: &order::Model,
        _restaurant: &restaurant::Model,
    ) -> Result<(), AppError> {
        if !order.pricing_evaluated {
            let pricing = PricingEngine::new(self.ctx.clone());
            pricing.evaluate(order.id, false).await?;
        }

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(&self.ctx.db)
            .await?;

        let order_items: Vec<OrderItemQty> = items
            .iter()
            .map(|i| OrderItemQty {
                menu_item_id: i.menu_item_id,
                quantity: i.quantity,
            })
            .collect();

        let deductor = RecipeInventoryDeductor::new(self.ctx.clone());
        deductor
            .deduct_for_order(order.restaurant_id, &order_items, order.id, None)
            .await?;

        Ok(())
    }
}
