//! Pricing Rule Engine (C2) — candidate fetch, condition evaluation,
//! discount computation and conflict resolution (spec.md §4.2).

use chrono::{Datelike, Timelike};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashSet;
use std::time::Instant;

use crate::context::{AuditEntry, CoreContext};
use crate::entity::restaurant::ConflictResolution;
use crate::entity::{
    customer, menu_item, order, order_item, pricing_rule, pricing_rule_application,
    pricing_rule_metric, restaurant,
};
use crate::entity::pricing_rule::RuleType;
use crate::entity::pricing_rule_application::Provenance;
use crate::errors::AppError;
use crate::models::pricing::{
    time_in_range, ApplicationView, DebugTraceEntry, EvaluateResponse, PricingRuleDebugInfo,
    RuleConditions, RuleEvaluationResult, UpsertRuleRequest,
};

pub struct PricingEngine {
    ctx: CoreContext,
}

struct OrderContext {
    order: order::Model,
    items: Vec<order_item::Model>,
    menu_items: Vec<menu_item::Model>,
    customer: Option<customer::Model>,
}

impl PricingEngine {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Structural validity check against the JSON-Schema shape of spec.md
    /// §6; does not touch the database.
    pub fn validate(&self, conditions: &serde_json::Value, _rule_type: RuleType) -> Result<(), AppError> {
        let parsed: RuleConditions = serde_json::from_value(conditions.clone())
            .map_err(|e| AppError::InvalidConditions(e.to_string()))?;
        parsed
            .validate()
            .map_err(AppError::InvalidConditions)
    }

    /// `evaluate(order, debug?)`, spec.md §4.2.
    pub async fn evaluate(
        &self,
        order_id: i64,
        debug: bool,
    ) -> Result<EvaluateResponse, AppError> {
        let started = Instant::now();
        let order_ctx = self.load_order_context(order_id).await?;

        let restaurant = restaurant::Entity::find_by_id(order_ctx.order.restaurant_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("restaurant".into()))?;

        let now = self.ctx.now();

        let candidates = pricing_rule::Entity::find()
            .filter(pricing_rule::Column::RestaurantId.eq(order_ctx.order.restaurant_id))
            .filter(pricing_rule::Column::Status.eq(crate::entity::pricing_rule::RuleStatus::Active))
            .order_by_asc(pricing_rule::Column::Priority)
            .all(&self.ctx.db)
            .await?;

        let mut results = Vec::new();
        let mut traces = Vec::new();

        for rule in &candidates {
            if !rule.is_effective(now) {
                continue;
            }

            let result = match self.evaluate_rule(rule, &order_ctx, now) {
                Ok(r) => r,
                Err(e) => RuleEvaluationResult {
                    rule_id: rule.rule_id.clone(),
                    rule_name: rule.name.clone(),
                    priority: rule.priority,
                    stackable: rule.stackable,
                    applicable: false,
                    conditions_met: serde_json::Value::Null,
                    skip_reason: Some(format!("Evaluation error: {}", e)),
                    discount_amount: Decimal::ZERO,
                    excluded_rule_ids: rule.excluded_ids(),
                },
            };

            if debug {
                traces.push(DebugTraceEntry {
                    kind: "RULE_EVALUATED".into(),
                    message: format!("rule {} evaluated", rule.rule_id),
                    detail: serde_json::json!({
                        "applicable": result.applicable,
                        "conditions_met": result.conditions_met,
                        "skip_reason": result.skip_reason,
                    }),
                });
            }

            results.push(result);
        }

        let applicable: Vec<RuleEvaluationResult> =
            results.iter().filter(|r| r.applicable).cloned().collect();

        let chosen = self.resolve_conflicts(applicable, restaurant.default_conflict_resolution.clone(), order_ctx.order.subtotal);

        let applications = self
            .apply(&order_ctx.order, &chosen, now)
            .await?;

        let total_discount: Decimal = applications.iter().map(|a| a.discount_amount).sum();

        self.record_metrics(&candidates, &results, &chosen, now).await?;

        let debug_info = debug.then(|| PricingRuleDebugInfo {
            order_id,
            rules_evaluated: results.len(),
            rules_applied: applications.len(),
            total_discount,
            evaluation_results: results,
            debug_traces: traces,
            total_evaluation_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        });

        Ok(EvaluateResponse {
            applications,
            debug: debug_info,
        })
    }

    async fn load_order_context(&self, order_id: i64) -> Result<OrderContext, AppError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("order".into()))?;

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&self.ctx.db)
            .await?;

        let menu_item_ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
        let menu_items = menu_item::Entity::find()
            .filter(menu_item::Column::Id.is_in(menu_item_ids))
            .all(&self.ctx.db)
            .await?;

        let customer = match order.customer_id {
            Some(cid) => customer::Entity::find_by_id(cid).one(&self.ctx.db).await?,
            None => None,
        };

        Ok(OrderContext {
            order,
            items,
            menu_items,
            customer,
        })
    }

    /// Evaluates one rule's conditions, short-circuiting on first failing
    /// section (spec.md §4.2 step 2).
    fn evaluate_rule(
        &self,
        rule: &pricing_rule::Model,
        ctx: &OrderContext,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<RuleEvaluationResult, String> {
        let conditions: RuleConditions = serde_json::from_value(rule.conditions.clone())
            .map_err(|e| e.to_string())?;

        let mut conditions_met = serde_json::Map::new();

        if let Some(time) = &conditions.time {
            let ok = check_time(time, now);
            conditions_met.insert("time".into(), serde_json::Value::Bool(ok));
            if !ok {
                return Ok(skip(rule, conditions_met, "time conditions not met"));
            }
        }

        if let Some(items) = &conditions.items {
            let ok = check_items(items, ctx);
            conditions_met.insert("items".into(), serde_json::Value::Bool(ok));
            if !ok {
                return Ok(skip(rule, conditions_met, "item conditions not met"));
            }
        }

        if let Some(customer_cond) = &conditions.customer {
            let ok = check_customer(customer_cond, ctx);
            conditions_met.insert("customer".into(), serde_json::Value::Bool(ok));
            if !ok {
                return Ok(skip(rule, conditions_met, "customer conditions not met"));
            }
        }

        if let Some(order_cond) = &conditions.order {
            let ok = check_order(order_cond, ctx);
            conditions_met.insert("order".into(), serde_json::Value::Bool(ok));
            if !ok {
                return Ok(skip(rule, conditions_met, "order conditions not met"));
            }
        }

        if ctx.order.subtotal < rule.min_order_amount {
            return Ok(skip(rule, conditions_met, "below min_order_amount"));
        }

        if let Some(max_uses) = rule.max_uses {
            if rule.current_uses >= max_uses {
                return Ok(skip(rule, conditions_met, "usage cap reached"));
            }
        }

        let discount = self.calculate_discount(rule, &conditions, ctx);

        Ok(RuleEvaluationResult {
            rule_id: rule.rule_id.clone(),
            rule_name: rule.name.clone(),
            priority: rule.priority,
            stackable: rule.stackable,
            applicable: true,
            conditions_met: serde_json::Value::Object(conditions_met),
            skip_reason: None,
            discount_amount: discount,
            excluded_rule_ids: rule.excluded_ids(),
        })
    }

    /// Discount computation per rule type, spec.md §4.2 step 3. BOGO,
    /// BUNDLE and QUANTITY have no further sub-schema in the condition
    /// document beyond `items.*`, so they're derived from the matching
    /// order items rather than a separate bundle schema.
    fn calculate_discount(
        &self,
        rule: &pricing_rule::Model,
        conditions: &RuleConditions,
        ctx: &OrderContext,
    ) -> Decimal {
        let subtotal = ctx.order.subtotal;

        match rule.rule_type {
            RuleType::Percentage | RuleType::HappyHour | RuleType::TimeBased | RuleType::Category => {
                let pct = rule.discount_value / Decimal::ONE_HUNDRED;
                let discount = subtotal * pct;
                match rule.max_discount_amount {
                    Some(cap) => discount.min(cap),
                    None => discount,
                }
            }
            RuleType::Fixed => rule.discount_value.min(subtotal),
            RuleType::Bogo => {
                let (matching_qty, matching_subtotal) = matching_items(conditions, ctx);
                if matching_qty.is_zero() {
                    return Decimal::ZERO;
                }
                let pairs = (matching_qty / Decimal::TWO).floor();
                let avg_price = matching_subtotal / matching_qty;
                let discount = pairs * avg_price * (rule.discount_value / Decimal::ONE_HUNDRED);
                discount.min(subtotal)
            }
            RuleType::Bundle => {
                let (_, matching_subtotal) = matching_items(conditions, ctx);
                let discount = matching_subtotal * (rule.discount_value / Decimal::ONE_HUNDRED);
                match rule.max_discount_amount {
                    Some(cap) => discount.min(cap),
                    None => discount,
                }
                .min(subtotal)
            }
            RuleType::Quantity => {
                let (matching_qty, matching_subtotal) = matching_items(conditions, ctx);
                let min_qty = conditions
                    .items
                    .as_ref()
                    .and_then(|i| i.min_quantity)
                    .unwrap_or(Decimal::ZERO);
                let excess = (matching_qty - min_qty).max(Decimal::ZERO);
                if matching_qty.is_zero() || excess.is_zero() {
                    return Decimal::ZERO;
                }
                let avg_price = matching_subtotal / matching_qty;
                (excess * avg_price * (rule.discount_value / Decimal::ONE_HUNDRED)).min(subtotal)
            }
            RuleType::Custom => Decimal::ZERO,
        }
    }

    /// Conflict resolution, spec.md §4.2 step 4.
    fn resolve_conflicts(
        &self,
        applicable: Vec<RuleEvaluationResult>,
        default_resolution: ConflictResolution,
        subtotal: Decimal,
    ) -> Vec<RuleEvaluationResult> {
        let (stackable, non_stackable): (Vec<_>, Vec<_>) =
            applicable.into_iter().partition(|r| r.stackable);

        let mut chosen = Vec::new();

        if !non_stackable.is_empty() {
            match default_resolution {
                ConflictResolution::HighestDiscount => {
                    if let Some(best) = non_stackable
                        .into_iter()
                        .max_by(|a, b| a.discount_amount.cmp(&b.discount_amount))
                    {
                        chosen.push(best);
                    }
                }
                ConflictResolution::FirstMatch => {
                    if let Some(first) = non_stackable.into_iter().next() {
                        chosen.push(first);
                    }
                }
                ConflictResolution::PriorityBased => {
                    if let Some(best) = non_stackable.into_iter().min_by_key(|r| r.priority) {
                        chosen.push(best);
                    }
                }
                ConflictResolution::CombineAdditive => {
                    chosen.extend(non_stackable);
                }
                ConflictResolution::CombineMultiplicative => {
                    let mut remaining = subtotal;
                    let mut ordered = non_stackable;
                    ordered.sort_by_key(|r| r.priority);
                    for mut r in ordered {
                        let compounded = remaining * (r.discount_amount / subtotal.max(Decimal::ONE));
                        remaining = (remaining - compounded).max(Decimal::ZERO);
                        r.discount_amount = compounded;
                        chosen.push(r);
                    }
                }
            }
        }

        // Stackable rules: admitted only if neither side excludes the other,
        // checked against every rule already chosen (the non-stackable
        // winner included). Circular exclusions resolve "first chosen wins"
        // by admission order.
        for candidate in stackable {
            let conflicts = chosen.iter().any(|c| {
                c.excluded_rule_ids.contains(&candidate.rule_id)
                    || candidate.excluded_rule_ids.contains(&c.rule_id)
            });
            if conflicts {
                continue;
            }
            chosen.push(candidate);
        }

        chosen
    }

    /// Inserts application rows and updates the order's running totals
    /// (spec.md §4.2 step 5). Idempotent: application rows key on
    /// `(rule_id, order_id)`, so calling twice for an already-evaluated
    /// order without intervening change is a caller error the unique index
    /// rejects rather than double-applying.
    async fn apply(
        &self,
        order: &order::Model,
        chosen: &[RuleEvaluationResult],
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<ApplicationView>, AppError> {
        if chosen.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.ctx.db.begin().await?;

        let mut views = Vec::with_capacity(chosen.len());
        let mut running_total = order.total;
        let mut running_discount = order.discount_total;

        for result in chosen {
            let original_amount = running_total;
            let final_amount = (running_total - result.discount_amount).max(Decimal::ZERO);

            let application = pricing_rule_application::ActiveModel {
                rule_id: Set(result.rule_id.clone()),
                order_id: Set(order.id),
                customer_id: Set(order.customer_id),
                discount_amount: Set(result.discount_amount),
                original_amount: Set(original_amount),
                final_amount: Set(final_amount),
                conditions_met: Set(result.conditions_met.clone()),
                provenance: Set(Provenance::System),
                created_at: Set(now.fixed_offset()),
                ..Default::default()
            };
            application.insert(&txn).await?;

            if let Some(rule) = pricing_rule::Entity::find_by_id(result.rule_id.clone())
                .one(&txn)
                .await?
            {
                let mut active: pricing_rule::ActiveModel = rule.into();
                let uses = active.current_uses.unwrap();
                active.current_uses = Set(uses + 1);
                active.update(&txn).await?;
            }

            running_discount += result.discount_amount;
            running_total = final_amount;

            views.push(ApplicationView {
                rule_id: result.rule_id.clone(),
                discount_amount: result.discount_amount,
                original_amount,
                final_amount,
            });
        }

        let mut order_active: order::ActiveModel = order.clone().into();
        order_active.discount_total = Set(running_discount);
        order_active.total = Set(running_total);
        order_active.pricing_evaluated = Set(true);
        order_active.updated_at = Set(now.fixed_offset());
        order_active.update(&txn).await?;

        txn.commit().await?;

        Ok(views)
    }

    async fn record_metrics(
        &self,
        candidates: &[pricing_rule::Model],
        results: &[RuleEvaluationResult],
        chosen: &[RuleEvaluationResult],
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError> {
        let today = now.date_naive();
        let chosen_ids: HashSet<&str> = chosen.iter().map(|c| c.rule_id.as_str()).collect();

        for rule in candidates {
            let result = results.iter().find(|r| r.rule_id == rule.rule_id);
            let applied = chosen_ids.contains(rule.rule_id.as_str());

            let existing = pricing_rule_metric::Entity::find()
                .filter(pricing_rule_metric::Column::RuleId.eq(rule.rule_id.clone()))
                .filter(pricing_rule_metric::Column::Date.eq(today))
                .one(&self.ctx.db)
                .await?;

            let discount = chosen
                .iter()
                .find(|c| c.rule_id == rule.rule_id)
                .map(|c| c.discount_amount)
                .unwrap_or(Decimal::ZERO);

            match existing {
                Some(m) => {
                    let mut active: pricing_rule_metric::ActiveModel = m.into();
                    active.evaluated_count = Set(active.evaluated_count.unwrap() + 1);
                    if applied {
                        active.applied_count = Set(active.applied_count.unwrap() + 1);
                    } else if result.map(|r| !r.applicable).unwrap_or(false) {
                        active.skipped_count = Set(active.skipped_count.unwrap() + 1);
                    }
                    active.total_discount = Set(active.total_discount.unwrap() + discount);
                    active.update(&self.ctx.db).await?;
                }
                None => {
                    let active = pricing_rule_metric::ActiveModel {
                        rule_id: Set(rule.rule_id.clone()),
                        date: Set(today),
                        evaluated_count: Set(1),
                        applied_count: Set(if applied { 1 } else { 0 }),
                        skipped_count: Set(if applied { 0 } else { 1 }),
                        conflicts_resolved: Set(0),
                        stacking_count: Set(0),
                        total_discount: Set(discount),
                        distinct_customers: Set(0),
                        ..Default::default()
                    };
                    active.insert(&self.ctx.db).await?;
                }
            }
        }

        Ok(())
    }

    /// Creates a pricing rule definition, spec.md §4.2 "C2 public contract".
    /// Structurally validates `conditions` before writing the row and
    /// records an audit entry.
    pub async fn create_rule(
        &self,
        req: UpsertRuleRequest,
        actor_id: Option<i64>,
    ) -> Result<pricing_rule::Model, AppError> {
        self.validate(&req.conditions, req.rule_type.clone())?;

        let now = self.ctx.now();
        let rule_id = uuid::Uuid::new_v4().to_string();
        let active = pricing_rule::ActiveModel {
            rule_id: Set(rule_id.clone()),
            restaurant_id: Set(req.restaurant_id),
            name: Set(req.name),
            rule_type: Set(req.rule_type),
            status: Set(req.status),
            priority: Set(req.priority),
            discount_value: Set(req.discount_value),
            max_discount_amount: Set(req.max_discount_amount),
            min_order_amount: Set(req.min_order_amount),
            conditions: Set(req.conditions),
            valid_from: Set(req.valid_from.fixed_offset()),
            valid_until: Set(req.valid_until.map(|d| d.fixed_offset())),
            max_uses: Set(req.max_uses),
            current_uses: Set(0),
            max_uses_per_customer: Set(req.max_uses_per_customer),
            stackable: Set(req.stackable),
            excluded_rule_ids: Set(serde_json::json!(req.excluded_rule_ids)),
            conflict_resolution: Set(req.conflict_resolution),
            promo_code: Set(req.promo_code),
            created_at: Set(now.fixed_offset()),
            updated_at: Set(now.fixed_offset()),
        };
        let saved = active.insert(&self.ctx.db).await?;

        self.ctx
            .audit
            .record(AuditEntry {
                actor_id,
                action: "pricing_rule.created".into(),
                entity_kind: "pricing_rule".into(),
                entity_id: rule_id,
                detail: serde_json::json!({ "name": saved.name, "rule_type": saved.rule_type }),
            })
            .await;

        Ok(saved)
    }

    /// Updates a pricing rule definition in place. Re-validates
    /// `conditions` and records an audit entry; `current_uses` is not
    /// caller-settable through this path.
    pub async fn update_rule(
        &self,
        rule_id: &str,
        req: UpsertRuleRequest,
        actor_id: Option<i64>,
    ) -> Result<pricing_rule::Model, AppError> {
        self.validate(&req.conditions, req.rule_type.clone())?;

        let existing = pricing_rule::Entity::find_by_id(rule_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("pricing rule".into()))?;

        let mut active: pricing_rule::ActiveModel = existing.into();
        active.restaurant_id = Set(req.restaurant_id);
        active.name = Set(req.name);
        active.rule_type = Set(req.rule_type);
        active.status = Set(req.status);
        active.priority = Set(req.priority);
        active.discount_value = Set(req.discount_value);
        active.max_discount_amount = Set(req.max_discount_amount);
        active.min_order_amount = Set(req.min_order_amount);
        active.conditions = Set(req.conditions);
        active.valid_from = Set(req.valid_from.fixed_offset());
        active.valid_until = Set(req.valid_until.map(|d| d.fixed_offset()));
        active.max_uses = Set(req.max_uses);
        active.max_uses_per_customer = Set(req.max_uses_per_customer);
        active.stackable = Set(req.stackable);
        active.excluded_rule_ids = Set(serde_json::json!(req.excluded_rule_ids));
        active.conflict_resolution = Set(req.conflict_resolution);
        active.promo_code = Set(req.promo_code);
        active.updated_at = Set(self.ctx.now().fixed_offset());

        let saved = active.update(&self.ctx.db).await?;

        self.ctx
            .audit
            .record(AuditEntry {
                actor_id,
                action: "pricing_rule.updated".into(),
                entity_kind: "pricing_rule".into(),
                entity_id: rule_id.to_string(),
                detail: serde_json::json!({ "name": saved.name }),
            })
            .await;

        Ok(saved)
    }

    pub async fn get_rule(&self, rule_id: &str) -> Result<pricing_rule::Model, AppError> {
        pricing_rule::Entity::find_by_id(rule_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("pricing rule".into()))
    }

    pub async fn list_rules(&self, restaurant_id: i64) -> Result<Vec<pricing_rule::Model>, AppError> {
        let rules = pricing_rule::Entity::find()
            .filter(pricing_rule::Column::RestaurantId.eq(restaurant_id))
            .order_by_asc(pricing_rule::Column::Priority)
            .all(&self.ctx.db)
            .await?;
        Ok(rules)
    }

    /// Hourly maintenance worker: expire rules past `valid_until`.
    pub async fn expire_stale_rules(&self) -> Result<u64, AppError> {
        let now = self.ctx.now();
        let stale = pricing_rule::Entity::find()
            .filter(pricing_rule::Column::Status.eq(crate::entity::pricing_rule::RuleStatus::Active))
            .filter(pricing_rule::Column::ValidUntil.lt(now.fixed_offset()))
            .all(&self.ctx.db)
            .await?;

        let count = stale.len() as u64;
        for rule in stale {
            let mut active: pricing_rule::ActiveModel = rule.into();
            active.status = Set(crate::entity::pricing_rule::RuleStatus::Expired);
            active.update(&self.ctx.db).await?;
        }
        Ok(count)
    }

    /// Daily maintenance task: purge metric rows older than 90 days.
    pub async fn purge_old_metrics(&self) -> Result<u64, AppError> {
        let cutoff = (self.ctx.now() - chrono::Duration::days(90)).date_naive();
        let res = pricing_rule_metric::Entity::delete_many()
            .filter(pricing_rule_metric::Column::Date.lt(cutoff))
            .exec(&self.ctx.db)
            .await?;
        Ok(res.rows_affected)
    }
}

fn skip(
    rule: &pricing_rule::Model,
    conditions_met: serde_json::Map<String, serde_json::Value>,
    reason: &str,
) -> RuleEvaluationResult {
    RuleEvaluationResult {
        rule_id: rule.rule_id.clone(),
        rule_name: rule.name.clone(),
        priority: rule.priority,
        stackable: rule.stackable,
        applicable: false,
        conditions_met: serde_json::Value::Object(conditions_met),
        skip_reason: Some(reason.to_string()),
        discount_amount: Decimal::ZERO,
        excluded_rule_ids: rule.excluded_ids(),
    }
}

fn check_time(time: &crate::models::pricing::TimeConditions, now: chrono::DateTime<chrono::Utc>) -> bool {
    if let Some(days) = &time.days_of_week {
        let weekday = now.weekday().num_days_from_monday() as u8;
        if !days.contains(&weekday) {
            return false;
        }
    }
    if let (Some(start), Some(end)) = (&time.start_time, &time.end_time) {
        if let (Some(start_min), Some(end_min)) =
            (crate::models::pricing::parse_hhmm(start), crate::models::pricing::parse_hhmm(end))
        {
            let minutes_of_day = now.hour() * 60 + now.minute();
            if !time_in_range(minutes_of_day, start_min, end_min) {
                return false;
            }
        }
    }
    if let Some(ranges) = &time.date_ranges {
        let today = now.date_naive();
        if !ranges.iter().any(|(start, end)| today >= *start && today <= *end) {
            return false;
        }
    }
    true
}

fn check_items(items: &crate::models::pricing::ItemConditions, ctx: &OrderContext) -> bool {
    if let Some(ids) = &items.menu_item_ids {
        let has_match = ctx.items.iter().any(|i| ids.contains(&i.menu_item_id));
        if !has_match {
            return false;
        }
    }
    if let Some(category_ids) = &items.category_ids {
        let matching_categories: HashSet<&str> = ctx
            .menu_items
            .iter()
            .filter_map(|m| m.category_id.as_deref())
            .collect();
        if !category_ids.iter().any(|c| matching_categories.contains(c.as_str())) {
            return false;
        }
    }
    if let Some(exclude) = &items.exclude_item_ids {
        if ctx.items.iter().any(|i| exclude.contains(&i.menu_item_id)) {
            return false;
        }
    }
    let (matching_qty, _) = matching_items(
        &RuleConditions {
            items: Some(items.clone()),
            ..Default::default()
        },
        ctx,
    );
    if let Some(min) = items.min_quantity {
        if matching_qty < min {
            return false;
        }
    }
    if let Some(max) = items.max_quantity {
        if matching_qty > max {
            return false;
        }
    }
    true
}

fn check_customer(cond: &crate::models::pricing::CustomerConditions, ctx: &OrderContext) -> bool {
    let Some(customer) = &ctx.customer else {
        // No customer on the order: any condition referencing customer
        // state fails closed.
        return cond.loyalty_tier.is_none()
            && cond.min_orders.is_none()
            && cond.tags.is_none()
            && cond.new_customer.is_none()
            && cond.birthday_month.is_none();
    };

    if let Some(tiers) = &cond.loyalty_tier {
        let tier = customer.loyalty_tier.as_deref().unwrap_or("");
        if !tiers.iter().any(|t| t == tier) {
            return false;
        }
    }
    if cond.new_customer == Some(true) {
        if !customer.is_new_customer() {
            return false;
        }
    } else if let Some(min_orders) = cond.min_orders {
        if customer.orders_count < min_orders {
            return false;
        }
    }
    if let Some(tags) = &cond.tags {
        let customer_tags = customer.tags();
        if !tags.iter().any(|t| customer_tags.contains(&t.as_str())) {
            return false;
        }
    }
    if let Some(month) = cond.birthday_month {
        if customer.birthday_month != Some(month) {
            return false;
        }
    }
    true
}

fn check_order(cond: &crate::models::pricing::OrderConditions, ctx: &OrderContext) -> bool {
    let item_count = ctx.items.len() as i32;
    if let Some(min) = cond.min_items {
        if item_count < min {
            return false;
        }
    }
    if let Some(max) = cond.max_items {
        if item_count > max {
            return false;
        }
    }
    if let Some(methods) = &cond.payment_methods {
        let method = ctx.order.payment_method.as_deref().unwrap_or("");
        if !methods.iter().any(|m| m == method) {
            return false;
        }
    }
    if let Some(types) = &cond.order_types {
        let order_type = ctx.order.order_type.as_deref().unwrap_or("");
        if !types.iter().any(|t| t == order_type) {
            return false;
        }
    }
    if let Some(channels) = &cond.channels {
        let channel = ctx.order.channel.as_deref().unwrap_or("");
        if !channels.iter().any(|c| c == channel) {
            return false;
        }
    }
    if let Some(min) = cond.min_subtotal {
        if ctx.order.subtotal < min {
            return false;
        }
    }
    if let Some(max) = cond.max_subtotal {
        if ctx.order.subtotal > max {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CoreContext, FixedClock};
    use crate::entity::pricing_rule::RuleStatus;
    use crate::entity::restaurant::ConflictResolution;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn sample_order(subtotal: &str) -> order::Model {
        order::Model {
            id: 1,
            restaurant_id: 1,
            customer_id: None,
            status: crate::entity::order::OrderStatus::Pending,
            channel: Some("dine_in".into()),
            order_type: Some("standard".into()),
            payment_method: Some("card".into()),
            special_instructions: None,
            party_size: 2,
            subtotal: Decimal::from_str(subtotal).unwrap(),
            discount_total: Decimal::ZERO,
            total: Decimal::from_str(subtotal).unwrap(),
            promised_at: None,
            pricing_evaluated: false,
            created_at: Utc.timestamp_opt(0, 0).unwrap().fixed_offset(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap().fixed_offset(),
        }
    }

    fn sample_item(menu_item_id: i64, quantity: &str, unit_price: &str) -> order_item::Model {
        order_item::Model {
            id: menu_item_id,
            order_id: 1,
            menu_item_id,
            quantity: Decimal::from_str(quantity).unwrap(),
            unit_price: Decimal::from_str(unit_price).unwrap(),
        }
    }

    fn sample_rule(rule_type: RuleType, discount_value: &str) -> pricing_rule::Model {
        let now = Utc.timestamp_opt(0, 0).unwrap().fixed_offset();
        pricing_rule::Model {
            rule_id: "rule-1".into(),
            restaurant_id: 1,
            name: "Test Rule".into(),
            rule_type,
            status: RuleStatus::Active,
            priority: 1,
            discount_value: Decimal::from_str(discount_value).unwrap(),
            max_discount_amount: None,
            min_order_amount: Decimal::ZERO,
            conditions: serde_json::json!({}),
            valid_from: now,
            valid_until: None,
            max_uses: None,
            current_uses: 0,
            max_uses_per_customer: None,
            stackable: false,
            excluded_rule_ids: serde_json::json!([]),
            conflict_resolution: None,
            promo_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_ctx() -> CoreContext {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        CoreContext {
            db,
            clock: std::sync::Arc::new(FixedClock(Utc.timestamp_opt(0, 0).unwrap())),
            audit: std::sync::Arc::new(crate::context::TracingAuditSink),
            events: std::sync::Arc::new(crate::context::TracingEventBus),
            custom_score_fn: None,
        }
    }

    #[tokio::test]
    async fn percentage_discount_applies_the_configured_rate() {
        let engine = PricingEngine::new(test_ctx().await);
        let order = sample_order("100.00");
        let ctx = OrderContext {
            order: order.clone(),
            items: vec![sample_item(1, "2", "50.00")],
            menu_items: Vec::new(),
            customer: None,
        };
        let rule = sample_rule(RuleType::Percentage, "10");
        let conditions = RuleConditions::default();
        let discount = engine.calculate_discount(&rule, &conditions, &ctx);
        assert_eq!(discount, Decimal::from_str("10.00").unwrap());
    }

    #[tokio::test]
    async fn percentage_discount_respects_max_discount_cap() {
        let engine = PricingEngine::new(test_ctx().await);
        let order = sample_order("1000.00");
        let mut rule = sample_rule(RuleType::Percentage, "50");
        rule.max_discount_amount = Some(Decimal::from_str("20.00").unwrap());
        let ctx = OrderContext {
            order,
            items: Vec::new(),
            menu_items: Vec::new(),
            customer: None,
        };
        let discount = engine.calculate_discount(&rule, &RuleConditions::default(), &ctx);
        assert_eq!(discount, Decimal::from_str("20.00").unwrap());
    }

    #[tokio::test]
    async fn fixed_discount_never_exceeds_subtotal() {
        let engine = PricingEngine::new(test_ctx().await);
        let order = sample_order("5.00");
        let rule = sample_rule(RuleType::Fixed, "50.00");
        let ctx = OrderContext {
            order,
            items: Vec::new(),
            menu_items: Vec::new(),
            customer: None,
        };
        let discount = engine.calculate_discount(&rule, &RuleConditions::default(), &ctx);
        assert_eq!(discount, Decimal::from_str("5.00").unwrap());
    }

    #[tokio::test]
    async fn bogo_discounts_half_of_matching_pairs() {
        let engine = PricingEngine::new(test_ctx().await);
        let order = sample_order("40.00");
        let ctx = OrderContext {
            order,
            items: vec![sample_item(1, "4", "10.00")],
            menu_items: Vec::new(),
            customer: None,
        };
        let rule = sample_rule(RuleType::Bogo, "100");
        let discount = engine.calculate_discount(&rule, &RuleConditions::default(), &ctx);
        // 4 items -> 2 pairs, one item per pair free at 100% of avg price (10.00).
        assert_eq!(discount, Decimal::from_str("20.00").unwrap());
    }

    #[tokio::test]
    async fn highest_discount_resolution_keeps_the_single_best_non_stackable_rule() {
        let engine = PricingEngine::new(test_ctx().await);
        let low = RuleEvaluationResult {
            rule_id: "low".into(),
            rule_name: "Low".into(),
            priority: 1,
            stackable: false,
            applicable: true,
            conditions_met: serde_json::Value::Null,
            skip_reason: None,
            discount_amount: Decimal::from_str("5.00").unwrap(),
            excluded_rule_ids: Vec::new(),
        };
        let high = RuleEvaluationResult {
            rule_id: "high".into(),
            discount_amount: Decimal::from_str("15.00").unwrap(),
            ..low.clone()
        };
        let chosen = engine.resolve_conflicts(
            vec![low, high],
            ConflictResolution::HighestDiscount,
            Decimal::from_str("100.00").unwrap(),
        );
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].rule_id, "high");
    }

    #[tokio::test]
    async fn combine_additive_keeps_every_non_stackable_rule() {
        let engine = PricingEngine::new(test_ctx().await);
        let a = RuleEvaluationResult {
            rule_id: "a".into(),
            rule_name: "A".into(),
            priority: 1,
            stackable: false,
            applicable: true,
            conditions_met: serde_json::Value::Null,
            skip_reason: None,
            discount_amount: Decimal::from_str("5.00").unwrap(),
            excluded_rule_ids: Vec::new(),
        };
        let b = RuleEvaluationResult {
            rule_id: "b".into(),
            ..a.clone()
        };
        let chosen = engine.resolve_conflicts(
            vec![a, b],
            ConflictResolution::CombineAdditive,
            Decimal::from_str("100.00").unwrap(),
        );
        assert_eq!(chosen.len(), 2);
    }

    #[tokio::test]
    async fn mutual_exclusion_drops_the_excluded_stackable_rule() {
        let engine = PricingEngine::new(test_ctx().await);
        let a = RuleEvaluationResult {
            rule_id: "a".into(),
            rule_name: "A".into(),
            priority: 1,
            stackable: true,
            applicable: true,
            conditions_met: serde_json::Value::Null,
            skip_reason: None,
            discount_amount: Decimal::from_str("5.00").unwrap(),
            excluded_rule_ids: vec!["b".into()],
        };
        let b = RuleEvaluationResult {
            rule_id: "b".into(),
            excluded_rule_ids: Vec::new(),
            ..a.clone()
        };
        let chosen = engine.resolve_conflicts(
            vec![a, b],
            ConflictResolution::CombineAdditive,
            Decimal::from_str("100.00").unwrap(),
        );
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].rule_id, "a");
    }

    #[test]
    fn check_order_rejects_wrong_payment_method() {
        let order = sample_order("50.00");
        let ctx = OrderContext {
            order,
            items: Vec::new(),
            menu_items: Vec::new(),
            customer: None,
        };
        let cond = crate::models::pricing::OrderConditions {
            payment_methods: Some(vec!["cash".into()]),
            ..Default::default()
        };
        assert!(!check_order(&cond, &ctx));
    }

    #[test]
    fn check_customer_fails_closed_without_a_customer_on_the_order() {
        let order = sample_order("50.00");
        let ctx = OrderContext {
            order,
            items: Vec::new(),
            menu_items: Vec::new(),
            customer: None,
        };
        let cond = crate::models::pricing::CustomerConditions {
            loyalty_tier: Some(vec!["gold".into()]),
            ..Default::default()
        };
        assert!(!check_customer(&cond, &ctx));

        let empty_cond = crate::models::pricing::CustomerConditions::default();
        assert!(check_customer(&empty_cond, &ctx));
    }

    #[test]
    fn matching_items_sums_only_selected_menu_items() {
        let order = sample_order("0.00");
        let ctx = OrderContext {
            order,
            items: vec![sample_item(1, "2", "10.00"), sample_item(2, "3", "5.00")],
            menu_items: Vec::new(),
            customer: None,
        };
        let conditions = RuleConditions {
            items: Some(crate::models::pricing::ItemConditions {
                menu_item_ids: Some(vec![1]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let (qty, subtotal) = matching_items(&conditions, &ctx);
        assert_eq!(qty, Decimal::from_str("2").unwrap());
        assert_eq!(subtotal, Decimal::from_str("20.00").unwrap());
    }
}

/// Sums quantity and subtotal contribution of order items matching the
/// rule's `items.*` selector (or all items when the rule has none).
fn matching_items(conditions: &RuleConditions, ctx: &OrderContext) -> (Decimal, Decimal) {
    let Some(items_cond) = &conditions.items else {
        let qty: Decimal = ctx.items.iter().map(|i| i.quantity).sum();
        let subtotal: Decimal = ctx.items.iter().map(|i| i.quantity * i.unit_price).sum();
        return (qty, subtotal);
    };

    let mut qty = Decimal::ZERO;
    let mut subtotal = Decimal::ZERO;
    for item in &ctx.items {
        if let Some(ids) = &items_cond.menu_item_ids {
            if !ids.contains(&item.menu_item_id) {
                continue;
            }
        }
        if let Some(exclude) = &items_cond.exclude_item_ids {
            if exclude.contains(&item.menu_item_id) {
                continue;
            }
        }
        qty += item.quantity;
        subtotal += item.quantity * item.unit_price;
    }
    (qty, subtotal)
}
