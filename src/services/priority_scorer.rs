//! Priority Scorer (C3) — turns a queue item's order/customer/queue state
//! into a weighted `OrderPriorityScore`, per the rule → profile →
//! queue-config layering of spec.md §4.3.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;

use crate::context::CoreContext;
use crate::entity::{
    customer, menu_item, order, order_item, order_priority_score, priority_profile,
    priority_profile_rule, priority_rule, queue_item, queue_priority_config,
};
use crate::errors::AppError;
use crate::models::priority::{apply_curve, ScoreComponent, ScoreConfig};

pub struct PriorityScorer {
    ctx: CoreContext,
}

struct ScoredOrder {
    order: order::Model,
    customer: Option<customer::Model>,
    items: Vec<order_item::Model>,
    complexity_by_menu_item: HashMap<i64, f64>,
}

impl PriorityScorer {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// `computeScore(order_id, queue_id, profile_override?)`, spec.md §4.3.
    pub async fn compute_score(
        &self,
        order_id: i64,
        queue_item_id: i64,
        profile_override: Option<i64>,
    ) -> Result<order_priority_score::Model, AppError> {
        let item = queue_item::Entity::find_by_id(queue_item_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue item".into()))?;

        let config = queue_priority_config::Entity::find()
            .filter(queue_priority_config::Column::QueueId.eq(item.queue_id))
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue priority config".into()))?;

        let profile_id = profile_override.unwrap_or(config.profile_id);
        let profile = priority_profile::Entity::find_by_id(profile_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("priority profile".into()))?;

        let bindings = priority_profile_rule::Entity::find()
            .filter(priority_profile_rule::Column::ProfileId.eq(profile_id))
            .all(&self.ctx.db)
            .await?;

        let rule_ids: Vec<i64> = bindings.iter().map(|b| b.rule_id).collect();
        let rules: HashMap<i64, priority_rule::Model> = priority_rule::Entity::find()
            .filter(priority_rule::Column::Id.is_in(rule_ids))
            .all(&self.ctx.db)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let scored = self.load_scored_order(order_id).await?;

        let mut components = Vec::new();
        let mut weighted_values = Vec::new();
        let now = self.ctx.now();

        for binding in &bindings {
            let Some(rule) = rules.get(&binding.rule_id) else {
                continue;
            };
            if !rule.is_active {
                continue;
            }

            let weight = binding.weight_override.unwrap_or(rule.default_weight);

            let (base_value, mut score) = match self.base_value(rule, &item, &scored, &config, now) {
                Ok(value) => (value, self.score_rule(rule, value)),
                Err(e) if binding.required => return Err(e),
                Err(_) => (0.0, binding.fallback_score.unwrap_or(0.0)),
            };

            if let (Some(min), Some(max)) = (binding.min_threshold, binding.max_threshold) {
                if base_value < min || base_value > max {
                    score = binding.fallback_score.unwrap_or(score);
                }
            }

            let weighted_score = score * weight;
            components.push(ScoreComponent {
                rule_name: rule.name.clone(),
                base_value,
                raw_score: score,
                weighted_score,
            });
            weighted_values.push((weighted_score, weight));
        }

        let base = self.aggregate(&profile, &weighted_values);

        let (boost, is_boosted) = self.boost_overlay(&config, &scored, now);

        let mut total = base + boost;
        if profile.total_weight_normalization {
            let weight_sum: f64 = weighted_values.iter().map(|(_, w)| w).sum();
            if weight_sum > 0.0 {
                total = (base / weight_sum) + boost;
            }
        }

        if self.is_peak_hour(&config, now) {
            total *= config.peak_multiplier;
        }

        let total = total.clamp(profile.min_total_score, profile.max_total_score);

        let boost_expires_at = if is_boosted {
            Some((now + chrono::Duration::seconds(config.boost_duration_seconds)).fixed_offset())
        } else {
            None
        };

        let existing = order_priority_score::Entity::find()
            .filter(order_priority_score::Column::QueueItemId.eq(queue_item_id))
            .one(&self.ctx.db)
            .await?;

        let components_json = serde_json::to_value(&components).unwrap_or_default();

        let saved = if let Some(existing) = existing {
            let mut active: order_priority_score::ActiveModel = existing.into();
            active.profile_id = Set(profile_id);
            active.total = Set(total);
            active.base = Set(base);
            active.boost = Set(boost);
            active.components = Set(components_json);
            active.calculated_at = Set(now.fixed_offset());
            active.is_boosted = Set(is_boosted);
            active.boost_expires_at = Set(boost_expires_at);
            active.update(&self.ctx.db).await?
        } else {
            let active = order_priority_score::ActiveModel {
                queue_item_id: Set(queue_item_id),
                profile_id: Set(profile_id),
                total: Set(total),
                base: Set(base),
                boost: Set(boost),
                components: Set(components_json),
                calculated_at: Set(now.fixed_offset()),
                is_boosted: Set(is_boosted),
                boost_expires_at: Set(boost_expires_at),
                suggested_sequence: Set(None),
                ..Default::default()
            };
            active.insert(&self.ctx.db).await?
        };

        Ok(saved)
    }

    /// `computeBulk(queue_id, order_ids?)` — recompute every live item in a
    /// queue, then derive `suggested_sequence` by scanning scores descending.
    pub async fn compute_bulk(
        &self,
        queue_id: i64,
        order_ids: Option<Vec<i64>>,
    ) -> Result<Vec<order_priority_score::Model>, AppError> {
        let mut items_query = queue_item::Entity::find()
            .filter(queue_item::Column::QueueId.eq(queue_id));
        if let Some(ids) = &order_ids {
            items_query = items_query.filter(queue_item::Column::OrderId.is_in(ids.clone()));
        }
        let items = items_query.all(&self.ctx.db).await?;

        let mut scores = Vec::with_capacity(items.len());
        for item in &items {
            if !item.status.is_live() {
                continue;
            }
            let score = self.compute_score(item.order_id, item.id, None).await?;
            scores.push(score);
        }

        scores.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap());
        for (idx, score) in scores.iter_mut().enumerate() {
            let seq = (idx as i32) + 1;
            let mut active: order_priority_score::ActiveModel = score.clone().into();
            active.suggested_sequence = Set(Some(seq));
            *score = active.update(&self.ctx.db).await?;
        }

        Ok(scores)
    }

    async fn load_scored_order(&self, order_id: i64) -> Result<ScoredOrder, AppError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("order".into()))?;

        let customer = match order.customer_id {
            Some(cid) => customer::Entity::find_by_id(cid).one(&self.ctx.db).await?,
            None => None,
        };

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&self.ctx.db)
            .await?;

        let menu_item_ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
        let complexity_by_menu_item: HashMap<i64, f64> = menu_item::Entity::find()
            .filter(menu_item::Column::Id.is_in(menu_item_ids))
            .all(&self.ctx.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.complexity_score.to_f64().unwrap_or(1.0)))
            .collect();

        Ok(ScoredOrder {
            order,
            customer,
            items,
            complexity_by_menu_item,
        })
    }

    fn base_value(
        &self,
        rule: &priority_rule::Model,
        item: &queue_item::Model,
        scored: &ScoredOrder,
        config: &queue_priority_config::Model,
        now: chrono::DateTime<Utc>,
    ) -> Result<f64, AppError> {
        use crate::entity::priority_rule::ScoreType::*;

        let value = match rule.score_type {
            WaitTime => (now - item.queued_at).num_seconds() as f64 / 60.0,
            OrderValue => scored.order.total.to_f64().unwrap_or(0.0),
            Vip => scored
                .customer
                .as_ref()
                .map(|c| if c.is_vip { 1.0 } else { 0.0 })
                .unwrap_or(0.0),
            DeliveryTime => scored
                .order
                .promised_at
                .map(|p| ((p - now.fixed_offset()).num_seconds() as f64 / 60.0).max(0.0))
                .unwrap_or(0.0),
            PrepComplexity => scored
                .items
                .iter()
                .map(|i| {
                    let complexity = scored
                        .complexity_by_menu_item
                        .get(&i.menu_item_id)
                        .copied()
                        .unwrap_or(1.0);
                    i.quantity.to_f64().unwrap_or(0.0) * complexity
                })
                .sum(),
            Loyalty => scored
                .customer
                .as_ref()
                .map(|c| c.loyalty_points as f64)
                .unwrap_or(0.0),
            PeakHours => {
                if self.is_peak_hour(config, now) {
                    1.0
                } else {
                    0.0
                }
            }
            GroupSize => scored.order.party_size as f64,
            SpecialNeeds => {
                let config: ScoreConfig = serde_json::from_value(rule.score_config.clone())
                    .map_err(|e| AppError::RuleEvalError(e.to_string()))?;
                let keywords = config.keywords.unwrap_or_default();
                crate::models::priority::count_keyword_hits(
                    scored.order.special_instructions.as_deref(),
                    &keywords,
                )
            }
            Custom => {
                let config: ScoreConfig = serde_json::from_value(rule.score_config.clone())
                    .map_err(|e| AppError::RuleEvalError(e.to_string()))?;
                match &self.ctx.custom_score_fn {
                    Some(hook) => hook(0.0, &rule.score_config),
                    None => config.default_score.unwrap_or(0.0),
                }
            }
        };

        Ok(value)
    }

    fn score_rule(&self, rule: &priority_rule::Model, base_value: f64) -> f64 {
        let config: ScoreConfig = serde_json::from_value(rule.score_config.clone())
            .unwrap_or_default();
        let raw = apply_curve(base_value, &config);
        raw.clamp(rule.min_score, rule.max_score)
    }

    fn aggregate(&self, profile: &priority_profile::Model, values: &[(f64, f64)]) -> f64 {
        use crate::entity::priority_profile::AggregationMethod::*;

        if values.is_empty() {
            return 0.0;
        }
        let scores: Vec<f64> = values.iter().map(|(s, _)| *s).collect();

        match profile.aggregation_method {
            WeightedSum => scores.iter().sum(),
            Max => scores.iter().cloned().fold(f64::MIN, f64::max),
            Min => scores.iter().cloned().fold(f64::MAX, f64::min),
            Average => scores.iter().sum::<f64>() / scores.len() as f64,
            Multiply => scores.iter().product(),
        }
    }

    fn is_peak_hour(&self, config: &queue_priority_config::Model, now: chrono::DateTime<Utc>) -> bool {
        use chrono::Timelike;
        config.peak_hour_set().contains(&now.hour())
    }

    fn boost_overlay(
        &self,
        config: &queue_priority_config::Model,
        scored: &ScoredOrder,
        now: chrono::DateTime<Utc>,
    ) -> (f64, bool) {
        let mut boost = 0.0;
        let mut boosted = false;

        if scored.customer.as_ref().map(|c| c.is_vip).unwrap_or(false) {
            boost += config.boost_vip;
            boosted = true;
        }
        if let Some(promised) = scored.order.promised_at {
            if now.fixed_offset() > promised {
                boost += config.boost_delayed;
                boosted = true;
            }
        }
        if scored.order.party_size > 4 {
            boost += config.boost_large_party;
            boosted = true;
        }

        (boost, boosted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CoreContext, FixedClock};
    use crate::entity::priority_profile::AggregationMethod;
    use crate::entity::priority_rule::ScoreType;
    use chrono::{TimeZone, Utc};

    async fn scorer() -> PriorityScorer {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        PriorityScorer::new(CoreContext {
            db,
            clock: std::sync::Arc::new(FixedClock(Utc.timestamp_opt(0, 0).unwrap())),
            audit: std::sync::Arc::new(crate::context::TracingAuditSink),
            events: std::sync::Arc::new(crate::context::TracingEventBus),
            custom_score_fn: None,
        })
    }

    fn profile(method: AggregationMethod) -> priority_profile::Model {
        priority_profile::Model {
            id: 1,
            restaurant_id: 1,
            name: "default".into(),
            aggregation_method: method,
            total_weight_normalization: false,
            min_total_score: f64::MIN,
            max_total_score: f64::MAX,
            is_active: true,
        }
    }

    fn rule(min_score: f64, max_score: f64) -> priority_rule::Model {
        priority_rule::Model {
            id: 1,
            restaurant_id: 1,
            name: "wait_time".into(),
            score_type: ScoreType::WaitTime,
            score_config: serde_json::json!({"type": "linear", "base": 0.0, "multiplier": 1.0}),
            default_weight: 1.0,
            min_score,
            max_score,
            is_active: true,
        }
    }

    fn config() -> queue_priority_config::Model {
        queue_priority_config::Model {
            id: 1,
            queue_id: 1,
            profile_id: 1,
            is_active: true,
            rebalance_enabled: true,
            rebalance_threshold: 0.7,
            max_position_change: 3,
            boost_vip: 5.0,
            boost_delayed: 10.0,
            boost_large_party: 2.0,
            peak_multiplier: 1.5,
            peak_hours: serde_json::json!([11, 12, 18, 19]),
            boost_duration_seconds: 600,
        }
    }

    #[tokio::test]
    async fn aggregate_weighted_sum_adds_every_score() {
        let s = scorer().await;
        let p = profile(AggregationMethod::WeightedSum);
        let total = s.aggregate(&p, &[(2.0, 1.0), (3.0, 1.0)]);
        assert_eq!(total, 5.0);
    }

    #[tokio::test]
    async fn aggregate_max_and_min_pick_extremes() {
        let s = scorer().await;
        let values = [(2.0, 1.0), (7.0, 1.0), (4.0, 1.0)];
        assert_eq!(s.aggregate(&profile(AggregationMethod::Max), &values), 7.0);
        assert_eq!(s.aggregate(&profile(AggregationMethod::Min), &values), 2.0);
    }

    #[tokio::test]
    async fn aggregate_average_divides_by_component_count() {
        let s = scorer().await;
        let p = profile(AggregationMethod::Average);
        let total = s.aggregate(&p, &[(2.0, 1.0), (4.0, 1.0)]);
        assert_eq!(total, 3.0);
    }

    #[tokio::test]
    async fn aggregate_multiply_with_no_components_is_zero() {
        let s = scorer().await;
        let p = profile(AggregationMethod::Multiply);
        assert_eq!(s.aggregate(&p, &[]), 0.0);
    }

    #[tokio::test]
    async fn score_rule_clamps_to_the_rules_bounds() {
        let s = scorer().await;
        let r = rule(0.0, 10.0);
        assert_eq!(s.score_rule(&r, 50.0), 10.0);
        assert_eq!(s.score_rule(&r, -5.0), 0.0);
    }

    #[tokio::test]
    async fn is_peak_hour_checks_the_configured_hour_set() {
        let s = scorer().await;
        let cfg = config();
        let noon = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(s.is_peak_hour(&cfg, noon));
        assert!(!s.is_peak_hour(&cfg, midnight));
    }
}
