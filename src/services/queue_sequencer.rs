//! Queue Sequencer & Rebalancer (C4) — admission, manual resequencing,
//! status transitions and the fairness-driven rebalance pass (spec.md
//! §4.4).

use rust_decimal::prelude::ToPrimitive;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::context::{CoreContext, Event};
use crate::entity::{
    order, queue_item, queue_item_status_history, queue_priority_config, queue_sequence_rule,
    order_queue,
};
use crate::entity::queue_item::QueueItemStatus;
use crate::errors::AppError;
use crate::models::queue::{RebalanceMove, RebalanceResult};
use crate::services::priority_scorer::PriorityScorer;

pub struct QueueSequencer {
    ctx: CoreContext,
}

impl QueueSequencer {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// `admit(queue_id, order_id, hints)`, spec.md §4.4 "Sequencing on
    /// admit". Consults the Priority Scorer for the new item's priority
    /// (step 3) and repositions it into priority order before returning
    /// (step 5) — the returned score is the one actually used to sequence
    /// the item, not a value computed separately after the fact.
    pub async fn admit(
        &self,
        queue_id: i64,
        order_id: i64,
        hold_until: Option<chrono::DateTime<chrono::Utc>>,
        priority_profile_id: Option<i64>,
    ) -> Result<(queue_item::Model, f64), AppError> {
        let queue = order_queue::Entity::find_by_id(queue_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue".into()))?;

        if queue.current_size >= queue.capacity {
            return Err(AppError::QueueFull);
        }

        let existing = queue_item::Entity::find()
            .filter(queue_item::Column::OrderId.eq(order_id))
            .one(&self.ctx.db)
            .await?;
        if let Some(existing) = existing {
            if existing.status.is_live() {
                return Err(AppError::DuplicateOrder);
            }
        }

        let now = self.ctx.now();
        let initial_status = if hold_until.is_some() {
            QueueItemStatus::OnHold
        } else {
            QueueItemStatus::Queued
        };

        let live_items = queue_item::Entity::find()
            .filter(queue_item::Column::QueueId.eq(queue_id))
            .order_by_asc(queue_item::Column::SequenceNumber)
            .all(&self.ctx.db)
            .await?;
        let live_items: Vec<_> = live_items.into_iter().filter(|i| i.status.is_live()).collect();

        let sequence_rules = queue_sequence_rule::Entity::find()
            .filter(queue_sequence_rule::Column::QueueId.eq(queue_id))
            .filter(queue_sequence_rule::Column::IsActive.eq(true))
            .order_by_desc(queue_sequence_rule::Column::Priority)
            .all(&self.ctx.db)
            .await?;

        let order_row = order::Entity::find_by_id(order_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("order".into()))?;

        let mut priority_adjustment = 0.0;
        let mut position_adjustment = 0;
        let mut auto_expedite = false;
        let mut assigned_station = None;
        for rule in &sequence_rules {
            if !rule_matches(rule, &order_row) {
                continue;
            }
            if let Some(adj) = rule.priority_adjustment {
                priority_adjustment += adj;
            }
            if let Some(adj) = rule.position_adjustment {
                position_adjustment += adj;
            }
            if rule.auto_expedite {
                auto_expedite = true;
            }
            if rule.set_station.is_some() {
                assigned_station = rule.set_station.clone();
            }
        }

        // Insert at the tail first — the Priority Scorer needs a persisted
        // queue_item id to score against — then reposition by score below.
        let tail = live_items.len() as i32 + 1;

        let txn = self.ctx.db.begin().await?;

        let active = queue_item::ActiveModel {
            queue_id: Set(queue_id),
            order_id: Set(order_id),
            sequence_number: Set(tail),
            priority: Set(priority_adjustment),
            expedited: Set(auto_expedite),
            status: Set(initial_status.clone()),
            queued_at: Set(now.fixed_offset()),
            started_at: Set(None),
            ready_at: Set(None),
            completed_at: Set(None),
            hold_until: Set(hold_until.map(|h| h.fixed_offset())),
            hold_reason: Set(None),
            estimated_ready_at: Set(None),
            assigned_staff: Set(None),
            assigned_station: Set(assigned_station),
            prep_time_actual_min: Set(None),
            wait_time_actual_min: Set(None),
            ..Default::default()
        };
        let saved = match active.insert(&txn).await {
            Ok(m) => m,
            Err(_) => {
                // Unique-violation on (queue_id, sequence_number): retry
                // once with a freshly computed tail sequence.
                let tail = queue_item::Entity::find()
                    .filter(queue_item::Column::QueueId.eq(queue_id))
                    .order_by_desc(queue_item::Column::SequenceNumber)
                    .one(&txn)
                    .await?
                    .map(|i| i.sequence_number + 1)
                    .unwrap_or(1);
                let retry = queue_item::ActiveModel {
                    queue_id: Set(queue_id),
                    order_id: Set(order_id),
                    sequence_number: Set(tail),
                    priority: Set(priority_adjustment),
                    expedited: Set(auto_expedite),
                    status: Set(initial_status),
                    queued_at: Set(now.fixed_offset()),
                    hold_until: Set(hold_until.map(|h| h.fixed_offset())),
                    ..Default::default()
                };
                retry.insert(&txn).await?
            }
        };

        let history = queue_item_status_history::ActiveModel {
            queue_item_id: Set(saved.id),
            old_status: Set(None),
            new_status: Set(saved.status.clone()),
            reason: Set(None),
            actor_id: Set(None),
            created_at: Set(now.fixed_offset()),
            ..Default::default()
        };
        history.insert(&txn).await?;

        let mut queue_active: order_queue::ActiveModel = queue.into();
        queue_active.current_size = Set(queue_active.current_size.unwrap() + 1);
        queue_active.update(&txn).await?;

        txn.commit().await?;

        self.ctx
            .events
            .publish(Event {
                name: "queue_item.admitted".into(),
                queue_id: Some(queue_id),
                item_id: Some(saved.id),
                data: serde_json::json!({ "order_id": order_id }),
                timestamp: now,
            })
            .await;

        // Step 3: consult the Priority Scorer for the new item's priority.
        let scorer = PriorityScorer::new(self.ctx.clone());
        let score = scorer
            .compute_score(order_id, saved.id, priority_profile_id)
            .await?;
        let total = score.total + priority_adjustment;

        let mut score_active: queue_item::ActiveModel = saved.clone().into();
        score_active.priority = Set(total);
        let saved = score_active.update(&self.ctx.db).await?;

        // Step 5: reposition into priority order — higher score sorts
        // earlier — before any manual position_adjustment from a sequence
        // rule is applied on top.
        let ahead = live_items.iter().filter(|i| i.priority > total).count() as i32;
        let desired = (ahead + 1 - position_adjustment).max(1);

        let saved = if desired != saved.sequence_number {
            self.move_item(saved.id, desired, "priority scoring").await?
        } else {
            saved
        };

        Ok((saved, total))
    }

    /// `move(item_id, new_position, reason)`, spec.md §4.4 "Move".
    pub async fn move_item(
        &self,
        item_id: i64,
        new_sequence_number: i32,
        reason: &str,
    ) -> Result<queue_item::Model, AppError> {
        let item = queue_item::Entity::find_by_id(item_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue item".into()))?;

        let old = item.sequence_number;
        if old == new_sequence_number {
            return Ok(item);
        }

        let txn = self.ctx.db.begin().await?;

        let siblings = queue_item::Entity::find()
            .filter(queue_item::Column::QueueId.eq(item.queue_id))
            .filter(queue_item::Column::Id.ne(item_id))
            .all(&txn)
            .await?;

        for sib in siblings {
            if !sib.status.is_live() {
                continue;
            }
            let shifted = if new_sequence_number < old {
                // B < A: shift items in (B..A) up by one.
                if sib.sequence_number >= new_sequence_number && sib.sequence_number < old {
                    Some(sib.sequence_number + 1)
                } else {
                    None
                }
            } else {
                // B > A: shift items in (A..B] down by one.
                if sib.sequence_number > old && sib.sequence_number <= new_sequence_number {
                    Some(sib.sequence_number - 1)
                } else {
                    None
                }
            };
            if let Some(new_seq) = shifted {
                let mut active: queue_item::ActiveModel = sib.into();
                active.sequence_number = Set(new_seq);
                active.update(&txn).await?;
            }
        }

        let mut active: queue_item::ActiveModel = item.into();
        active.sequence_number = Set(new_sequence_number);
        let saved = active.update(&txn).await?;

        txn.commit().await?;

        self.ctx
            .events
            .publish(Event {
                name: "queue_item.moved".into(),
                queue_id: Some(saved.queue_id),
                item_id: Some(saved.id),
                data: serde_json::json!({ "reason": reason, "from": old, "to": new_sequence_number }),
                timestamp: self.ctx.now(),
            })
            .await;

        Ok(saved)
    }

    /// `transfer(item_id, target_queue_id, maintain_priority, reason)`.
    pub async fn transfer(
        &self,
        item_id: i64,
        target_queue_id: i64,
        maintain_priority: bool,
    ) -> Result<queue_item::Model, AppError> {
        let item = queue_item::Entity::find_by_id(item_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue item".into()))?;

        let target = order_queue::Entity::find_by_id(target_queue_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue".into()))?;
        if target.current_size >= target.capacity {
            return Err(AppError::QueueFull);
        }

        let old_queue_id = item.queue_id;
        let tail = queue_item::Entity::find()
            .filter(queue_item::Column::QueueId.eq(target_queue_id))
            .order_by_desc(queue_item::Column::SequenceNumber)
            .one(&self.ctx.db)
            .await?
            .map(|i| i.sequence_number + 1)
            .unwrap_or(1);

        let mut active: queue_item::ActiveModel = item.into();
        active.queue_id = Set(target_queue_id);
        active.sequence_number = Set(tail);
        if !maintain_priority {
            active.priority = Set(0.0);
        }
        let saved = active.update(&self.ctx.db).await?;

        self.decrement_size(old_queue_id).await?;
        self.increment_size(target_queue_id).await?;

        Ok(saved)
    }

    /// `expedite(item_id, priority_boost, move_to_front, reason)`.
    pub async fn expedite(
        &self,
        item_id: i64,
        priority_boost: f64,
        move_to_front: bool,
        reason: &str,
    ) -> Result<queue_item::Model, AppError> {
        let item = queue_item::Entity::find_by_id(item_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue item".into()))?;

        let mut active: queue_item::ActiveModel = item.clone().into();
        active.priority = Set(item.priority + priority_boost);
        active.expedited = Set(true);
        let saved = active.update(&self.ctx.db).await?;

        if move_to_front {
            return self.move_item(item_id, 1, reason).await;
        }
        Ok(saved)
    }

    /// `hold(item_id, until|minutes, reason)`.
    pub async fn hold(
        &self,
        item_id: i64,
        until: chrono::DateTime<chrono::Utc>,
        reason: String,
    ) -> Result<queue_item::Model, AppError> {
        self.transition_status(item_id, QueueItemStatus::OnHold, Some(reason), None)
            .await
            .map(|m| {
                let mut m = m;
                m.hold_until = Some(until.fixed_offset());
                m
            })
    }

    pub async fn release_hold(&self, item_id: i64) -> Result<queue_item::Model, AppError> {
        self.transition_status(item_id, QueueItemStatus::Queued, None, None)
            .await
    }

    /// `batchSetStatus(items, new_status, reason)`.
    pub async fn batch_set_status(
        &self,
        item_ids: &[i64],
        new_status: QueueItemStatus,
        reason: Option<String>,
    ) -> Result<Vec<queue_item::Model>, AppError> {
        let mut results = Vec::with_capacity(item_ids.len());
        for id in item_ids {
            results.push(
                self.transition_status(*id, new_status.clone(), reason.clone(), None)
                    .await?,
            );
        }
        Ok(results)
    }

    /// Validates and applies one status transition, spec.md §4.4's DAG and
    /// side effects.
    pub async fn transition_status(
        &self,
        item_id: i64,
        new_status: QueueItemStatus,
        reason: Option<String>,
        actor_id: Option<i64>,
    ) -> Result<queue_item::Model, AppError> {
        let item = queue_item::Entity::find_by_id(item_id)
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue item".into()))?;

        if !item.status.can_transition_to(&new_status) {
            return Err(AppError::InvalidTransition {
                from: format!("{:?}", item.status),
                to: format!("{:?}", new_status),
            });
        }

        let old_status = item.status.clone();
        let now = self.ctx.now();

        let mut active: queue_item::ActiveModel = item.clone().into();
        active.status = Set(new_status.clone());
        match new_status {
            QueueItemStatus::InPreparation => active.started_at = Set(Some(now.fixed_offset())),
            QueueItemStatus::Ready => {
                active.ready_at = Set(Some(now.fixed_offset()));
                if let Some(started) = item.started_at {
                    active.prep_time_actual_min =
                        Set(Some((now.fixed_offset() - started).num_seconds() as f64 / 60.0));
                }
            }
            QueueItemStatus::Completed => {
                active.completed_at = Set(Some(now.fixed_offset()));
                active.wait_time_actual_min = Set(Some(
                    (now.fixed_offset() - item.queued_at).num_seconds() as f64 / 60.0,
                ));
            }
            _ => {}
        }
        if let Some(reason) = &reason {
            active.hold_reason = Set(Some(reason.clone()));
        }

        let saved = active.update(&self.ctx.db).await?;

        let history = queue_item_status_history::ActiveModel {
            queue_item_id: Set(item_id),
            old_status: Set(Some(old_status)),
            new_status: Set(new_status.clone()),
            reason: Set(reason),
            actor_id: Set(actor_id),
            created_at: Set(now.fixed_offset()),
            ..Default::default()
        };
        history.insert(&self.ctx.db).await?;

        if new_status.is_terminal() {
            self.decrement_size(saved.queue_id).await?;
        }

        Ok(saved)
    }

    /// `rebalance(queue_id, force)`, spec.md §4.4 "Rebalance".
    pub async fn rebalance(&self, queue_id: i64, force: bool) -> Result<RebalanceResult, AppError> {
        let start = std::time::Instant::now();

        let config = queue_priority_config::Entity::find()
            .filter(queue_priority_config::Column::QueueId.eq(queue_id))
            .one(&self.ctx.db)
            .await?
            .ok_or_else(|| AppError::NotFound("queue priority config".into()))?;

        let scorer = PriorityScorer::new(self.ctx.clone());
        let scores = scorer.compute_bulk(queue_id, None).await?;

        let fairness = fairness_index(&scores.iter().map(|s| s.total).collect::<Vec<_>>());

        let mut moves = Vec::new();
        if force || fairness < config.rebalance_threshold {
            let mut sorted = scores.clone();
            sorted.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap());

            let items = queue_item::Entity::find()
                .filter(queue_item::Column::QueueId.eq(queue_id))
                .all(&self.ctx.db)
                .await?;

            for (idx, score) in sorted.iter().enumerate() {
                let desired = idx as i32 + 1;
                if let Some(item) = items.iter().find(|i| i.id == score.queue_item_id) {
                    let drift = (item.sequence_number - desired).abs();
                    if drift > config.max_position_change {
                        let bounded = if desired < item.sequence_number {
                            item.sequence_number - config.max_position_change
                        } else {
                            item.sequence_number + config.max_position_change
                        };
                        self.move_item(item.id, bounded, "rebalance").await?;
                        moves.push(RebalanceMove {
                            queue_item_id: item.id,
                            old_sequence_number: item.sequence_number,
                            new_sequence_number: bounded,
                        });
                    }
                }
            }
        }

        let _ = start.elapsed();

        Ok(RebalanceResult {
            queue_id,
            moves,
            fairness_index: fairness,
            triggered_by: if force { "forced".into() } else { "threshold".into() },
        })
    }

    async fn decrement_size(&self, queue_id: i64) -> Result<(), AppError> {
        if let Some(queue) = order_queue::Entity::find_by_id(queue_id).one(&self.ctx.db).await? {
            let mut active: order_queue::ActiveModel = queue.into();
            let current = active.current_size.unwrap();
            active.current_size = Set((current - 1).max(0));
            active.update(&self.ctx.db).await?;
        }
        Ok(())
    }

    async fn increment_size(&self, queue_id: i64) -> Result<(), AppError> {
        if let Some(queue) = order_queue::Entity::find_by_id(queue_id).one(&self.ctx.db).await? {
            let mut active: order_queue::ActiveModel = queue.into();
            let current = active.current_size.unwrap();
            active.current_size = Set(current + 1);
            active.update(&self.ctx.db).await?;
        }
        Ok(())
    }
}

/// `1 - Gini coefficient` over ascending-sorted scores.
pub fn fairness_index(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 1.0;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len() as f64;
    let sum: f64 = sorted.iter().sum();
    if sum == 0.0 {
        return 1.0;
    }
    let cumsum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64 + 1.0) * v)
        .sum();
    let gini = (2.0 * cumsum) / (n * sum) - (n + 1.0) / n;
    1.0 - gini
}

#[cfg(test)]
mod tests {
    use super::fairness_index;

    #[test]
    fn empty_queue_is_perfectly_fair() {
        assert_eq!(fairness_index(&[]), 1.0);
    }

    #[test]
    fn equal_scores_are_perfectly_fair() {
        let fairness = fairness_index(&[5.0, 5.0, 5.0, 5.0]);
        assert!((fairness - 1.0).abs() < 1e-9);
    }

    #[test]
    fn skewed_scores_reduce_fairness_below_one() {
        let fairness = fairness_index(&[0.0, 0.0, 0.0, 100.0]);
        assert!(fairness < 1.0);
        assert!(fairness >= 0.0);
    }

    #[test]
    fn more_even_distribution_scores_higher_than_more_skewed() {
        let even = fairness_index(&[4.0, 5.0, 6.0]);
        let skewed = fairness_index(&[1.0, 1.0, 13.0]);
        assert!(even > skewed);
    }
}

fn rule_matches(rule: &queue_sequence_rule::Model, order: &order::Model) -> bool {
    let conditions = &rule.conditions;
    if let Some(types) = conditions.get("order_types").and_then(|v| v.as_array()) {
        let order_type = order.order_type.as_deref().unwrap_or("");
        if !types.iter().any(|t| t.as_str() == Some(order_type)) {
            return false;
        }
    }
    if let Some(min_value) = conditions.get("min_order_value").and_then(|v| v.as_f64()) {
        let total = order.total.to_f64().unwrap_or(0.0);
        if total < min_value {
            return false;
        }
    }
    true
}
