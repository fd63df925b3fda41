//! Clears expired priority boosts and resequences the affected queues,
//! spec.md §4.3 boost overlay lifecycle.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::collections::HashSet;
use tokio::time::{interval, Duration};

use crate::context::CoreContext;
use crate::entity::{order_priority_score, queue_item};
use crate::services::priority_scorer::PriorityScorer;
use crate::services::queue_sequencer::QueueSequencer;

pub async fn run_boost_expirer(ctx: CoreContext) {
    let mut ticker = interval(Duration::from_secs(30));
    loop {
        ticker.tick().await;
        if let Err(e) = expire_boosts(&ctx).await {
            tracing::warn!(error = %e, "boost expirer pass failed");
        }
    }
}

async fn expire_boosts(ctx: &CoreContext) -> Result<(), crate::errors::AppError> {
    let now = ctx.now();

    let expired = order_priority_score::Entity::find()
        .filter(order_priority_score::Column::IsBoosted.eq(true))
        .filter(order_priority_score::Column::BoostExpiresAt.lte(now.fixed_offset()))
        .all(&ctx.db)
        .await?;

    if expired.is_empty() {
        return Ok(());
    }

    let scorer = PriorityScorer::new(ctx.clone());
    let sequencer = QueueSequencer::new(ctx.clone());
    let mut touched_queues = HashSet::new();

    for score in &expired {
        let Some(item) = queue_item::Entity::find_by_id(score.queue_item_id)
            .one(&ctx.db)
            .await?
        else {
            continue;
        };
        if !item.status.is_live() {
            continue;
        }
        scorer
            .compute_score(item.order_id, item.id, None)
            .await?;
        touched_queues.insert(item.queue_id);
    }

    for queue_id in touched_queues {
        if let Err(e) = sequencer.rebalance(queue_id, true).await {
            tracing::warn!(queue_id, error = %e, "resequence after boost expiry failed");
        }
    }

    tracing::debug!(expired = expired.len(), "expired priority boosts cleared");
    Ok(())
}
