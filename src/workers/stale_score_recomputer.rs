//! Refreshes priority scores that have drifted out of date (wait time keeps
//! climbing even with no queue mutation) and resequences queues where the
//! refreshed score moved enough to matter.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::collections::HashSet;
use tokio::time::{interval, Duration};

use crate::context::CoreContext;
use crate::entity::{order_priority_score, queue_item};
use crate::services::priority_scorer::PriorityScorer;
use crate::services::queue_sequencer::QueueSequencer;

const STALE_AFTER_MINUTES: i64 = 10;
const RESEQUENCE_DELTA: f64 = 5.0;

pub async fn run_stale_score_recomputer(ctx: CoreContext) {
    let mut ticker = interval(Duration::from_secs(5 * 60));
    loop {
        ticker.tick().await;
        if let Err(e) = recompute_stale_scores(&ctx).await {
            tracing::warn!(error = %e, "stale score recompute pass failed");
        }
    }
}

async fn recompute_stale_scores(ctx: &CoreContext) -> Result<(), crate::errors::AppError> {
    let now = ctx.now();
    let cutoff = (now - chrono::Duration::minutes(STALE_AFTER_MINUTES)).fixed_offset();

    let stale = order_priority_score::Entity::find()
        .filter(order_priority_score::Column::CalculatedAt.lte(cutoff))
        .all(&ctx.db)
        .await?;

    if stale.is_empty() {
        return Ok(());
    }

    let scorer = PriorityScorer::new(ctx.clone());
    let sequencer = QueueSequencer::new(ctx.clone());
    let mut touched_queues = HashSet::new();

    for prior in &stale {
        let Some(item) = queue_item::Entity::find_by_id(prior.queue_item_id)
            .one(&ctx.db)
            .await?
        else {
            continue;
        };
        if !item.status.is_live() {
            continue;
        }

        let refreshed = scorer
            .compute_score(item.order_id, item.id, None)
            .await?;

        if (refreshed.total - prior.total).abs() > RESEQUENCE_DELTA {
            touched_queues.insert(item.queue_id);
        }
    }

    for queue_id in touched_queues {
        if let Err(e) = sequencer.rebalance(queue_id, false).await {
            tracing::warn!(queue_id, error = %e, "resequence after stale recompute failed");
        }
    }

    tracing::debug!(recomputed = stale.len(), "stale priority scores refreshed");
    Ok(())
}
