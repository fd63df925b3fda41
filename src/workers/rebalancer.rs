//! Periodically rebalances every active queue, spec.md §4.4 "Rebalance".

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tokio::time::{interval, Duration};

use crate::context::CoreContext;
use crate::entity::order_queue::{self, QueueStatus};
use crate::services::queue_sequencer::QueueSequencer;

pub async fn run_rebalancer(ctx: CoreContext, interval_minutes: i64) {
    let mut ticker = interval(Duration::from_secs((interval_minutes.max(1) as u64) * 60));
    loop {
        ticker.tick().await;
        if let Err(e) = rebalance_all_queues(&ctx).await {
            tracing::warn!(error = %e, "rebalancer pass failed");
        }
    }
}

async fn rebalance_all_queues(ctx: &CoreContext) -> Result<(), crate::errors::AppError> {
    let queues = order_queue::Entity::find()
        .filter(order_queue::Column::Status.eq(QueueStatus::Active))
        .all(&ctx.db)
        .await?;

    let sequencer = QueueSequencer::new(ctx.clone());
    for queue in queues {
        match sequencer.rebalance(queue.id, false).await {
            Ok(result) => {
                if !result.moves.is_empty() {
                    tracing::info!(
                        queue_id = queue.id,
                        moves = result.moves.len(),
                        fairness = result.fairness_index,
                        "queue rebalanced"
                    );
                }
            }
            Err(e) => tracing::warn!(queue_id = queue.id, error = %e, "rebalance failed"),
        }
    }

    Ok(())
}
