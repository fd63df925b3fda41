//! Queue HTTP handlers
//!
//! Routes:
//! POST /api/queues/{id}/items               — admit an order (C4)
//! GET  /api/queues/{id}                      — queue state view
//! POST /api/queues/{id}/rebalance            — force a rebalance pass
//! POST /api/queue-items/{id}/move
//! POST /api/queue-items/{id}/transfer
//! POST /api/queue-items/{id}/expedite
//! POST /api/queue-items/{id}/hold
//! POST /api/queue-items/{id}/release
//! POST /api/queue-items/{id}/status

use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use validator::Validate;

use crate::context::CoreContext;
use crate::entity::{order_priority_score, queue_item};
use crate::errors::AppError;
use crate::models::queue::{
    AdmitRequest, AdmitResult, ExpediteRequest, HoldRequest, MoveRequest,
    QueueItemMutationResult, QueueItemView, QueueStateView, TransferRequest,
};
use crate::services::queue_sequencer::QueueSequencer;

#[derive(Debug, Deserialize)]
pub struct RebalanceQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn admit(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<AdmitRequest>,
) -> Result<HttpResponse, AppError> {
    let queue_id = path.into_inner();
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let (item, score) = sequencer
        .admit(queue_id, body.order_id, None, body.priority_profile_id)
        .await?;

    Ok(HttpResponse::Created().json(AdmitResult {
        queue_item_id: item.id,
        sequence_number: item.sequence_number,
        initial_score: score,
    }))
}

pub async fn queue_state(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let queue_id = path.into_inner();
    let items = queue_item::Entity::find()
        .filter(queue_item::Column::QueueId.eq(queue_id))
        .order_by_asc(queue_item::Column::SequenceNumber)
        .all(&ctx.db)
        .await?;

    let mut views = Vec::with_capacity(items.len());
    let mut scores = Vec::new();
    for item in &items {
        let score = order_priority_score::Entity::find()
            .filter(order_priority_score::Column::QueueItemId.eq(item.id))
            .one(&ctx.db)
            .await?;
        if let Some(s) = &score {
            if item.status.is_live() {
                scores.push(s.total);
            }
        }
        views.push(QueueItemView {
            queue_item_id: item.id,
            order_id: item.order_id,
            sequence_number: item.sequence_number,
            status: format!("{:?}", item.status),
            score: score.map(|s| s.total),
        });
    }

    let fairness_index = if scores.is_empty() {
        None
    } else {
        Some(crate::services::queue_sequencer::fairness_index(&scores))
    };

    Ok(HttpResponse::Ok().json(QueueStateView {
        queue_id,
        items: views,
        fairness_index,
    }))
}

pub async fn rebalance(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    query: web::Query<RebalanceQuery>,
) -> Result<HttpResponse, AppError> {
    let queue_id = path.into_inner();
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let result = sequencer.rebalance(queue_id, query.force).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn move_item(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<MoveRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let item_id = path.into_inner();
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let item = sequencer
        .move_item(item_id, body.new_sequence_number, &body.reason)
        .await?;
    Ok(HttpResponse::Ok().json(to_mutation_result(item)))
}

pub async fn transfer_item(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<TransferRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let item = sequencer
        .transfer(item_id, body.destination_queue_id, true)
        .await?;
    Ok(HttpResponse::Ok().json(to_mutation_result(item)))
}

pub async fn expedite_item(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<ExpediteRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let item_id = path.into_inner();
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let item = sequencer
        .expedite(item_id, body.boost_amount, true, &body.reason)
        .await?;
    Ok(HttpResponse::Ok().json(to_mutation_result(item)))
}

pub async fn hold_item(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<HoldRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let item_id = path.into_inner();
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let until = ctx.now() + chrono::Duration::minutes(30);
    let item = sequencer.hold(item_id, until, body.reason.clone()).await?;
    Ok(HttpResponse::Ok().json(to_mutation_result(item)))
}

pub async fn release_item(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let item = sequencer.release_hold(item_id).await?;
    Ok(HttpResponse::Ok().json(to_mutation_result(item)))
}

pub async fn set_item_status(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let status = parse_status(&body.status)?;
    let sequencer = QueueSequencer::new(ctx.get_ref().clone());
    let item = sequencer
        .transition_status(item_id, status, body.reason.clone(), None)
        .await?;
    Ok(HttpResponse::Ok().json(to_mutation_result(item)))
}

fn parse_status(raw: &str) -> Result<queue_item::QueueItemStatus, AppError> {
    use queue_item::QueueItemStatus::*;
    match raw {
        "queued" => Ok(Queued),
        "in_preparation" => Ok(InPreparation),
        "ready" => Ok(Ready),
        "on_hold" => Ok(OnHold),
        "completed" => Ok(Completed),
        "cancelled" => Ok(Cancelled),
        "delayed" => Ok(Delayed),
        other => Err(AppError::InvalidConditions(format!(
            "unknown queue item status '{}'",
            other
        ))),
    }
}

fn to_mutation_result(item: queue_item::Model) -> QueueItemMutationResult {
    QueueItemMutationResult {
        queue_item_id: item.id,
        sequence_number: item.sequence_number,
        status: format!("{:?}", item.status),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/queues")
            .route("/{id}", web::get().to(queue_state))
            .route("/{id}/items", web::post().to(admit))
            .route("/{id}/rebalance", web::post().to(rebalance)),
    );
    cfg.service(
        web::scope("/api/queue-items")
            .route("/{id}/move", web::post().to(move_item))
            .route("/{id}/transfer", web::post().to(transfer_item))
            .route("/{id}/expedite", web::post().to(expedite_item))
            .route("/{id}/hold", web::post().to(hold_item))
            .route("/{id}/release", web::post().to(release_item))
            .route("/{id}/status", web::post().to(set_item_status)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_accepts_all_seven_states() {
        for raw in [
            "queued",
            "in_preparation",
            "ready",
            "on_hold",
            "completed",
            "cancelled",
            "delayed",
        ] {
            assert!(parse_status(raw).is_ok(), "expected '{}' to parse", raw);
        }
    }

    #[test]
    fn parse_status_rejects_unknown_value() {
        assert!(parse_status("pending").is_err());
    }
}
