//! Order HTTP handlers
//!
//! Routes:
//! POST /api/orders                    — create an order
//! GET  /api/orders/{id}                — order detail
//! POST /api/orders/{id}/transitions    — drive a status transition (C5)

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::context::CoreContext;
use crate::entity::order::{self, OrderStatus};
use crate::errors::AppError;
use crate::models::order::{CreateOrderRequest, OrderView, TransitionRequest};
use crate::services::order_lifecycle::OrderLifecycleController;
use sea_orm::EntityTrait;

pub async fn create_order(
    ctx: web::Data<CoreContext>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let controller = OrderLifecycleController::new(ctx.get_ref().clone());
    let order = controller.create_order(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(to_view(order)))
}

pub async fn get_order(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order = order::Entity::find_by_id(id)
        .one(&ctx.db)
        .await?
        .ok_or_else(|| AppError::NotFound("order".into()))?;
    Ok(HttpResponse::Ok().json(to_view(order)))
}

pub async fn transition_order(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let order_id = path.into_inner();
    let target_status = parse_status(&body.target_status)?;
    let controller = OrderLifecycleController::new(ctx.get_ref().clone());
    let result = controller
        .transition(order_id, target_status, None, body.reason.clone())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    match raw {
        "pending" => Ok(OrderStatus::Pending),
        "in_progress" => Ok(OrderStatus::InProgress),
        "completed" => Ok(OrderStatus::Completed),
        "cancelled" => Ok(OrderStatus::Cancelled),
        other => Err(AppError::InvalidConditions(format!(
            "unknown order status '{}'",
            other
        ))),
    }
}

fn to_view(order: order::Model) -> OrderView {
    OrderView {
        order_id: order.id,
        status: format!("{:?}", order.status),
        subtotal: order.subtotal,
        discount_total: order.discount_total,
        total: order.total,
        pricing_evaluated: order.pricing_evaluated,
        queue_item_id: None,
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/orders")
            .route("", web::post().to(create_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/transitions", web::post().to(transition_order)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_accepts_all_known_values() {
        assert_eq!(parse_status("pending").unwrap(), OrderStatus::Pending);
        assert_eq!(parse_status("in_progress").unwrap(), OrderStatus::InProgress);
        assert_eq!(parse_status("completed").unwrap(), OrderStatus::Completed);
        assert_eq!(parse_status("cancelled").unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn parse_status_rejects_unknown_value() {
        assert!(parse_status("archived").is_err());
    }
}
