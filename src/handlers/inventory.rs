//! Inventory HTTP handlers
//!
//! Routes:
//! POST /api/inventory/preview              — project deduction impact, no mutation (C1)
//! POST /api/orders/{id}/inventory/partial-fulfill
//! POST /api/orders/{id}/inventory/reverse

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::context::CoreContext;
use crate::errors::AppError;
use crate::models::inventory::{PartialFulfillRequest, PreviewRequest, ReverseRequest};
use crate::services::recipe_inventory::RecipeInventoryDeductor;

pub async fn preview(
    ctx: web::Data<CoreContext>,
    body: web::Json<PreviewRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let deductor = RecipeInventoryDeductor::new(ctx.get_ref().clone());
    let required = deductor
        .preview_impact(body.restaurant_id, &body.items)
        .await?;
    Ok(HttpResponse::Ok().json(required))
}

pub async fn partial_fulfill(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<PartialFulfillRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let order_id = path.into_inner();
    let deductor = RecipeInventoryDeductor::new(ctx.get_ref().clone());
    let result = deductor
        .partial_fulfill(body.restaurant_id, &body.items, order_id, None)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn reverse(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<ReverseRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let order_id = path.into_inner();
    let deductor = RecipeInventoryDeductor::new(ctx.get_ref().clone());
    let result = deductor
        .reverse_for_order(order_id, None, body.reason.clone(), body.force)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/inventory").route("/preview", web::post().to(preview)));
    cfg.service(
        web::scope("/api/orders")
            .route("/{id}/inventory/partial-fulfill", web::post().to(partial_fulfill))
            .route("/{id}/inventory/reverse", web::post().to(reverse)),
    );
}
