//! Pricing rule HTTP handlers
//!
//! Routes:
//! POST /api/orders/{id}/pricing/evaluate   — evaluate & apply pricing rules (C2)
//! POST /api/pricing-rules                  — create a rule definition
//! GET  /api/pricing-rules/{rule_id}        — fetch one rule definition
//! PUT  /api/pricing-rules/{rule_id}        — update a rule definition
//! GET  /api/restaurants/{id}/pricing-rules — list a restaurant's rules

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::context::CoreContext;
use crate::errors::AppError;
use crate::models::pricing::{EvaluateRequest, RuleView, UpsertRuleRequest};
use crate::services::pricing_engine::PricingEngine;

pub async fn evaluate(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
    body: web::Json<EvaluateRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let engine = PricingEngine::new(ctx.get_ref().clone());
    let result = engine.evaluate(order_id, body.debug).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn create_rule(
    ctx: web::Data<CoreContext>,
    body: web::Json<UpsertRuleRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let engine = PricingEngine::new(ctx.get_ref().clone());
    let rule = engine.create_rule(body.into_inner(), None).await?;
    Ok(HttpResponse::Created().json(RuleView::from(rule)))
}

pub async fn update_rule(
    ctx: web::Data<CoreContext>,
    path: web::Path<String>,
    body: web::Json<UpsertRuleRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let rule_id = path.into_inner();
    let engine = PricingEngine::new(ctx.get_ref().clone());
    let rule = engine.update_rule(&rule_id, body.into_inner(), None).await?;
    Ok(HttpResponse::Ok().json(RuleView::from(rule)))
}

pub async fn get_rule(
    ctx: web::Data<CoreContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let engine = PricingEngine::new(ctx.get_ref().clone());
    let rule = engine.get_rule(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RuleView::from(rule)))
}

pub async fn list_rules(
    ctx: web::Data<CoreContext>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let engine = PricingEngine::new(ctx.get_ref().clone());
    let rules = engine.list_rules(path.into_inner()).await?;
    let views: Vec<RuleView> = rules.into_iter().map(RuleView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/orders")
            .route("/{id}/pricing/evaluate", web::post().to(evaluate)),
    );
    cfg.service(
        web::scope("/api/pricing-rules")
            .route("", web::post().to(create_rule))
            .route("/{rule_id}", web::get().to(get_rule))
            .route("/{rule_id}", web::put().to(update_rule)),
    );
    cfg.service(
        web::scope("/api/restaurants")
            .route("/{id}/pricing-rules", web::get().to(list_rules)),
    );
}
