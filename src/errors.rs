//! Error taxonomy for the order orchestration core.
//!
//! Closed taxonomy per spec.md §7: validation (surfaced, never retried),
//! transient storage (one automatic retry on conflict, then surface),
//! invariant violation (surfaced with structured detail, transaction rolled
//! back), policy refusal (surfaced unchanged), internal (logged, opaque to
//! the caller). Every variant carries a machine-readable `kind()` and maps
//! to an HTTP status, following the teacher's `ResponseError` pattern.

use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

#[derive(Debug, Clone, Serialize)]
pub struct ShortageDetail {
    pub inventory_id: i64,
    pub item_name: String,
    pub available: rust_decimal::Decimal,
    pub required: rust_decimal::Decimal,
    pub unit: String,
}

#[derive(Debug)]
pub enum AppError {
    /// Database errors - log internally, return a generic message.
    Database(DbErr),
    /// Validation errors - safe to return details.
    Validation(ValidationErrors),
    /// Invariant violation: insufficient stock for a deduction.
    InsufficientInventory(Vec<ShortageDetail>),
    /// Policy refusal: reversal attempted against synced adjustments
    /// without `force`.
    AlreadySynced,
    /// Invariant violation: a status transition outside the allowed DAG.
    InvalidTransition { from: String, to: String },
    /// Invariant violation: queue has no free capacity.
    QueueFull,
    /// Invariant violation: order already has a live item in some queue.
    DuplicateOrder,
    /// A single pricing rule's evaluation raised — recorded and skipped,
    /// never returned to a caller except in debug traces.
    RuleEvalError(String),
    /// A rule's `conditions` document failed structural validation.
    InvalidConditions(String),
    /// Row not found.
    NotFound(String),
    /// Policy refusal: actor lacks permission for the action.
    PermissionDenied,
    /// Per-request deadline exceeded.
    Timeout,
    /// Caught-and-classified internal error.
    Internal(String),
}

impl AppError {
    /// Machine-readable error code, matching the set enumerated in
    /// spec.md §6.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "INTERNAL",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InsufficientInventory(_) => "INSUFFICIENT_INVENTORY",
            AppError::AlreadySynced => "ALREADY_SYNCED",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::QueueFull => "QUEUE_FULL",
            AppError::DuplicateOrder => "DUPLICATE_ORDER",
            AppError::RuleEvalError(_) => "RULE_EVAL_ERROR",
            AppError::InvalidConditions(_) => "INVALID_CONDITIONS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PermissionDenied => "PERMISSION_DENIED",
            AppError::Timeout => "TIMEOUT",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(_) => write!(f, "Database error"),
            AppError::Validation(e) => write!(f, "Validation error: {}", e),
            AppError::InsufficientInventory(items) => {
                write!(f, "Insufficient inventory for {} ingredient(s)", items.len())
            }
            AppError::AlreadySynced => write!(
                f,
                "Cannot reverse adjustments already synced to an external system"
            ),
            AppError::InvalidTransition { from, to } => {
                write!(f, "Invalid transition from {} to {}", from, to)
            }
            AppError::QueueFull => write!(f, "Queue is at capacity"),
            AppError::DuplicateOrder => write!(f, "Order already has a live queue item"),
            AppError::RuleEvalError(e) => write!(f, "Rule evaluation error: {}", e),
            AppError::InvalidConditions(e) => write!(f, "Invalid rule conditions: {}", e),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::PermissionDenied => write!(f, "Permission denied"),
            AppError::Timeout => write!(f, "Operation timed out"),
            AppError::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = match self {
            AppError::Database(_) | AppError::Internal(_) => {
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_)
            | AppError::InvalidConditions(_)
            | AppError::InvalidTransition { .. } => actix_web::http::StatusCode::BAD_REQUEST,
            AppError::InsufficientInventory(_) => actix_web::http::StatusCode::CONFLICT,
            AppError::AlreadySynced | AppError::PermissionDenied => {
                actix_web::http::StatusCode::FORBIDDEN
            }
            AppError::QueueFull | AppError::DuplicateOrder => {
                actix_web::http::StatusCode::CONFLICT
            }
            AppError::RuleEvalError(_) => actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            AppError::Timeout => actix_web::http::StatusCode::REQUEST_TIMEOUT,
        };

        if let AppError::Database(e) = self {
            tracing::error!("database error: {:?}", e);
        }
        if let AppError::Internal(e) = self {
            tracing::error!("internal error: {}", e);
        }

        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let AppError::InsufficientInventory(items) = self {
            body["shortages"] = serde_json::to_value(items).unwrap_or_default();
        }
        if let AppError::Validation(errors) = self {
            body["details"] = serde_json::to_value(errors).unwrap_or_default();
        }

        HttpResponse::build(status).json(body)
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err)
    }
}
