//! Request/response DTOs for the Order Lifecycle Controller (C5).

use crate::models::inventory::OrderItemQty;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub restaurant_id: i64,
    pub customer_id: Option<i64>,
    #[validate(length(min = 1))]
    pub order_type: String,
    #[validate(length(min = 1))]
    pub channel: String,
    #[validate(length(min = 1))]
    pub payment_method: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemQty>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order_id: i64,
    pub status: String,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub pricing_evaluated: bool,
    pub queue_item_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransitionRequest {
    #[validate(length(min = 1))]
    pub target_status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionResult {
    pub order_id: i64,
    pub from_status: String,
    pub to_status: String,
}
