//! Request/response DTOs for the Queue Sequencer & Rebalancer (C4).

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize)]
pub struct AdmitRequest {
    pub order_id: i64,
    #[serde(default)]
    pub priority_profile_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdmitResult {
    pub queue_item_id: i64,
    pub sequence_number: i32,
    pub initial_score: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MoveRequest {
    #[validate(range(min = 1))]
    pub new_sequence_number: i32,
    #[validate(length(min = 1))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub destination_queue_id: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExpediteRequest {
    #[validate(range(min = 0.0))]
    pub boost_amount: f64,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[validate(length(min = 1))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HoldRequest {
    #[validate(length(min = 1))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueItemMutationResult {
    pub queue_item_id: i64,
    pub sequence_number: i32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebalanceMove {
    pub queue_item_id: i64,
    pub old_sequence_number: i32,
    pub new_sequence_number: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebalanceResult {
    pub queue_id: i64,
    pub moves: Vec<RebalanceMove>,
    pub fairness_index: f64,
    pub triggered_by: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueItemView {
    pub queue_item_id: i64,
    pub order_id: i64,
    pub sequence_number: i32,
    pub status: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueStateView {
    pub queue_id: i64,
    pub items: Vec<QueueItemView>,
    pub fairness_index: Option<f64>,
}
