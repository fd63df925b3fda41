//! Shared core context — resolves the "global singletons" design note
//! (spec.md §9): instead of module-global cache/service instances, every
//! service takes an explicit, constructor-injected `CoreContext` holding the
//! clock, store, audit sink and event bus.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;

/// Abstracts wall-clock time so tests can inject a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed clock for deterministic tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub actor_id: Option<i64>,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub detail: Value,
}

/// Structured audit sink — one of the four external collaborators the core
/// consumes (spec.md §1). Default implementation logs via `tracing`; a
/// production deployment would swap in a sink backed by the audit table.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry);
}

pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: AuditEntry) {
        tracing::info!(
            actor_id = ?entry.actor_id,
            action = %entry.action,
            entity_kind = %entry.entity_kind,
            entity_id = %entry.entity_id,
            detail = %entry.detail,
            "audit"
        );
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Event {
    pub name: String,
    pub queue_id: Option<i64>,
    pub item_id: Option<i64>,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

/// Event bus for downstream displays (spec.md §6 "Events emitted on the
/// bus"). Publishing happens as a separate step after transaction commit
/// (spec.md §9 async/coroutines design note), never inside the transaction
/// itself.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Event);
}

pub struct TracingEventBus;

#[async_trait]
impl EventBus for TracingEventBus {
    async fn publish(&self, event: Event) {
        tracing::debug!(
            event = %event.name,
            queue_id = ?event.queue_id,
            item_id = ?event.item_id,
            data = %event.data,
            "bus event"
        );
    }
}

/// Hook registered at process start for `ScoreType::Custom` /
/// `score_config.type = custom` evaluation (spec.md §9: "avoid executing
/// user-provided code at runtime — custom is an interface hook registered
/// at process start"). Held by value rather than as a module-global static,
/// matching the constructor-injection resolution above.
pub type CustomScoreFn = Arc<dyn Fn(f64, &Value) -> f64 + Send + Sync>;

#[derive(Clone)]
pub struct CoreContext {
    pub db: DatabaseConnection,
    pub clock: Arc<dyn Clock>,
    pub audit: Arc<dyn AuditSink>,
    pub events: Arc<dyn EventBus>,
    pub custom_score_fn: Option<CustomScoreFn>,
}

impl CoreContext {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            audit: Arc::new(TracingAuditSink),
            events: Arc::new(TracingEventBus),
            custom_score_fn: None,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
