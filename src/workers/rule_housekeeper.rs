//! Hourly pricing-rule expiry plus a daily pricing-metric purge, spec.md
//! §4.2 lifecycle housekeeping.

use tokio::time::{interval, Duration};

use crate::context::CoreContext;
use crate::services::pricing_engine::PricingEngine;

pub async fn run_rule_housekeeper(ctx: CoreContext) {
    let mut hourly = interval(Duration::from_secs(60 * 60));
    let mut daily = interval(Duration::from_secs(24 * 60 * 60));

    loop {
        tokio::select! {
            _ = hourly.tick() => {
                let engine = PricingEngine::new(ctx.clone());
                match engine.expire_stale_rules().await {
                    Ok(count) if count > 0 => tracing::info!(count, "expired stale pricing rules"),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "rule expiry pass failed"),
                }
            }
            _ = daily.tick() => {
                let engine = PricingEngine::new(ctx.clone());
                match engine.purge_old_metrics().await {
                    Ok(count) if count > 0 => tracing::info!(count, "purged old pricing metrics"),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "pricing metric purge failed"),
                }
            }
        }
    }
}
