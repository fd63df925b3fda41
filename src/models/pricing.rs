//! Pricing rule conditions document — spec.md §6 "Pricing rule conditions
//! document (JSON-Schema-shaped)". Tagged per-section structs, composed by
//! and-combination at evaluation time (spec.md §9 design note).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeConditions {
    /// 0-6, 0=Monday.
    #[serde(default)]
    pub days_of_week: Option<Vec<u8>>,
    /// `HH:MM`, 24-hour. When `start_time > end_time` the range spans
    /// midnight.
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub date_ranges: Option<Vec<(chrono::NaiveDate, chrono::NaiveDate)>>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemConditions {
    #[serde(default)]
    pub menu_item_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub category_ids: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_item_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub min_quantity: Option<Decimal>,
    #[serde(default)]
    pub max_quantity: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerConditions {
    #[serde(default)]
    pub loyalty_tier: Option<Vec<String>>,
    #[serde(default)]
    pub min_orders: Option<i32>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Mutually exclusive with `min_orders > 0` (spec.md §6).
    #[serde(default)]
    pub new_customer: Option<bool>,
    #[serde(default)]
    pub birthday_month: Option<i16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderConditions {
    #[serde(default)]
    pub min_items: Option<i32>,
    #[serde(default)]
    pub max_items: Option<i32>,
    #[serde(default)]
    pub payment_methods: Option<Vec<String>>,
    #[serde(default)]
    pub order_types: Option<Vec<String>>,
    #[serde(default)]
    pub channels: Option<Vec<String>>,
    #[serde(default)]
    pub min_subtotal: Option<Decimal>,
    #[serde(default)]
    pub max_subtotal: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConditions {
    #[serde(default)]
    pub time: Option<TimeConditions>,
    #[serde(default)]
    pub items: Option<ItemConditions>,
    #[serde(default)]
    pub customer: Option<CustomerConditions>,
    #[serde(default)]
    pub order: Option<OrderConditions>,
    #[serde(default)]
    pub custom: Option<serde_json::Value>,
}

impl RuleConditions {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(c) = &self.customer {
            if c.new_customer == Some(true) {
                if let Some(min_orders) = c.min_orders {
                    if min_orders > 0 {
                        return Err(
                            "customer.new_customer=true forbids customer.min_orders > 0".into(),
                        );
                    }
                }
            }
        }
        if let Some(t) = &self.time {
            for field in [&t.start_time, &t.end_time] {
                if let Some(s) = field {
                    if parse_hhmm(s).is_none() {
                        return Err(format!("invalid HH:MM time value: {}", s));
                    }
                }
            }
            if let Some(days) = &t.days_of_week {
                if days.iter().any(|d| *d > 6) {
                    return Err("time.days_of_week entries must be 0-6".into());
                }
            }
        }
        Ok(())
    }
}

/// Parses `HH:MM` into minutes-since-midnight.
pub fn parse_hhmm(s: &str) -> Option<u32> {
    let (h, m) = s.split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

/// True if `minutes_of_day` falls in `[start, end)`, handling the case
/// where the range spans midnight (`start > end`).
pub fn time_in_range(minutes_of_day: u32, start: u32, end: u32) -> bool {
    if start <= end {
        minutes_of_day >= start && minutes_of_day < end
    } else {
        minutes_of_day >= start || minutes_of_day < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hhmm_accepts_valid_times() {
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("09:30"), Some(570));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
    }

    #[test]
    fn parse_hhmm_rejects_out_of_range() {
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("not-a-time"), None);
    }

    #[test]
    fn time_in_range_handles_same_day_window() {
        assert!(time_in_range(600, 540, 660));
        assert!(!time_in_range(700, 540, 660));
    }

    #[test]
    fn time_in_range_handles_midnight_spanning_window() {
        // 22:00 - 02:00
        assert!(time_in_range(23 * 60, 22 * 60, 2 * 60));
        assert!(time_in_range(30, 22 * 60, 2 * 60));
        assert!(!time_in_range(12 * 60, 22 * 60, 2 * 60));
    }

    #[test]
    fn new_customer_flag_forbids_min_orders_requirement() {
        let conditions = RuleConditions {
            customer: Some(CustomerConditions {
                new_customer: Some(true),
                min_orders: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(conditions.validate().is_err());
    }

    #[test]
    fn invalid_time_string_fails_validation() {
        let conditions = RuleConditions {
            time: Some(TimeConditions {
                start_time: Some("25:00".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(conditions.validate().is_err());
    }

    #[test]
    fn well_formed_conditions_validate() {
        let conditions = RuleConditions {
            time: Some(TimeConditions {
                start_time: Some("09:00".into()),
                end_time: Some("17:00".into()),
                days_of_week: Some(vec![0, 1, 2, 3, 4]),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(conditions.validate().is_ok());
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugTraceEntry {
    pub kind: String,
    pub message: String,
    pub detail: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleEvaluationResult {
    pub rule_id: String,
    pub rule_name: String,
    pub priority: i16,
    pub stackable: bool,
    pub applicable: bool,
    pub conditions_met: serde_json::Value,
    pub skip_reason: Option<String>,
    pub discount_amount: Decimal,
    /// `rule_id`s this rule cannot stack alongside, per
    /// `pricing_rule::Model::excluded_ids()`.
    pub excluded_rule_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingRuleDebugInfo {
    pub order_id: i64,
    pub rules_evaluated: usize,
    pub rules_applied: usize,
    pub total_discount: Decimal,
    pub evaluation_results: Vec<RuleEvaluationResult>,
    pub debug_traces: Vec<DebugTraceEntry>,
    pub total_evaluation_time_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
    pub applications: Vec<ApplicationView>,
    pub debug: Option<PricingRuleDebugInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub rule_id: String,
    pub discount_amount: Decimal,
    pub original_amount: Decimal,
    pub final_amount: Decimal,
}

/// Create/update payload for a pricing rule definition, spec.md §4.2 "C2
/// public contract". `conditions` is validated structurally by
/// `PricingEngine::validate` before the row is written.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct UpsertRuleRequest {
    pub restaurant_id: i64,
    #[validate(length(min = 1))]
    pub name: String,
    pub rule_type: crate::entity::pricing_rule::RuleType,
    #[serde(default = "default_rule_status")]
    pub status: crate::entity::pricing_rule::RuleStatus,
    pub priority: i16,
    pub discount_value: Decimal,
    #[serde(default)]
    pub max_discount_amount: Option<Decimal>,
    #[serde(default)]
    pub min_order_amount: Decimal,
    #[serde(default)]
    pub conditions: serde_json::Value,
    pub valid_from: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub valid_until: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub max_uses: Option<i32>,
    #[serde(default)]
    pub max_uses_per_customer: Option<i32>,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default)]
    pub excluded_rule_ids: Vec<String>,
    #[serde(default)]
    pub conflict_resolution: Option<crate::entity::restaurant::ConflictResolution>,
    #[serde(default)]
    pub promo_code: Option<String>,
}

fn default_rule_status() -> crate::entity::pricing_rule::RuleStatus {
    crate::entity::pricing_rule::RuleStatus::Active
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleView {
    pub rule_id: String,
    pub restaurant_id: i64,
    pub name: String,
    pub rule_type: crate::entity::pricing_rule::RuleType,
    pub status: crate::entity::pricing_rule::RuleStatus,
    pub priority: i16,
    pub discount_value: Decimal,
    pub stackable: bool,
    pub current_uses: i32,
}

impl From<crate::entity::pricing_rule::Model> for RuleView {
    fn from(m: crate::entity::pricing_rule::Model) -> Self {
        Self {
            rule_id: m.rule_id,
            restaurant_id: m.restaurant_id,
            name: m.name,
            rule_type: m.rule_type,
            status: m.status,
            priority: m.priority,
            discount_value: m.discount_value,
            stackable: m.stackable,
            current_uses: m.current_uses,
        }
    }
}
