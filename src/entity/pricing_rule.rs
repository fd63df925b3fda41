//! Pricing rule — spec.md §3 "Pricing rule" / §6 conditions document.
//!
//! `conditions` is stored as a JSON document shaped like
//! [`crate::models::pricing::RuleConditions`]; it is parsed on read rather
//! than mapped column-by-column, matching the "dynamic condition documents"
//! design note in spec.md §9 (tagged sections, schema-validated at
//! create/update time, fixed finite set of runtime evaluators).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RuleType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed")]
    Fixed,
    #[sea_orm(string_value = "bundle")]
    Bundle,
    #[sea_orm(string_value = "bogo")]
    Bogo,
    #[sea_orm(string_value = "happy_hour")]
    HappyHour,
    #[sea_orm(string_value = "quantity")]
    Quantity,
    #[sea_orm(string_value = "category")]
    Category,
    #[sea_orm(string_value = "time_based")]
    TimeBased,
    #[sea_orm(string_value = "custom")]
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RuleStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "testing")]
    Testing,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pricing_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[sea_orm(column_type = "Text")]
    pub rule_id: String,

    pub restaurant_id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub rule_type: RuleType,
    pub status: RuleStatus,

    /// 1 highest, 5 lowest.
    pub priority: i16,

    pub discount_value: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub min_order_amount: Decimal,

    /// `{time, items, customer, order, custom}` per spec.md §6.
    pub conditions: Json,

    pub valid_from: DateTimeWithTimeZone,
    pub valid_until: Option<DateTimeWithTimeZone>,

    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub max_uses_per_customer: Option<i32>,

    pub stackable: bool,
    /// JSON array of rule_id strings this rule cannot stack with.
    pub excluded_rule_ids: Json,

    pub conflict_resolution: Option<super::restaurant::ConflictResolution>,

    #[sea_orm(column_type = "Text", nullable)]
    pub promo_code: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// A rule is *effective* iff status=ACTIVE ∧ now ∈ [valid_from,
    /// valid_until) ∧ current_uses < max_uses (spec.md §3 invariant).
    pub fn is_effective(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        if self.status != RuleStatus::Active {
            return false;
        }
        if now < self.valid_from {
            return false;
        }
        if let Some(until) = self.valid_until {
            if now >= until {
                return false;
            }
        }
        if let Some(max) = self.max_uses {
            if self.current_uses >= max {
                return false;
            }
        }
        true
    }

    pub fn excluded_ids(&self) -> Vec<String> {
        self.excluded_rule_ids
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pricing_rule_application::Entity")]
    Applications,
}

impl Related<super::pricing_rule_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
