//! Customer — minimal profile fields the pricing rule and priority scorer
//! conditions read (loyalty tier, VIP flag, order history, tags).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub restaurant_id: i64,

    #[sea_orm(column_type = "Text", nullable)]
    pub name: Option<String>,

    /// "bronze" | "silver" | "gold" | "platinum", restaurant-defined.
    #[sea_orm(column_type = "Text", nullable)]
    pub loyalty_tier: Option<String>,
    pub loyalty_points: i32,

    pub is_vip: bool,
    pub orders_count: i32,

    /// Free-form tags matched by `customer.tags` pricing conditions.
    #[sea_orm(column_type = "Text")]
    pub tags_csv: String,

    /// 1-12, or null if unknown.
    pub birthday_month: Option<i16>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn tags(&self) -> Vec<&str> {
        self.tags_csv
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is_new_customer(&self) -> bool {
        self.orders_count == 0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
