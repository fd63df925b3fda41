// Tenancy root
pub mod restaurant;
pub mod customer;

// Menu / order surface (external collaborator's concept, minimally modeled
// so C5 has something to load and mutate)
pub mod menu_item;
pub mod order;
pub mod order_item;

// Recipe Inventory Deductor (C1)
pub mod inventory;
pub mod inventory_adjustment;
pub mod recipe;
pub mod recipe_ingredient;
pub mod recipe_sub_recipe;
pub mod menu_item_inventory;

// Pricing Rule Engine (C2)
pub mod pricing_rule;
pub mod pricing_rule_application;
pub mod pricing_rule_metric;

// Queue Sequencer & Rebalancer (C4)
pub mod order_queue;
pub mod queue_item;
pub mod queue_item_status_history;
pub mod queue_sequence_rule;
pub mod queue_metric;

// Priority Scorer (C3)
pub mod priority_rule;
pub mod priority_profile;
pub mod priority_profile_rule;
pub mod queue_priority_config;
pub mod order_priority_score;
pub mod priority_adjustment_log;
