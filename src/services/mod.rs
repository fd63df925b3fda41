pub mod order_lifecycle;
pub mod pricing_engine;
pub mod priority_scorer;
pub mod queue_sequencer;
pub mod recipe_inventory;
