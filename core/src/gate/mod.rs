pub mod batch;
pub mod decision;
pub mod evaluate_rules;
pub mod fact;
