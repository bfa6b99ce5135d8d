pub mod determinism;
pub mod gate;
pub mod policy;
pub mod rules;

pub mod error;
