pub mod defaults;
pub mod resolver;
pub mod skills_policy;
pub mod types;
