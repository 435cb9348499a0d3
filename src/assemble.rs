pub mod builder;
pub mod plan;
