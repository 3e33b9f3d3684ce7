// baton/src/plan/mod.rs

//! Defines the `ExecutionPlan` struct, its structural mutation, and its execution entry points.

pub mod definition;
pub mod execution;

// Re-export the main ExecutionPlan struct
pub use definition::ExecutionPlan;
