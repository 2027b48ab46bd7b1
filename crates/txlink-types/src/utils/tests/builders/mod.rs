//! Builder patterns for txlink types
//!
//! Fluent builders with sensible defaults, shared by the test suites of the
//! downstream crates.

pub mod chain;
pub mod plan;

pub use chain::ChainEntryBuilder;
pub use plan::OperationPlanBuilder;
