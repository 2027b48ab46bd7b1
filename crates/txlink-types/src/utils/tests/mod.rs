//! Test builders for txlink types
//!
//! Fluent builder APIs for constructing plans and chain entries with
//! sensible defaults, for TESTING purposes.
pub mod builders;
