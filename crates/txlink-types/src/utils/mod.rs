//! Utility functions for amounts, hex values and display formatting.

pub mod amount;
pub mod conversion;
pub mod formatting;
pub mod tests;

pub use amount::{format_units, parse_units, AmountError, TokenAmount, DEFAULT_DECIMALS};
pub use conversion::{parse_address, parse_hex_quantity};
pub use formatting::{truncate_hex, without_0x_prefix};
