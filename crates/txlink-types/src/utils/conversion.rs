//! Conversion utilities for values exchanged with wallets.
//!
//! Wallet JSON-RPC encodes numbers as `0x`-prefixed hex quantities and
//! addresses as hex strings. These helpers turn them into typed values.

use super::formatting::without_0x_prefix;
use alloy_primitives::{Address, U256};

/// Parses an address string, with or without "0x" prefix.
pub fn parse_address(value: &str) -> Result<Address, String> {
	let trimmed = value.trim();
	let hex = without_0x_prefix(trimmed);
	if hex.len() != 40 {
		return Err(format!(
			"Invalid address length: expected 40 hex characters, got {}",
			hex.len()
		));
	}
	format!("0x{hex}")
		.parse::<Address>()
		.map_err(|e| format!("Invalid address '{}': {}", trimmed, e))
}

/// Parses a JSON-RPC hex quantity such as `"0x1a"`.
pub fn parse_hex_quantity(value: &str) -> Result<U256, String> {
	let hex = without_0x_prefix(value.trim());
	if hex.is_empty() {
		return Err(format!("Invalid hex quantity '{}'", value));
	}
	U256::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex quantity '{}': {}", value, e))
}
