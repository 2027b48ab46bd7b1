//! String formatting utilities.
//!
//! Hex prefix stripping and short forms of addresses and hashes for
//! terminal output.

/// Shortens a hex string to its first 6 and last 4 characters.
pub fn truncate_hex(value: &str) -> String {
	if value.len() <= 12 {
		value.to_string()
	} else {
		format!("{}…{}", &value[..6], &value[value.len() - 4..])
	}
}

/// Removes "0x" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}
