//! Exact decimal amounts and base-unit conversion.
//!
//! Human amounts travel through the pipeline as validated decimal strings and
//! are only turned into integer base units, using the token's precision,
//! right before a call is built. All arithmetic is integer arithmetic on
//! `U256`; nothing passes through floating point.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Precision of native currency and the fallback for tokens.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest precision for which `10^decimals` fits comfortably in a U256.
const MAX_DECIMALS: u8 = 77;

/// Errors raised while validating or converting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
	#[error("Amount is empty")]
	Empty,
	#[error("Invalid amount '{0}': expected a non-negative decimal number")]
	InvalidFormat(String),
	#[error("Amount '{amount}' has {digits} fractional digits, token supports {decimals}")]
	TooManyDecimals {
		amount: String,
		digits: usize,
		decimals: u8,
	},
	#[error("Amount '{0}' does not fit in 256 bits")]
	Overflow(String),
	#[error("Unsupported token precision: {0}")]
	UnsupportedPrecision(u8),
}

/// Non-negative decimal amount in human units, e.g. `"10"` or `"0.25"`.
///
/// Construction validates the shape (`digits[.digits]`, no sign, no
/// exponent); the input spelling is preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAmount {
	raw: String,
}

impl TokenAmount {
	pub fn zero() -> Self {
		Self {
			raw: "0".to_string(),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Integer and fractional digit runs, fraction without trailing zeros.
	fn parts(&self) -> (&str, &str) {
		match self.raw.split_once('.') {
			Some((whole, fraction)) => (whole, fraction.trim_end_matches('0')),
			None => (self.raw.as_str(), ""),
		}
	}

	/// Number of significant fractional digits.
	pub fn fractional_digits(&self) -> usize {
		self.parts().1.len()
	}

	pub fn is_zero(&self) -> bool {
		self.raw.chars().all(|c| c == '0' || c == '.')
	}

	/// Converts to integer base units with `decimals` precision.
	///
	/// Fails when the amount carries more significant fractional digits than
	/// the precision supports; no rounding ever happens.
	pub fn to_base_units(&self, decimals: u8) -> Result<U256, AmountError> {
		if decimals > MAX_DECIMALS {
			return Err(AmountError::UnsupportedPrecision(decimals));
		}
		let (whole, fraction) = self.parts();
		if fraction.len() > decimals as usize {
			return Err(AmountError::TooManyDecimals {
				amount: self.raw.clone(),
				digits: fraction.len(),
				decimals,
			});
		}

		let overflow = || AmountError::Overflow(self.raw.clone());
		let scale = U256::from(10u8).pow(U256::from(decimals));
		let whole_units = parse_digits(whole)
			.ok_or_else(overflow)?
			.checked_mul(scale)
			.ok_or_else(overflow)?;

		let padded = format!("{:0<width$}", fraction, width = decimals as usize);
		let fraction_units = parse_digits(&padded).ok_or_else(overflow)?;

		whole_units.checked_add(fraction_units).ok_or_else(overflow)
	}

	/// Builds an amount back from base units.
	pub fn from_base_units(value: U256, decimals: u8) -> Self {
		Self {
			raw: format_units(value, decimals),
		}
	}
}

fn parse_digits(digits: &str) -> Option<U256> {
	if digits.is_empty() {
		return Some(U256::ZERO);
	}
	U256::from_str_radix(digits, 10).ok()
}

impl FromStr for TokenAmount {
	type Err = AmountError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		if trimmed.is_empty() {
			return Err(AmountError::Empty);
		}

		let (whole, fraction) = match trimmed.split_once('.') {
			Some((whole, fraction)) => (whole, Some(fraction)),
			None => (trimmed, None),
		};
		let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
		let valid = match fraction {
			Some(fraction) => {
				(!whole.is_empty() || !fraction.is_empty())
					&& all_digits(whole)
					&& all_digits(fraction)
			},
			None => all_digits(whole),
		};
		if !valid {
			return Err(AmountError::InvalidFormat(trimmed.to_string()));
		}

		Ok(Self {
			raw: trimmed.to_string(),
		})
	}
}

impl TryFrom<String> for TokenAmount {
	type Error = AmountError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<TokenAmount> for String {
	fn from(amount: TokenAmount) -> Self {
		amount.raw
	}
}

impl fmt::Display for TokenAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

/// Parses a human amount string straight into base units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, AmountError> {
	amount.parse::<TokenAmount>()?.to_base_units(decimals)
}

/// Formats base units as a human decimal string without trailing zeros.
///
/// A precision that does not fit in `U256` leaves the value unscaled.
pub fn format_units(value: U256, decimals: u8) -> String {
	if decimals == 0 || decimals > MAX_DECIMALS {
		return value.to_string();
	}
	let scale = U256::from(10u8).pow(U256::from(decimals));
	let whole = value / scale;
	let fraction = value % scale;
	if fraction.is_zero() {
		return whole.to_string();
	}

	let fraction_str = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
	format!("{}.{}", whole, fraction_str.trim_end_matches('0'))
}
