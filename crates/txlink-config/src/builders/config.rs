//! Configuration builder for creating test and development configurations.
//!
//! This module provides utilities for constructing Config instances with
//! sensible defaults, particularly useful for testing scenarios.

use crate::{
	ChainConfig, Config, ExecutionConfig, GasOverride, IntentConfig, VerificationConfig,
	WalletConfig,
};
use std::collections::HashMap;
use txlink_types::{ActionKind, SecretString};

/// Builder for creating `Config` instances with a fluent API.
///
/// The result is not validated; use it where a `Config` is needed without
/// going through TOML.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	private_key: Option<SecretString>,
	default_chain: Option<u64>,
	poll_interval_ms: u64,
	chains: Vec<ChainConfig>,
	gas: HashMap<String, GasOverride>,
	verification: Option<VerificationConfig>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with fast polling suitable for tests.
	pub fn new() -> Self {
		Self {
			private_key: None,
			default_chain: None,
			poll_interval_ms: 10,
			chains: Vec::new(),
			gas: HashMap::new(),
			verification: None,
		}
	}

	/// Sets the signer private key.
	pub fn private_key(mut self, key: &str) -> Self {
		self.private_key = Some(SecretString::from(key));
		self
	}

	pub fn default_chain(mut self, chain_id: u64) -> Self {
		self.default_chain = Some(chain_id);
		self
	}

	/// Sets the receipt poll interval in milliseconds.
	pub fn poll_interval_ms(mut self, interval: u64) -> Self {
		self.poll_interval_ms = interval;
		self
	}

	/// Adds a chain entry.
	pub fn chain(mut self, chain: ChainConfig) -> Self {
		self.chains.push(chain);
		self
	}

	/// Sets the gas override for one kind of step.
	pub fn gas(mut self, action: ActionKind, gas: GasOverride) -> Self {
		self.gas.insert(action.to_string(), gas);
		self
	}

	/// Requires HS256-signed links with the given secret and issuer.
	pub fn verification(mut self, secret: &str, issuer: Option<&str>) -> Self {
		self.verification = Some(VerificationConfig {
			secret: SecretString::from(secret),
			issuer: issuer.map(str::to_string),
		});
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		Config {
			wallet: WalletConfig {
				private_key: self.private_key,
				default_chain: self.default_chain,
				poll_interval_ms: self.poll_interval_ms,
			},
			chains: self.chains,
			execution: ExecutionConfig { gas: self.gas },
			intent: IntentConfig {
				verification: self.verification,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_sets_sections() {
		let config = ConfigBuilder::new()
			.poll_interval_ms(5)
			.gas(
				ActionKind::Swap,
				GasOverride {
					gas_limit: Some(1_000_000),
					gas_price_gwei: None,
				},
			)
			.verification("secret", Some("txlink"))
			.build();

		assert_eq!(config.wallet.poll_interval_ms, 5);
		assert_eq!(
			config.execution.gas_for(ActionKind::Swap).unwrap().gas_limit,
			Some(1_000_000)
		);
		assert!(config.intent.verification.is_some());
		assert!(config.wallet.private_key.is_none());
	}
}
