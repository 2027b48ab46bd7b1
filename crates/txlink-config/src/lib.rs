//! Configuration module for the txlink pipeline.
//!
//! Loads TOML configuration, resolves `${VAR}` / `${VAR:-default}`
//! references from the environment and validates the result. Every section
//! is optional; an empty document yields a usable default configuration
//! backed by the built-in chain registry.
//!
//! ```toml
//! [wallet]
//! private_key = "${TXLINK_PRIVATE_KEY}"
//! poll_interval_ms = 1000
//!
//! [[chains]]
//! id = 31337
//! name = "Local Devnet"
//! rpc = "http://localhost:8545"
//! explorer = "http://localhost:4000"
//! currency_symbol = "ETH"
//!
//! [execution.gas.swap]
//! gas_limit = 1000000
//!
//! [intent.verification]
//! secret = "${TXLINK_LINK_SECRET}"
//! issuer = "txlink"
//! ```

pub mod builders;

pub use builders::config::ConfigBuilder;

use alloy_primitives::Address;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use txlink_types::{
	ActionKind, ChainContracts, ChainDescriptor, ChainEntry, ChainRegistry, NativeCurrency,
	SecretString,
};

/// Failures loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The file could not be read.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// The TOML is malformed or does not match the schema.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Parsed values are unusable.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// the message alone, without the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
	/// Signing wallet used by `txlink run`.
	#[serde(default)]
	pub wallet: WalletConfig,
	/// Chains added to or overriding the built-in registry.
	#[serde(default)]
	pub chains: Vec<ChainConfig>,
	/// Executor tuning.
	#[serde(default)]
	pub execution: ExecutionConfig,
	/// Intent decoding options.
	#[serde(default)]
	pub intent: IntentConfig,
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
	/// Hex private key of the local signer. Not needed for simulated runs.
	pub private_key: Option<SecretString>,
	/// Chain the wallet starts on before reconciliation.
	pub default_chain: Option<u64>,
	/// Interval between receipt polls in milliseconds.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

impl Default for WalletConfig {
	fn default() -> Self {
		Self {
			private_key: None,
			default_chain: None,
			poll_interval_ms: default_poll_interval_ms(),
		}
	}
}

fn default_poll_interval_ms() -> u64 {
	1000
}

/// A chain descriptor plus contract table entries.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
	pub id: u64,
	pub name: String,
	pub rpc: String,
	pub explorer: String,
	/// Native currency name; defaults to the symbol.
	pub currency_name: Option<String>,
	pub currency_symbol: String,
	/// Exact-in swap router.
	pub router: Option<Address>,
	/// Wrapped native token.
	pub wrapped_native: Option<Address>,
}

impl ChainConfig {
	fn to_entry(&self) -> ChainEntry {
		let currency_name = self
			.currency_name
			.clone()
			.unwrap_or_else(|| self.currency_symbol.clone());
		ChainEntry {
			descriptor: ChainDescriptor {
				id: self.id,
				name: self.name.clone(),
				rpc_endpoint: self.rpc.clone(),
				explorer_base_url: self.explorer.clone(),
				native_currency: NativeCurrency::new(currency_name, self.currency_symbol.clone()),
			},
			contracts: ChainContracts {
				router: self.router,
				wrapped_native: self.wrapped_native,
			},
		}
	}
}

/// Gas settings for one kind of on-chain step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct GasOverride {
	pub gas_limit: Option<u64>,
	/// Legacy gas price in gwei.
	pub gas_price_gwei: Option<u64>,
}

/// Executor configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionConfig {
	/// Per-step gas overrides keyed by step name
	/// (`transfer`, `deposit`, `approve`, `swap`).
	#[serde(default)]
	pub gas: HashMap<String, GasOverride>,
}

impl ExecutionConfig {
	/// Gas override for a step, if one is configured.
	pub fn gas_for(&self, action: ActionKind) -> Option<GasOverride> {
		self.gas.get(&action.to_string()).copied()
	}
}

/// Intent decoding configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentConfig {
	/// When set, link tokens must carry a valid HS256 signature.
	pub verification: Option<VerificationConfig>,
}

/// Shared secret and expected issuer for signed links.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
	pub secret: SecretString,
	pub issuer: Option<String>,
}

/// Largest config input accepted before `${VAR}` expansion.
const MAX_CONFIG_SIZE: usize = 1024 * 1024;

/// Expands `${VAR}` and `${VAR:-default}` references from the environment.
///
/// Names are upper-case identifiers of at most 128 characters; defaults
/// are at most 256 characters. An unset variable without a default is a validation error naming the
/// first such variable.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	if input.len() > MAX_CONFIG_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration is {} bytes, the limit is {MAX_CONFIG_SIZE}",
			input.len()
		)));
	}

	let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut missing: Option<String> = None;
	let resolved = pattern.replace_all(input, |caps: &Captures<'_>| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(name) => Err(ConfigError::Validation(format!(
			"Environment variable '{name}' not found"
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Io`] when the file cannot be read, and the
	/// parse or validation errors of [`Config::from_str`] otherwise.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path.as_ref()).await?;
		contents.parse()
	}

	/// Built-in registry with the configured chains applied on top.
	pub fn chain_registry(&self) -> ChainRegistry {
		let mut registry = ChainRegistry::builtin();
		for chain in &self.chains {
			registry.insert(chain.to_entry());
		}
		registry
	}

	/// Validates the configuration to ensure all values are usable.
	///
	/// - Chain ids are non-zero and unique, names and symbols non-empty
	/// - RPC and explorer endpoints are valid URLs
	/// - The default chain, if set, exists in the resulting registry
	/// - The private key, if set, is 32 bytes of hex
	/// - Gas override keys name known steps
	/// - The verification secret, if set, is non-empty
	fn validate(&self) -> Result<(), ConfigError> {
		if self.wallet.poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"wallet.poll_interval_ms must be greater than 0".into(),
			));
		}
		if let Some(key) = &self.wallet.private_key {
			key.with_exposed(validate_private_key)?;
		}

		let mut seen = std::collections::HashSet::new();
		for chain in &self.chains {
			if chain.id == 0 {
				return Err(ConfigError::Validation("Chain id cannot be 0".into()));
			}
			if !seen.insert(chain.id) {
				return Err(ConfigError::Validation(format!(
					"Chain {} is configured more than once",
					chain.id
				)));
			}
			if chain.name.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Chain {} must have a name",
					chain.id
				)));
			}
			if chain.currency_symbol.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Chain {} must have a currency_symbol",
					chain.id
				)));
			}
			for (field, value) in [("rpc", &chain.rpc), ("explorer", &chain.explorer)] {
				url::Url::parse(value).map_err(|e| {
					ConfigError::Validation(format!(
						"Chain {} has an invalid {field} URL '{value}': {e}",
						chain.id
					))
				})?;
			}
		}

		if let Some(default_chain) = self.wallet.default_chain {
			if self.chain_registry().get(default_chain).is_none() {
				return Err(ConfigError::Validation(format!(
					"wallet.default_chain {default_chain} is not a known chain"
				)));
			}
		}

		for key in self.execution.gas.keys() {
			if !matches!(key.as_str(), "transfer" | "deposit" | "approve" | "swap") {
				return Err(ConfigError::Validation(format!(
					"Unknown step '{key}' in execution.gas (expected transfer, deposit, approve or swap)"
				)));
			}
		}

		if let Some(verification) = &self.intent.verification {
			if verification.secret.is_empty() {
				return Err(ConfigError::Validation(
					"intent.verification.secret cannot be empty".into(),
				));
			}
		}

		Ok(())
	}
}

fn validate_private_key(key: &str) -> Result<(), ConfigError> {
	let key_without_prefix = key.strip_prefix("0x").unwrap_or(key);
	if key_without_prefix.len() != 64 {
		return Err(ConfigError::Validation(
			"Private key must be 64 hex characters (32 bytes)".into(),
		));
	}
	if hex::decode(key_without_prefix).is_err() {
		return Err(ConfigError::Validation(
			"Private key must be valid hexadecimal".into(),
		));
	}
	Ok(())
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TXLINK_TEST_HOST", "localhost");
		std::env::set_var("TXLINK_TEST_PORT", "8545");

		let input = "rpc = \"http://${TXLINK_TEST_HOST}:${TXLINK_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "rpc = \"http://localhost:8545\"");

		std::env::remove_var("TXLINK_TEST_HOST");
		std::env::remove_var("TXLINK_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${TXLINK_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${TXLINK_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("TXLINK_MISSING_VAR"));
	}

	#[test]
	fn test_empty_config_uses_defaults() {
		let config: Config = "".parse().unwrap();
		assert_eq!(config.wallet.poll_interval_ms, 1000);
		assert!(config.execution.gas.is_empty());
		assert!(config.intent.verification.is_none());
		assert_eq!(config.chain_registry().chain_ids(), vec![25, 240, 338, 388]);
	}

	#[test]
	fn test_full_config_with_env_vars() {
		std::env::set_var("TXLINK_TEST_KEY", TEST_KEY);

		let config_str = r#"
[wallet]
private_key = "${TXLINK_TEST_KEY}"
default_chain = 31337
poll_interval_ms = 250

[[chains]]
id = 31337
name = "Local Devnet"
rpc = "http://localhost:8545"
explorer = "http://localhost:4000/"
currency_symbol = "ETH"
router = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"

[execution.gas.approve]
gas_limit = 200000
gas_price_gwei = 5000
[execution.gas.swap]
gas_limit = 1000000

[intent.verification]
secret = "${TXLINK_TEST_SECRET:-shh}"
issuer = "txlink"
"#;
		let config: Config = config_str.parse().unwrap();
		std::env::remove_var("TXLINK_TEST_KEY");

		assert!(config
			.wallet
			.private_key
			.as_ref()
			.unwrap()
			.with_exposed(|k| k == TEST_KEY));
		assert_eq!(config.wallet.poll_interval_ms, 250);

		let registry = config.chain_registry();
		let local = registry.descriptor(31337).unwrap();
		assert_eq!(local.native_currency.name, "ETH");
		assert_eq!(local.explorer_tx_url("0x1"), "http://localhost:4000/tx/0x1");
		assert_eq!(
			registry.contracts(31337).unwrap().router,
			Some(Address::repeat_byte(0xaa))
		);
		assert!(registry.contracts(31337).unwrap().wrapped_native.is_none());

		assert_eq!(
			config.execution.gas_for(ActionKind::Approve),
			Some(GasOverride {
				gas_limit: Some(200000),
				gas_price_gwei: Some(5000),
			})
		);
		assert!(config.execution.gas_for(ActionKind::Deposit).is_none());

		let verification = config.intent.verification.unwrap();
		assert!(verification.secret.with_exposed(|s| s == "shh"));
		assert_eq!(verification.issuer.as_deref(), Some("txlink"));
	}

	#[test]
	fn test_chain_override_replaces_builtin() {
		let config: Config = r#"
[[chains]]
id = 338
name = "Cronos Testnet (local fork)"
rpc = "http://localhost:8545"
explorer = "https://explorer.cronos.org/testnet"
currency_symbol = "TCRO"
"#
		.parse()
		.unwrap();
		let registry = config.chain_registry();
		assert_eq!(registry.len(), 4);
		assert_eq!(
			registry.descriptor(338).unwrap().rpc_endpoint,
			"http://localhost:8545"
		);
		assert!(registry.contracts(338).unwrap().router.is_none());
	}

	#[test]
	fn test_duplicate_chain_rejected() {
		let chain = r#"
[[chains]]
id = 5
name = "Dup"
rpc = "http://localhost:8545"
explorer = "http://localhost:4000"
currency_symbol = "ETH"
"#;
		let err = format!("{chain}{chain}").parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("more than once"));
	}

	#[test]
	fn test_invalid_values_rejected() {
		let cases = [
			("[wallet]\nprivate_key = \"0x1234\"", "64 hex characters"),
			("[wallet]\npoll_interval_ms = 0", "poll_interval_ms"),
			("[wallet]\ndefault_chain = 1", "not a known chain"),
			("[execution.gas.bridge]\ngas_limit = 1", "Unknown step 'bridge'"),
			("[intent.verification]\nsecret = \"\"", "secret cannot be empty"),
			(
				"[[chains]]\nid = 7\nname = \"X\"\nrpc = \"not a url\"\nexplorer = \"http://x\"\ncurrency_symbol = \"X\"",
				"invalid rpc URL",
			),
		];
		for (input, expected) in cases {
			let err = input.parse::<Config>().unwrap_err();
			assert!(
				matches!(err, ConfigError::Validation(_)),
				"{input} should fail validation"
			);
			assert!(err.to_string().contains(expected), "{err} missing {expected}");
		}
	}

	#[test]
	fn test_parse_error_is_reported() {
		let err = "[wallet\n".parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[wallet]\npoll_interval_ms = 50").unwrap();
		let config = Config::from_file(file.path()).await.unwrap();
		assert_eq!(config.wallet.poll_interval_ms, 50);

		let missing = Config::from_file("/nonexistent/txlink.toml").await;
		assert!(matches!(missing, Err(ConfigError::Io(_))));
	}
}
