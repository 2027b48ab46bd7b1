//! Chain descriptors and the static chain registry.
//!
//! Every plan is bound to exactly one chain. The registry maps a numeric
//! chain id to its descriptor (name, RPC endpoint, explorer, native currency)
//! and to the per-chain contract table (swap router and wrapped native token)
//! used by the wrap and swap flows.

use alloy_primitives::{address, Address};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Native currency of a chain as presented to wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
}

impl NativeCurrency {
	/// Native currency with the conventional 18 decimals.
	pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			symbol: symbol.into(),
			decimals: 18,
		}
	}
}

/// Immutable description of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
	pub id: u64,
	pub name: String,
	pub rpc_endpoint: String,
	pub explorer_base_url: String,
	pub native_currency: NativeCurrency,
}

impl ChainDescriptor {
	/// Chain id in the `0x`-prefixed hex form wallets expect.
	pub fn id_hex(&self) -> String {
		format!("0x{:x}", self.id)
	}

	/// Explorer link for a transaction hash.
	pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
		format!(
			"{}/tx/{}",
			self.explorer_base_url.trim_end_matches('/'),
			tx_hash
		)
	}
}

impl fmt::Display for ChainDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.id)
	}
}

/// Contracts the wrap and swap flows call on a given chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainContracts {
	/// Router exposing `swapExactTokensForTokens`.
	pub router: Option<Address>,
	/// Wrapped native token exposing `deposit()`.
	pub wrapped_native: Option<Address>,
}

/// Registry entry: descriptor plus its contract table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
	pub descriptor: ChainDescriptor,
	pub contracts: ChainContracts,
}

/// Chain id to descriptor and contract lookup.
///
/// `ChainRegistry::default()` holds the built-in Cronos networks; callers
/// extend or override entries with [`ChainRegistry::insert`].
#[derive(Debug, Clone)]
pub struct ChainRegistry {
	entries: HashMap<u64, ChainEntry>,
}

static BUILTIN_CHAINS: Lazy<Vec<ChainEntry>> = Lazy::new(|| {
	vec![
		ChainEntry {
			descriptor: ChainDescriptor {
				id: 25,
				name: "Cronos Mainnet".to_string(),
				rpc_endpoint: "https://evm.cronos.org".to_string(),
				explorer_base_url: "https://explorer.cronos.org".to_string(),
				native_currency: NativeCurrency::new("Cronos", "CRO"),
			},
			contracts: ChainContracts {
				router: Some(address!("66C0893E38B2a52E1Dc442b2dE75B802CcA49566")),
				wrapped_native: Some(address!("5C7F8A570d578ED84E63fdFA7b1eE72dEae1AE23")),
			},
		},
		ChainEntry {
			descriptor: ChainDescriptor {
				id: 338,
				name: "Cronos Testnet".to_string(),
				rpc_endpoint: "https://evm-t3.cronos.org".to_string(),
				explorer_base_url: "https://explorer.cronos.org/testnet".to_string(),
				native_currency: NativeCurrency::new("Cronos Test Coin", "TCRO"),
			},
			contracts: ChainContracts {
				router: Some(address!("C74C960708f043E04a84038c6D1136EA7Fcb16a1")),
				wrapped_native: Some(address!("6a3173618859c7cd40faf6921b5e9eb6a76f1fd4")),
			},
		},
		ChainEntry {
			descriptor: ChainDescriptor {
				id: 388,
				name: "Cronos zkEVM Mainnet".to_string(),
				rpc_endpoint: "https://mainnet.zkevm.cronos.org".to_string(),
				explorer_base_url: "https://explorer.zkevm.cronos.org".to_string(),
				native_currency: NativeCurrency::new("Cronos zkEVM CRO", "zkCRO"),
			},
			contracts: ChainContracts {
				router: Some(address!("4E792B8c9bcB9E200C3713810C4D6eA8C4230E7c")),
				wrapped_native: Some(address!("C1bF55EE54E16229d9b369a5502Bfe5fC9F20b6d")),
			},
		},
		ChainEntry {
			descriptor: ChainDescriptor {
				id: 240,
				name: "Cronos zkEVM Testnet".to_string(),
				rpc_endpoint: "https://testnet.zkevm.cronos.org".to_string(),
				explorer_base_url: "https://explorer.zkevm.cronos.org/testnet".to_string(),
				native_currency: NativeCurrency::new("Cronos zkEVM Test Coin", "zkTCRO"),
			},
			contracts: ChainContracts {
				router: Some(address!("9EB4db2E31259444c5C2123bec8B17a510C4c72B")),
				wrapped_native: Some(address!("eD73b53197189BE3Ff978069cf30eBc28a8B5837")),
			},
		},
	]
});

impl Default for ChainRegistry {
	fn default() -> Self {
		Self::builtin()
	}
}

impl ChainRegistry {
	/// Registry with no entries.
	pub fn empty() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}

	/// Registry pre-populated with the built-in networks.
	pub fn builtin() -> Self {
		let mut registry = Self::empty();
		for entry in BUILTIN_CHAINS.iter() {
			registry.insert(entry.clone());
		}
		registry
	}

	/// Adds or replaces the entry for `entry.descriptor.id`.
	pub fn insert(&mut self, entry: ChainEntry) {
		self.entries.insert(entry.descriptor.id, entry);
	}

	pub fn get(&self, chain_id: u64) -> Option<&ChainEntry> {
		self.entries.get(&chain_id)
	}

	pub fn descriptor(&self, chain_id: u64) -> Option<&ChainDescriptor> {
		self.entries.get(&chain_id).map(|entry| &entry.descriptor)
	}

	pub fn contracts(&self, chain_id: u64) -> Option<&ChainContracts> {
		self.entries.get(&chain_id).map(|entry| &entry.contracts)
	}

	/// Registered chain ids in ascending order.
	pub fn chain_ids(&self) -> Vec<u64> {
		let mut ids: Vec<u64> = self.entries.keys().copied().collect();
		ids.sort_unstable();
		ids
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builtin_registry_contains_cronos_networks() {
		let registry = ChainRegistry::builtin();
		assert_eq!(registry.chain_ids(), vec![25, 240, 338, 388]);

		let zk_testnet = registry.descriptor(240).unwrap();
		assert_eq!(zk_testnet.name, "Cronos zkEVM Testnet");
		assert_eq!(zk_testnet.native_currency.symbol, "zkTCRO");
		assert_eq!(zk_testnet.native_currency.decimals, 18);
	}

	#[test]
	fn test_contract_table_lookup() {
		let registry = ChainRegistry::builtin();
		let contracts = registry.contracts(240).unwrap();
		assert_eq!(
			contracts.router,
			Some(address!("9EB4db2E31259444c5C2123bec8B17a510C4c72B"))
		);
		assert_eq!(
			contracts.wrapped_native,
			Some(address!("eD73b53197189BE3Ff978069cf30eBc28a8B5837"))
		);
		assert!(registry.contracts(1).is_none());
	}

	#[test]
	fn test_insert_overrides_existing_entry() {
		let mut registry = ChainRegistry::builtin();
		let mut entry = registry.get(338).unwrap().clone();
		entry.descriptor.rpc_endpoint = "http://localhost:8545".to_string();
		entry.contracts.router = None;
		registry.insert(entry);

		assert_eq!(registry.len(), 4);
		assert_eq!(
			registry.descriptor(338).unwrap().rpc_endpoint,
			"http://localhost:8545"
		);
		assert!(registry.contracts(338).unwrap().router.is_none());
	}

	#[test]
	fn test_descriptor_hex_id_and_explorer_url() {
		let registry = ChainRegistry::builtin();
		let chain = registry.descriptor(338).unwrap();
		assert_eq!(chain.id_hex(), "0x152");
		assert_eq!(
			chain.explorer_tx_url("0xabc"),
			"https://explorer.cronos.org/testnet/tx/0xabc"
		);
	}
}
