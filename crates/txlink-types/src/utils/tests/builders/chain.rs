//! Chain entry builder for registry tests.

use crate::chain::{ChainContracts, ChainDescriptor, ChainEntry, NativeCurrency};
use alloy_primitives::Address;

/// Builder for [`ChainEntry`] values, defaulting to a local dev chain.
#[derive(Debug, Clone)]
pub struct ChainEntryBuilder {
	id: u64,
	name: String,
	rpc_endpoint: String,
	explorer_base_url: String,
	native_currency: NativeCurrency,
	router: Option<Address>,
	wrapped_native: Option<Address>,
}

impl Default for ChainEntryBuilder {
	fn default() -> Self {
		Self {
			id: 31337,
			name: "Local Devnet".to_string(),
			rpc_endpoint: "http://localhost:8545".to_string(),
			explorer_base_url: "http://localhost:4000".to_string(),
			native_currency: NativeCurrency::new("Ether", "ETH"),
			router: Some(Address::repeat_byte(0xaa)),
			wrapped_native: Some(Address::repeat_byte(0xbb)),
		}
	}
}

impl ChainEntryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_id(mut self, id: u64) -> Self {
		self.id = id;
		self
	}

	pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
		self.name = name.into();
		self
	}

	pub fn with_rpc_endpoint<S: Into<String>>(mut self, rpc: S) -> Self {
		self.rpc_endpoint = rpc.into();
		self
	}

	pub fn with_explorer<S: Into<String>>(mut self, explorer: S) -> Self {
		self.explorer_base_url = explorer.into();
		self
	}

	pub fn with_native_currency(mut self, currency: NativeCurrency) -> Self {
		self.native_currency = currency;
		self
	}

	pub fn with_router(mut self, router: Option<Address>) -> Self {
		self.router = router;
		self
	}

	pub fn with_wrapped_native(mut self, wrapped: Option<Address>) -> Self {
		self.wrapped_native = wrapped;
		self
	}

	/// Builds only the descriptor part.
	pub fn build_descriptor(self) -> ChainDescriptor {
		self.build().descriptor
	}

	pub fn build(self) -> ChainEntry {
		ChainEntry {
			descriptor: ChainDescriptor {
				id: self.id,
				name: self.name,
				rpc_endpoint: self.rpc_endpoint,
				explorer_base_url: self.explorer_base_url,
				native_currency: self.native_currency,
			},
			contracts: ChainContracts {
				router: self.router,
				wrapped_native: self.wrapped_native,
			},
		}
	}
}
