//! Token metadata for display.
//!
//! Reads `name`, `symbol`, `decimals` and `totalSupply` of the tokens a plan
//! touches through a non-signing [`TokenReader`]. Lookups never fail: a
//! problem comes back as a [`TokenInfo`] with empty fields and an `error`.
//! Successful lookups are cached per chain and address. Nothing here gates
//! execution.

/// Re-export implementations
pub mod implementations {
	pub mod alloy;
}

pub use implementations::alloy::AlloyTokenReader;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;
use txlink_types::{ChainDescriptor, OperationPlan, TokenInfo};

/// Shown when a lookup has no usable token or chain to work with.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token address or chain configuration";

/// Errors raised by a [`TokenReader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
	#[error("Invalid RPC endpoint: {0}")]
	InvalidEndpoint(String),
	#[error("RPC error: {0}")]
	Rpc(String),
	#[error("Invalid response: {0}")]
	Decode(String),
}

/// Read-only access to ERC-20 metadata on a chain.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenReader: Send + Sync {
	async fn name(&self, chain: &ChainDescriptor, token: Address) -> Result<String, MetadataError>;

	async fn symbol(&self, chain: &ChainDescriptor, token: Address)
		-> Result<String, MetadataError>;

	async fn decimals(&self, chain: &ChainDescriptor, token: Address) -> Result<u8, MetadataError>;

	async fn total_supply(
		&self,
		chain: &ChainDescriptor,
		token: Address,
	) -> Result<U256, MetadataError>;
}

/// Resolves and caches [`TokenInfo`] per `(chain_id, address)`.
pub struct TokenMetadataResolver {
	reader: Arc<dyn TokenReader>,
	cache: RwLock<HashMap<(u64, Address), TokenInfo>>,
}

impl TokenMetadataResolver {
	pub fn new(reader: Arc<dyn TokenReader>) -> Self {
		Self {
			reader,
			cache: RwLock::new(HashMap::new()),
		}
	}

	/// Metadata of `address` on `chain`; never fails.
	#[instrument(skip(self, chain), fields(chain_id = chain.id))]
	pub async fn resolve(&self, chain: &ChainDescriptor, address: Address) -> TokenInfo {
		if address.is_zero() || chain.rpc_endpoint.trim().is_empty() {
			return TokenInfo::failed(None, INVALID_TOKEN_MESSAGE);
		}
		if let Some(info) = self.cached(chain.id, address).await {
			return info;
		}

		let fetched = tokio::try_join!(
			self.reader.name(chain, address),
			self.reader.symbol(chain, address),
			self.reader.decimals(chain, address),
			self.reader.total_supply(chain, address),
		);

		match fetched {
			Ok((name, symbol, decimals, total_supply)) => {
				let info = TokenInfo {
					address: Some(address),
					name,
					symbol,
					decimals,
					total_supply,
					error: None,
				};
				self.cache
					.write()
					.await
					.insert((chain.id, address), info.clone());
				info
			},
			Err(e) => {
				tracing::warn!(token = %address, "Token metadata lookup failed: {}", e);
				TokenInfo::failed(Some(address), format!("Failed to fetch token info: {e}"))
			},
		}
	}

	/// Metadata of every token the plan names, looked up concurrently.
	pub async fn resolve_plan(&self, plan: &OperationPlan) -> Vec<TokenInfo> {
		join_all(
			plan.token_addresses()
				.into_iter()
				.map(|address| self.resolve(&plan.chain, address)),
		)
		.await
	}

	pub async fn cached(&self, chain_id: u64, address: Address) -> Option<TokenInfo> {
		self.cache.read().await.get(&(chain_id, address)).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use txlink_types::utils::tests::builders::OperationPlanBuilder;
	use txlink_types::ChainRegistry;

	const TOKEN: Address = Address::repeat_byte(0x11);

	fn chain() -> ChainDescriptor {
		ChainRegistry::builtin().descriptor(240).cloned().unwrap()
	}

	fn mock_token(mock: &mut MockTokenReader, times: usize) {
		mock.expect_name()
			.times(times)
			.returning(|_, _| Box::pin(async { Ok("Wrapped zkTCRO".to_string()) }));
		mock.expect_symbol()
			.times(times)
			.returning(|_, _| Box::pin(async { Ok("WzkTCRO".to_string()) }));
		mock.expect_decimals()
			.times(times)
			.returning(|_, _| Box::pin(async { Ok(18) }));
		mock.expect_total_supply()
			.times(times)
			.returning(|_, _| Box::pin(async { Ok(U256::from(5u8) * U256::from(10u64.pow(18))) }));
	}

	#[tokio::test]
	async fn test_resolve_reads_all_fields() {
		let mut mock = MockTokenReader::new();
		mock_token(&mut mock, 1);
		let resolver = TokenMetadataResolver::new(Arc::new(mock));

		let info = resolver.resolve(&chain(), TOKEN).await;

		assert!(info.is_ok());
		assert_eq!(info.address, Some(TOKEN));
		assert_eq!(info.name, "Wrapped zkTCRO");
		assert_eq!(info.symbol, "WzkTCRO");
		assert_eq!(info.decimals, 18);
		assert_eq!(info.formatted_supply(), "5");
	}

	#[tokio::test]
	async fn test_successful_lookups_are_cached() {
		let mut mock = MockTokenReader::new();
		mock_token(&mut mock, 1);
		let resolver = TokenMetadataResolver::new(Arc::new(mock));

		let first = resolver.resolve(&chain(), TOKEN).await;
		let second = resolver.resolve(&chain(), TOKEN).await;

		assert_eq!(first, second);
		assert!(resolver.cached(240, TOKEN).await.is_some());
		assert!(resolver.cached(25, TOKEN).await.is_none());
	}

	#[tokio::test]
	async fn test_failed_lookup_is_soft_and_not_cached() {
		let mut mock = MockTokenReader::new();
		mock.expect_name()
			.times(2)
			.returning(|_, _| Box::pin(async { Err(MetadataError::Rpc("execution reverted".into())) }));
		mock.expect_symbol()
			.returning(|_, _| Box::pin(async { Ok("X".to_string()) }));
		mock.expect_decimals()
			.returning(|_, _| Box::pin(async { Ok(6) }));
		mock.expect_total_supply()
			.returning(|_, _| Box::pin(async { Ok(U256::ZERO) }));
		let resolver = TokenMetadataResolver::new(Arc::new(mock));

		let info = resolver.resolve(&chain(), TOKEN).await;
		assert_eq!(
			info.error.as_deref(),
			Some("Failed to fetch token info: RPC error: execution reverted")
		);
		assert_eq!(info.name, "");
		assert_eq!(info.decimals, 18);

		resolver.resolve(&chain(), TOKEN).await;
		assert!(resolver.cached(240, TOKEN).await.is_none());
	}

	#[tokio::test]
	async fn test_empty_address_or_endpoint_is_invalid() {
		let resolver = TokenMetadataResolver::new(Arc::new(MockTokenReader::new()));

		let info = resolver.resolve(&chain(), Address::ZERO).await;
		assert_eq!(info.error.as_deref(), Some(INVALID_TOKEN_MESSAGE));

		let mut broken = chain();
		broken.rpc_endpoint = String::new();
		let info = resolver.resolve(&broken, TOKEN).await;
		assert_eq!(info.error.as_deref(), Some(INVALID_TOKEN_MESSAGE));
	}

	#[tokio::test]
	async fn test_resolve_plan_covers_swap_tokens() {
		let mut mock = MockTokenReader::new();
		mock_token(&mut mock, 2);
		let resolver = TokenMetadataResolver::new(Arc::new(mock));

		let infos = resolver
			.resolve_plan(&OperationPlanBuilder::swap().build())
			.await;

		let addresses: Vec<_> = infos.iter().filter_map(|info| info.address).collect();
		assert_eq!(
			addresses,
			vec![Address::repeat_byte(0x11), Address::repeat_byte(0x22)]
		);
	}
}
