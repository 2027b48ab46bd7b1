//! Alloy-backed token reader.
//!
//! Plain `eth_call`s over an HTTP provider per chain. No signer is
//! attached, so nothing here can send a transaction.

use crate::metadata::{MetadataError, TokenReader};
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use alloy_transport::layers::RetryBackoffLayer;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use txlink_types::ChainDescriptor;
use txlink_wallet::abi::IERC20;

/// Reads ERC-20 metadata over JSON-RPC.
///
/// Providers are built on first use from the chain descriptor's endpoint
/// and reused afterwards.
#[derive(Default)]
pub struct AlloyTokenReader {
	providers: RwLock<HashMap<u64, DynProvider>>,
}

impl AlloyTokenReader {
	pub fn new() -> Self {
		Self::default()
	}

	async fn provider(&self, chain: &ChainDescriptor) -> Result<DynProvider, MetadataError> {
		if let Some(provider) = self.providers.read().await.get(&chain.id) {
			return Ok(provider.clone());
		}

		let url = chain.rpc_endpoint.parse().map_err(|e| {
			MetadataError::InvalidEndpoint(format!("{} for chain {}: {}", chain.rpc_endpoint, chain.id, e))
		})?;
		// 5 retries, 1s initial backoff, 10 compute units per second
		let client = RpcClient::builder()
			.layer(RetryBackoffLayer::new(5, 1000, 10))
			.http(url);
		let provider = ProviderBuilder::new().connect_client(client).erased();

		self.providers
			.write()
			.await
			.insert(chain.id, provider.clone());
		Ok(provider)
	}

	async fn call<C: SolCall>(
		&self,
		chain: &ChainDescriptor,
		token: Address,
		call: C,
	) -> Result<C::Return, MetadataError> {
		let provider = self.provider(chain).await?;
		let request = TransactionRequest::default()
			.to(token)
			.input(call.abi_encode().into());

		let output = provider
			.call(request)
			.await
			.map_err(|e| MetadataError::Rpc(e.to_string()))?;
		C::abi_decode_returns(&output).map_err(|e| MetadataError::Decode(e.to_string()))
	}
}

#[async_trait]
impl TokenReader for AlloyTokenReader {
	async fn name(&self, chain: &ChainDescriptor, token: Address) -> Result<String, MetadataError> {
		self.call(chain, token, IERC20::nameCall {}).await
	}

	async fn symbol(
		&self,
		chain: &ChainDescriptor,
		token: Address,
	) -> Result<String, MetadataError> {
		self.call(chain, token, IERC20::symbolCall {}).await
	}

	async fn decimals(&self, chain: &ChainDescriptor, token: Address) -> Result<u8, MetadataError> {
		self.call(chain, token, IERC20::decimalsCall {}).await
	}

	async fn total_supply(
		&self,
		chain: &ChainDescriptor,
		token: Address,
	) -> Result<U256, MetadataError> {
		self.call(chain, token, IERC20::totalSupplyCall {}).await
	}
}
