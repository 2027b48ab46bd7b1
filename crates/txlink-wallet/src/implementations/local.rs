//! Key-backed wallet for running intents from the command line.
//!
//! Holds a private key and one Alloy provider per known chain, and answers
//! the same requests a browser wallet would. Switching to a chain that has
//! not been added fails with code 4902 so the network reconciler behaves the
//! same way against this wallet as against an injected one.

use crate::{methods, AddChainParams, WalletCapability, WalletError, WalletRequest};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::layers::RetryBackoffLayer;
use alloy_transport::TransportError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use txlink_types::{parse_hex_quantity, SecretString};

/// EIP-1193: the wallet is not connected to any chain.
const CHAIN_DISCONNECTED: i64 = 4901;

/// Wallet backed by a local private key.
pub struct LocalWallet {
	signer: PrivateKeySigner,
	providers: RwLock<HashMap<u64, DynProvider>>,
	active_chain: RwLock<Option<u64>>,
}

impl LocalWallet {
	pub fn new(signer: PrivateKeySigner) -> Self {
		Self {
			signer,
			providers: RwLock::new(HashMap::new()),
			active_chain: RwLock::new(None),
		}
	}

	/// Parses a hex private key, with or without `0x`.
	pub fn from_secret(private_key: &SecretString) -> Result<Self, WalletError> {
		let signer: PrivateKeySigner = private_key.with_exposed(|key| {
			key.parse()
				.map_err(|_| WalletError::invalid_params("Invalid private key format"))
		})?;
		Ok(Self::new(signer))
	}

	/// Registers a chain the wallet already knows about.
	pub fn with_chain(mut self, chain_id: u64, rpc_url: &str) -> Result<Self, WalletError> {
		let provider = self.build_provider(chain_id, rpc_url)?;
		self.providers.get_mut().insert(chain_id, provider);
		Ok(self)
	}

	/// Makes `chain_id` the active chain. It must have been registered.
	pub fn with_active_chain(mut self, chain_id: u64) -> Self {
		if self.providers.get_mut().contains_key(&chain_id) {
			*self.active_chain.get_mut() = Some(chain_id);
		}
		self
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	pub async fn active_chain(&self) -> Option<u64> {
		*self.active_chain.read().await
	}

	pub async fn knows_chain(&self, chain_id: u64) -> bool {
		self.providers.read().await.contains_key(&chain_id)
	}

	fn build_provider(&self, chain_id: u64, rpc_url: &str) -> Result<DynProvider, WalletError> {
		let url = rpc_url.parse().map_err(|e| {
			WalletError::invalid_params(format!("Invalid RPC URL for chain {chain_id}: {e}"))
		})?;

		let chain_signer = self.signer.clone().with_chain_id(Some(chain_id));
		let wallet = EthereumWallet::from(chain_signer);

		// 5 retries, 1s initial backoff, 10 compute units per second
		let retry_layer = RetryBackoffLayer::new(5, 1000, 10);
		let client = RpcClient::builder().layer(retry_layer).http(url);

		Ok(ProviderBuilder::new()
			.wallet(wallet)
			.connect_client(client)
			.erased())
	}

	async fn active_provider(&self) -> Result<DynProvider, WalletError> {
		let chain_id = self
			.active_chain()
			.await
			.ok_or_else(|| WalletError::new(CHAIN_DISCONNECTED, "No chain is selected"))?;
		self.providers
			.read()
			.await
			.get(&chain_id)
			.cloned()
			.ok_or_else(|| WalletError::new(CHAIN_DISCONNECTED, "No chain is selected"))
	}

	async fn switch_chain(&self, request: &WalletRequest) -> Result<Value, WalletError> {
		let chain_id_hex = request
			.first_param()
			.and_then(|param| param.get("chainId"))
			.and_then(Value::as_str)
			.ok_or_else(|| WalletError::invalid_params("Missing chainId"))?;
		let chain_id = parse_chain_id(chain_id_hex)?;

		if !self.knows_chain(chain_id).await {
			return Err(WalletError::unrecognized_chain(chain_id_hex));
		}
		*self.active_chain.write().await = Some(chain_id);
		tracing::info!(chain_id, "Switched active chain");
		Ok(Value::Null)
	}

	async fn add_chain(&self, request: &WalletRequest) -> Result<Value, WalletError> {
		let params: AddChainParams = first_param(request)?;
		let chain_id = parse_chain_id(&params.chain_id)?;
		let rpc_url = params
			.rpc_urls
			.first()
			.ok_or_else(|| WalletError::invalid_params("rpcUrls must not be empty"))?;

		let provider = self.build_provider(chain_id, rpc_url)?;
		self.providers.write().await.insert(chain_id, provider);
		*self.active_chain.write().await = Some(chain_id);
		tracing::info!(chain_id, name = %params.chain_name, "Added chain");
		Ok(Value::Null)
	}

	async fn chain_id(&self) -> Result<Value, WalletError> {
		let chain_id = self
			.active_chain()
			.await
			.ok_or_else(|| WalletError::new(CHAIN_DISCONNECTED, "No chain is selected"))?;
		Ok(json!(format!("0x{chain_id:x}")))
	}

	async fn send_transaction(&self, request: &WalletRequest) -> Result<Value, WalletError> {
		let tx: TransactionRequest = first_param(request)?;
		let provider = self.active_provider().await?;

		tracing::debug!(
			to = ?tx.to,
			value = ?tx.value,
			gas_limit = ?tx.gas,
			"Sending transaction"
		);

		let pending = provider.send_transaction(tx).await.map_err(|e| {
			tracing::error!("Transaction submission failed: {}", e);
			map_transport_error(e)
		})?;
		Ok(json!(pending.tx_hash()))
	}

	async fn call(&self, request: &WalletRequest) -> Result<Value, WalletError> {
		let tx: TransactionRequest = first_param(request)?;
		let provider = self.active_provider().await?;
		let output = provider.call(tx).await.map_err(map_transport_error)?;
		Ok(json!(output))
	}

	async fn transaction_receipt(&self, request: &WalletRequest) -> Result<Value, WalletError> {
		let hash: B256 = first_param(request)?;
		let provider = self.active_provider().await?;
		let receipt = provider
			.get_transaction_receipt(hash)
			.await
			.map_err(map_transport_error)?;
		serde_json::to_value(receipt).map_err(|e| WalletError::internal(e.to_string()))
	}
}

#[async_trait]
impl WalletCapability for LocalWallet {
	async fn request(&self, request: WalletRequest) -> Result<Value, WalletError> {
		match request.method.as_str() {
			methods::REQUEST_ACCOUNTS => Ok(json!([self.address()])),
			methods::CHAIN_ID => self.chain_id().await,
			methods::SWITCH_CHAIN => self.switch_chain(&request).await,
			methods::ADD_CHAIN => self.add_chain(&request).await,
			methods::SEND_TRANSACTION => self.send_transaction(&request).await,
			methods::CALL => self.call(&request).await,
			methods::GET_TRANSACTION_RECEIPT => self.transaction_receipt(&request).await,
			other => Err(WalletError::unsupported_method(other)),
		}
	}
}

fn first_param<T: DeserializeOwned>(request: &WalletRequest) -> Result<T, WalletError> {
	let param = request
		.first_param()
		.cloned()
		.ok_or_else(|| WalletError::invalid_params(format!("{} needs a parameter", request.method)))?;
	serde_json::from_value(param).map_err(|e| WalletError::invalid_params(e.to_string()))
}

fn parse_chain_id(value: &str) -> Result<u64, WalletError> {
	let id = parse_hex_quantity(value).map_err(WalletError::invalid_params)?;
	u64::try_from(id).map_err(|_| WalletError::invalid_params(format!("Chain id {value} is too large")))
}

/// Keeps the node's JSON-RPC error code when there is one.
fn map_transport_error(error: TransportError) -> WalletError {
	match error.as_error_resp() {
		Some(payload) => {
			let data = payload
				.data
				.as_ref()
				.and_then(|raw| serde_json::from_str(raw.get()).ok());
			WalletError {
				code: payload.code,
				message: payload.message.to_string(),
				data,
			}
		},
		None => WalletError::internal(error.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use txlink_types::NativeCurrency;

	const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn create_test_wallet() -> LocalWallet {
		LocalWallet::from_secret(&SecretString::from(TEST_KEY)).unwrap()
	}

	#[test]
	fn test_from_secret_rejects_garbage() {
		let result = LocalWallet::from_secret(&SecretString::from("not-a-key"));
		assert_eq!(result.err().unwrap().code, WalletError::INVALID_PARAMS);
	}

	#[tokio::test]
	async fn test_request_accounts_returns_signer_address() {
		let wallet = create_test_wallet();
		let accounts = wallet
			.request(WalletRequest::bare(methods::REQUEST_ACCOUNTS))
			.await
			.unwrap();
		assert_eq!(accounts, json!([wallet.address()]));
	}

	#[tokio::test]
	async fn test_switch_to_unknown_chain_is_unrecognized() {
		let wallet = create_test_wallet()
			.with_chain(338, "http://localhost:8545")
			.unwrap()
			.with_active_chain(338);

		let err = wallet
			.request(WalletRequest::new(
				methods::SWITCH_CHAIN,
				json!([{ "chainId": "0xf0" }]),
			))
			.await
			.unwrap_err();
		assert!(err.is_unrecognized_chain());
		assert_eq!(wallet.active_chain().await, Some(338));
	}

	#[tokio::test]
	async fn test_add_chain_then_switch() {
		let wallet = create_test_wallet();
		let params = AddChainParams {
			chain_id: "0xf0".into(),
			chain_name: "Cronos zkEVM Testnet".into(),
			native_currency: NativeCurrency::new("zkTCRO", "zkTCRO"),
			rpc_urls: vec!["http://localhost:8545".into()],
		};

		wallet
			.request(WalletRequest::new(methods::ADD_CHAIN, json!([params])))
			.await
			.unwrap();
		assert!(wallet.knows_chain(240).await);

		let chain_id = wallet
			.request(WalletRequest::bare(methods::CHAIN_ID))
			.await
			.unwrap();
		assert_eq!(chain_id, json!("0xf0"));
	}

	#[tokio::test]
	async fn test_add_chain_rejects_invalid_rpc_url() {
		let wallet = create_test_wallet();
		let err = wallet
			.request(WalletRequest::new(
				methods::ADD_CHAIN,
				json!([{
					"chainId": "0xf0",
					"chainName": "Broken",
					"nativeCurrency": { "name": "X", "symbol": "X", "decimals": 18 },
					"rpcUrls": ["not a url"]
				}]),
			))
			.await
			.unwrap_err();
		assert_eq!(err.code, WalletError::INVALID_PARAMS);
		assert!(!wallet.knows_chain(240).await);
	}

	#[tokio::test]
	async fn test_chain_id_without_active_chain() {
		let wallet = create_test_wallet();
		let err = wallet
			.request(WalletRequest::bare(methods::CHAIN_ID))
			.await
			.unwrap_err();
		assert_eq!(err.code, CHAIN_DISCONNECTED);
	}

	#[tokio::test]
	async fn test_unsupported_method() {
		let wallet = create_test_wallet();
		let err = wallet
			.request(WalletRequest::bare("personal_sign"))
			.await
			.unwrap_err();
		assert_eq!(err.code, WalletError::UNSUPPORTED_METHOD);
	}
}
