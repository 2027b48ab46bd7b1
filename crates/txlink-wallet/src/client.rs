//! Typed helpers over [`WalletCapability`].

use crate::{methods, WalletCapability, WalletError, WalletRequest};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use txlink_types::NativeCurrency;

/// Parameters of `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
	pub chain_id: String,
	pub chain_name: String,
	pub native_currency: NativeCurrency,
	pub rpc_urls: Vec<String>,
}

/// Read-only call for `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<Address>,
	pub to: Address,
	pub data: Bytes,
}

/// Transaction object for `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
	pub from: Address,
	pub to: Address,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Bytes>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas: Option<U256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<U256>,
}

/// The parts of a receipt the pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
	pub transaction_hash: B256,
	pub block_number: Option<u64>,
	pub success: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
	transaction_hash: B256,
	#[serde(default)]
	block_number: Option<U64>,
	#[serde(default)]
	status: Option<U64>,
}

/// Typed access to the wallet methods the pipeline uses.
#[derive(Clone)]
pub struct WalletClient {
	wallet: Arc<dyn WalletCapability>,
}

impl WalletClient {
	pub fn new(wallet: Arc<dyn WalletCapability>) -> Self {
		Self { wallet }
	}

	async fn send<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, WalletError> {
		debug!(method, "Wallet request");
		let result = self
			.wallet
			.request(WalletRequest::new(method, params))
			.await?;
		serde_json::from_value(result)
			.map_err(|e| WalletError::internal(format!("Invalid {method} response: {e}")))
	}

	/// Asks the wallet to expose its accounts.
	pub async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
		self.send(methods::REQUEST_ACCOUNTS, json!([])).await
	}

	/// First account the wallet exposes.
	pub async fn connected_account(&self) -> Result<Address, WalletError> {
		self.request_accounts()
			.await?
			.into_iter()
			.next()
			.ok_or_else(|| WalletError::new(4100, "No account is connected"))
	}

	/// Currently active chain.
	pub async fn chain_id(&self) -> Result<u64, WalletError> {
		let id: U64 = self.send(methods::CHAIN_ID, json!([])).await?;
		Ok(id.to::<u64>())
	}

	pub async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), WalletError> {
		let _: Value = self
			.send(methods::SWITCH_CHAIN, json!([{ "chainId": chain_id_hex }]))
			.await?;
		Ok(())
	}

	pub async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
		let _: Value = self.send(methods::ADD_CHAIN, json!([params])).await?;
		Ok(())
	}

	/// Executes a read-only call against the latest block.
	pub async fn call(&self, params: &CallParams) -> Result<Bytes, WalletError> {
		self.send(methods::CALL, json!([params, "latest"])).await
	}

	/// Submits a transaction for signing; resolves to its hash.
	pub async fn send_transaction(&self, tx: &TransactionParams) -> Result<B256, WalletError> {
		self.send(methods::SEND_TRANSACTION, json!([tx])).await
	}

	/// Receipt of a mined transaction, `None` while it is pending.
	pub async fn transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<ReceiptSummary>, WalletError> {
		let raw: Option<RawReceipt> = self
			.send(methods::GET_TRANSACTION_RECEIPT, json!([hash]))
			.await?;
		Ok(raw.map(|receipt| ReceiptSummary {
			transaction_hash: receipt.transaction_hash,
			block_number: receipt.block_number.map(|n| n.to::<u64>()),
			// pre-Byzantium receipts carry no status
			success: receipt.status.map_or(true, |status| !status.is_zero()),
		}))
	}
}
