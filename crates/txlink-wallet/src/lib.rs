//! Wallet capability for the txlink pipeline.
//!
//! The pipeline never signs anything itself. It talks to a wallet through a
//! single EIP-1193 style `request(method, params)` entry point, which is
//! what browser wallets expose. [`WalletClient`] layers typed helpers for
//! the handful of methods the pipeline uses on top of that.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod abi;
pub mod client;

/// Re-export implementations
pub mod implementations {
	pub mod local;
	pub mod simulated;
}

pub use client::{AddChainParams, CallParams, ReceiptSummary, TransactionParams, WalletClient};
pub use implementations::local::LocalWallet;
pub use implementations::simulated::{SentTransaction, SimulatedCall, SimulatedWallet};

/// JSON-RPC method names understood by wallets.
pub mod methods {
	pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
	pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
	pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
	pub const CHAIN_ID: &str = "eth_chainId";
	pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
	pub const CALL: &str = "eth_call";
	pub const GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// A single wallet request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRequest {
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

impl WalletRequest {
	pub fn new(method: impl Into<String>, params: Value) -> Self {
		Self {
			method: method.into(),
			params,
		}
	}

	/// Request without parameters.
	pub fn bare(method: impl Into<String>) -> Self {
		Self::new(method, Value::Array(Vec::new()))
	}

	/// First positional parameter, if any.
	pub fn first_param(&self) -> Option<&Value> {
		self.params.as_array().and_then(|params| params.first())
	}
}

/// Error returned by a wallet, carrying the EIP-1193 / JSON-RPC code.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct WalletError {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

impl WalletError {
	/// EIP-1193: the user rejected the request.
	pub const USER_REJECTED: i64 = 4001;
	/// EIP-1193: the wallet does not support the method.
	pub const UNSUPPORTED_METHOD: i64 = 4200;
	/// EIP-3326: the chain has not been added to the wallet.
	pub const UNRECOGNIZED_CHAIN: i64 = 4902;
	/// EIP-1474: execution reverted.
	pub const EXECUTION_REVERTED: i64 = 3;
	/// JSON-RPC: invalid params.
	pub const INVALID_PARAMS: i64 = -32602;
	/// JSON-RPC: internal error.
	pub const INTERNAL_ERROR: i64 = -32603;

	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			data: None,
		}
	}

	pub fn with_data(mut self, data: Value) -> Self {
		self.data = Some(data);
		self
	}

	pub fn user_rejected() -> Self {
		Self::new(Self::USER_REJECTED, "User rejected the request.")
	}

	pub fn unsupported_method(method: &str) -> Self {
		Self::new(
			Self::UNSUPPORTED_METHOD,
			format!("The wallet does not support {method}"),
		)
	}

	pub fn unrecognized_chain(chain_id_hex: &str) -> Self {
		Self::new(
			Self::UNRECOGNIZED_CHAIN,
			format!("Unrecognized chain ID \"{chain_id_hex}\". Try adding the chain first."),
		)
	}

	pub fn reverted(reason: impl Into<String>) -> Self {
		Self::new(Self::EXECUTION_REVERTED, reason)
	}

	pub fn invalid_params(reason: impl Into<String>) -> Self {
		Self::new(Self::INVALID_PARAMS, reason)
	}

	pub fn internal(reason: impl Into<String>) -> Self {
		Self::new(Self::INTERNAL_ERROR, reason)
	}

	pub fn is_user_rejection(&self) -> bool {
		self.code == Self::USER_REJECTED
	}

	pub fn is_unrecognized_chain(&self) -> bool {
		self.code == Self::UNRECOGNIZED_CHAIN
	}

	/// Whether the error reports a reverted call.
	pub fn is_revert(&self) -> bool {
		self.code == Self::EXECUTION_REVERTED || self.message.to_lowercase().contains("revert")
	}
}

/// Trait defining the interface to a user's wallet.
///
/// Implementations forward requests to a signer and the chain it is
/// connected to. Errors carry the wallet's numeric code so callers can tell
/// a rejection (4001) from an unknown chain (4902) from anything else.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait WalletCapability: Send + Sync {
	/// Sends a single request and returns the wallet's JSON result.
	async fn request(&self, request: WalletRequest) -> Result<Value, WalletError>;
}
