//! In-memory wallet used by the CLI's `--simulate` mode and by tests.
//!
//! Tracks the chains it knows, ERC-20 allowances per (chain, token, owner,
//! spender) and the transactions it has been asked to sign. Approvals and
//! swaps are decoded from calldata so allowance checks behave like the
//! contracts they stand in for. Failures can be scripted per method.

use crate::abi::{IERC20, IRouter, IWrappedNative};
use crate::{methods, AddChainParams, TransactionParams, WalletCapability, WalletError, WalletRequest};
use alloy_primitives::{address, keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use txlink_types::parse_hex_quantity;

/// Default account exposed by the simulated wallet.
pub const DEFAULT_ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Decoded intent of a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedCall {
	NativeTransfer,
	TokenTransfer {
		to: Address,
		amount: U256,
	},
	Approve {
		spender: Address,
		amount: U256,
	},
	Deposit,
	Swap {
		amount_in: U256,
		amount_out_min: U256,
		path: Vec<Address>,
		to: Address,
	},
	Unknown,
}

/// A transaction the wallet signed and "mined".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
	pub hash: B256,
	pub chain_id: u64,
	pub from: Address,
	pub to: Address,
	pub value: U256,
	pub data: Bytes,
	pub gas: Option<U256>,
	pub gas_price: Option<U256>,
	pub call: SimulatedCall,
}

#[derive(Debug, Clone, Copy)]
struct SimulatedReceipt {
	block_number: u64,
	success: bool,
	pending_polls: u32,
}

type AllowanceKey = (u64, Address, Address, Address);

#[derive(Default)]
struct State {
	known_chains: HashSet<u64>,
	active_chain: Option<u64>,
	allowances: HashMap<AllowanceKey, U256>,
	decimals: HashMap<(u64, Address), u8>,
	receipts: HashMap<B256, SimulatedReceipt>,
	sent: Vec<SentTransaction>,
	requests: Vec<WalletRequest>,
	failures: HashMap<String, VecDeque<Option<WalletError>>>,
	fail_next_receipt: bool,
	receipt_delay: u32,
	block_number: u64,
	nonce: u64,
}

/// Wallet that keeps all chain state in memory.
pub struct SimulatedWallet {
	account: Address,
	state: Mutex<State>,
}

#[derive(Deserialize)]
struct RawCall {
	to: Address,
	#[serde(default, alias = "input")]
	data: Bytes,
}

impl Default for SimulatedWallet {
	fn default() -> Self {
		Self::new()
	}
}

impl SimulatedWallet {
	pub fn new() -> Self {
		Self {
			account: DEFAULT_ACCOUNT,
			state: Mutex::new(State {
				block_number: 1,
				..State::default()
			}),
		}
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	pub fn with_account(mut self, account: Address) -> Self {
		self.account = account;
		self
	}

	/// Adds a chain the wallet already knows.
	pub fn with_chain(self, chain_id: u64) -> Self {
		self.lock().known_chains.insert(chain_id);
		self
	}

	pub fn with_active_chain(self, chain_id: u64) -> Self {
		{
			let mut state = self.lock();
			state.known_chains.insert(chain_id);
			state.active_chain = Some(chain_id);
		}
		self
	}

	pub fn with_decimals(self, chain_id: u64, token: Address, decimals: u8) -> Self {
		self.lock().decimals.insert((chain_id, token), decimals);
		self
	}

	pub fn with_allowance(
		self,
		chain_id: u64,
		token: Address,
		owner: Address,
		spender: Address,
		amount: U256,
	) -> Self {
		self.lock()
			.allowances
			.insert((chain_id, token, owner, spender), amount);
		self
	}

	/// Receipts stay pending for this many polls after submission.
	pub fn with_receipt_delay(self, polls: u32) -> Self {
		self.lock().receipt_delay = polls;
		self
	}

	/// Fails the next request for `method` with `error`.
	pub fn fail_next(&self, method: &str, error: WalletError) {
		self.fail_after(method, 0, error);
	}

	/// Lets `skip` requests for `method` through, then fails the next one.
	pub fn fail_after(&self, method: &str, skip: usize, error: WalletError) {
		let mut state = self.lock();
		let queue = state.failures.entry(method.to_string()).or_default();
		queue.extend(std::iter::repeat_n(None, skip));
		queue.push_back(Some(error));
	}

	/// The next transaction is mined with a failed status.
	pub fn fail_next_receipt(&self) {
		self.lock().fail_next_receipt = true;
	}

	pub fn account(&self) -> Address {
		self.account
	}

	pub fn active_chain(&self) -> Option<u64> {
		self.lock().active_chain
	}

	pub fn knows_chain(&self, chain_id: u64) -> bool {
		self.lock().known_chains.contains(&chain_id)
	}

	pub fn allowance(&self, chain_id: u64, token: Address, owner: Address, spender: Address) -> U256 {
		self.lock()
			.allowances
			.get(&(chain_id, token, owner, spender))
			.copied()
			.unwrap_or_default()
	}

	pub fn sent_transactions(&self) -> Vec<SentTransaction> {
		self.lock().sent.clone()
	}

	/// Every request received, failed ones included.
	pub fn requests(&self) -> Vec<WalletRequest> {
		self.lock().requests.clone()
	}

	pub fn request_count(&self, method: &str) -> usize {
		self.lock()
			.requests
			.iter()
			.filter(|request| request.method == method)
			.count()
	}

	fn active(state: &State) -> Result<u64, WalletError> {
		state
			.active_chain
			.ok_or_else(|| WalletError::new(4901, "No chain is selected"))
	}

	fn switch_chain(state: &mut State, request: &WalletRequest) -> Result<Value, WalletError> {
		let chain_id_hex = request
			.first_param()
			.and_then(|param| param.get("chainId"))
			.and_then(Value::as_str)
			.ok_or_else(|| WalletError::invalid_params("Missing chainId"))?;
		let chain_id = parse_chain_id(chain_id_hex)?;
		if !state.known_chains.contains(&chain_id) {
			return Err(WalletError::unrecognized_chain(chain_id_hex));
		}
		state.active_chain = Some(chain_id);
		Ok(Value::Null)
	}

	fn add_chain(state: &mut State, request: &WalletRequest) -> Result<Value, WalletError> {
		let params: AddChainParams = first_param(request)?;
		let chain_id = parse_chain_id(&params.chain_id)?;
		if params.rpc_urls.is_empty() {
			return Err(WalletError::invalid_params("rpcUrls must not be empty"));
		}
		state.known_chains.insert(chain_id);
		state.active_chain = Some(chain_id);
		Ok(Value::Null)
	}

	fn call(&self, state: &State, request: &WalletRequest) -> Result<Value, WalletError> {
		let call: RawCall = first_param(request)?;
		let chain_id = Self::active(state)?;
		let data = call.data.as_ref();

		let output = match selector(data) {
			Some(IERC20::allowanceCall::SELECTOR) => {
				let decoded = IERC20::allowanceCall::abi_decode(data)
					.map_err(|e| WalletError::invalid_params(e.to_string()))?;
				state
					.allowances
					.get(&(chain_id, call.to, decoded.owner, decoded.spender))
					.copied()
					.unwrap_or_default()
					.abi_encode()
			},
			Some(IERC20::decimalsCall::SELECTOR) => {
				let decimals = state
					.decimals
					.get(&(chain_id, call.to))
					.copied()
					.ok_or_else(|| WalletError::reverted("execution reverted"))?;
				U256::from(decimals).abi_encode()
			},
			_ => return Err(WalletError::reverted("execution reverted")),
		};
		Ok(json!(Bytes::from(output)))
	}

	fn send_transaction(&self, state: &mut State, request: &WalletRequest) -> Result<Value, WalletError> {
		let tx: TransactionParams = first_param(request)?;
		let chain_id = Self::active(state)?;
		if tx.from != self.account {
			return Err(WalletError::new(4100, "Unknown sender account"));
		}
		let data = tx.data.clone().unwrap_or_default();
		let value = tx.value.unwrap_or_default();

		let call = match selector(&data) {
			None if data.is_empty() => SimulatedCall::NativeTransfer,
			Some(IERC20::approveCall::SELECTOR) => {
				let decoded = IERC20::approveCall::abi_decode(&data)
					.map_err(|e| WalletError::invalid_params(e.to_string()))?;
				state
					.allowances
					.insert((chain_id, tx.to, tx.from, decoded.spender), decoded.amount);
				SimulatedCall::Approve {
					spender: decoded.spender,
					amount: decoded.amount,
				}
			},
			Some(IERC20::transferCall::SELECTOR) => {
				let decoded = IERC20::transferCall::abi_decode(&data)
					.map_err(|e| WalletError::invalid_params(e.to_string()))?;
				SimulatedCall::TokenTransfer {
					to: decoded.to,
					amount: decoded.amount,
				}
			},
			Some(IWrappedNative::depositCall::SELECTOR) => SimulatedCall::Deposit,
			Some(IRouter::swapExactTokensForTokensCall::SELECTOR) => {
				let decoded = IRouter::swapExactTokensForTokensCall::abi_decode(&data)
					.map_err(|e| WalletError::invalid_params(e.to_string()))?;
				let token = decoded
					.path
					.first()
					.copied()
					.ok_or_else(|| WalletError::reverted("execution reverted: INVALID_PATH"))?;
				let key = (chain_id, token, tx.from, tx.to);
				let allowance = state.allowances.get(&key).copied().unwrap_or_default();
				if allowance < decoded.amountIn {
					return Err(WalletError::reverted(
						"execution reverted: ERC20: insufficient allowance",
					));
				}
				state.allowances.insert(key, allowance - decoded.amountIn);
				SimulatedCall::Swap {
					amount_in: decoded.amountIn,
					amount_out_min: decoded.amountOutMin,
					path: decoded.path,
					to: decoded.to,
				}
			},
			_ => SimulatedCall::Unknown,
		};

		state.nonce += 1;
		state.block_number += 1;
		let hash = keccak256([chain_id.to_be_bytes(), state.nonce.to_be_bytes()].concat());
		let success = !std::mem::take(&mut state.fail_next_receipt);
		state.receipts.insert(
			hash,
			SimulatedReceipt {
				block_number: state.block_number,
				success,
				pending_polls: state.receipt_delay,
			},
		);
		state.sent.push(SentTransaction {
			hash,
			chain_id,
			from: tx.from,
			to: tx.to,
			value,
			data,
			gas: tx.gas,
			gas_price: tx.gas_price,
			call,
		});
		Ok(json!(hash))
	}

	fn transaction_receipt(state: &mut State, request: &WalletRequest) -> Result<Value, WalletError> {
		let hash: B256 = first_param(request)?;
		let Some(receipt) = state.receipts.get_mut(&hash) else {
			return Ok(Value::Null);
		};
		if receipt.pending_polls > 0 {
			receipt.pending_polls -= 1;
			return Ok(Value::Null);
		}
		Ok(json!({
			"transactionHash": hash,
			"blockNumber": format!("0x{:x}", receipt.block_number),
			"status": if receipt.success { "0x1" } else { "0x0" },
		}))
	}
}

#[async_trait]
impl WalletCapability for SimulatedWallet {
	async fn request(&self, request: WalletRequest) -> Result<Value, WalletError> {
		let mut state = self.lock();
		state.requests.push(request.clone());

		if let Some(Some(error)) = state
			.failures
			.get_mut(&request.method)
			.and_then(VecDeque::pop_front)
		{
			return Err(error);
		}

		match request.method.as_str() {
			methods::REQUEST_ACCOUNTS => Ok(json!([self.account])),
			methods::CHAIN_ID => Self::active(&state).map(|id| json!(format!("0x{id:x}"))),
			methods::SWITCH_CHAIN => Self::switch_chain(&mut state, &request),
			methods::ADD_CHAIN => Self::add_chain(&mut state, &request),
			methods::CALL => self.call(&state, &request),
			methods::SEND_TRANSACTION => self.send_transaction(&mut state, &request),
			methods::GET_TRANSACTION_RECEIPT => Self::transaction_receipt(&mut state, &request),
			other => Err(WalletError::unsupported_method(other)),
		}
	}
}

fn selector(data: &[u8]) -> Option<[u8; 4]> {
	data.get(..4).and_then(|bytes| bytes.try_into().ok())
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
