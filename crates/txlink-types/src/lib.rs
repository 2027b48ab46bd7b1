//! Common types for the txlink pipeline.
//!
//! Chain registry, operation plans, exact token amounts, execution state and
//! progress events shared by the decoder, wallet, executor and CLI crates.

/// Chain descriptors and the built-in chain registry.
pub mod chain;
/// Execution phases, state and error types.
pub mod execution;
/// Progress events broadcast during execution.
pub mod events;
/// Decoded operation plans.
pub mod plan;
/// Redacted string type for keys and secrets.
pub mod secret_string;
/// Token metadata.
pub mod token;
/// Amount, hex and formatting helpers plus test builders.
pub mod utils;

pub use chain::{ChainContracts, ChainDescriptor, ChainEntry, ChainRegistry, NativeCurrency};
pub use events::ProgressEvent;
pub use execution::{ExecutionError, ExecutionPhase, ExecutionState, NetworkError};
pub use plan::{Action, ActionKind, OperationKind, OperationPlan, Participants, PlanError};
pub use secret_string::SecretString;
pub use token::TokenInfo;
pub use utils::{
	format_units, parse_address, parse_hex_quantity, parse_units, truncate_hex, without_0x_prefix,
	AmountError, TokenAmount, DEFAULT_DECIMALS,
};

pub use alloy_primitives::{Address, B256, U256};
