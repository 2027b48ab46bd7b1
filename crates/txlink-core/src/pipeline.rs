//! Facade over decoder, executor and metadata resolver.
//!
//! `load` turns a link into a plan without any network access; `execute`
//! runs the plan and returns the final hash with its explorer link.
//! Display metadata comes from `resolve_tokens`, which callers drive next to
//! `execute` so a slow RPC endpoint never holds up the run. Every error the
//! pipeline can produce maps to one user-facing message through
//! [`PipelineError::user_message`].

use crate::executor::{ExecutionParams, ExecutorSettings, OperationExecutor};
use crate::metadata::{AlloyTokenReader, TokenMetadataResolver};
use alloy_primitives::B256;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use txlink_config::Config;
use txlink_intent::{DecodeError, IntentDecoder};
use txlink_types::{
	ChainDescriptor, ExecutionError, ExecutionState, NetworkError, OperationPlan, TokenInfo,
};
use txlink_wallet::{WalletCapability, WalletClient};

/// Errors surfaced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
	#[error(transparent)]
	Decode(#[from] DecodeError),
	#[error(transparent)]
	Execution(#[from] ExecutionError),
}

impl PipelineError {
	/// Message to show the person who opened the link.
	pub fn user_message(&self) -> String {
		match self {
			Self::Decode(DecodeError::TokenMissing) => "Token is missing from the URL.".to_string(),
			Self::Decode(DecodeError::TokenExpired { .. }) => {
				"The link has expired. Please request a new one.".to_string()
			},
			Self::Decode(DecodeError::TokenMalformed(_) | DecodeError::UnsupportedChain(_)) => {
				"Invalid or expired token.".to_string()
			},
			Self::Execution(ExecutionError::Network(network)) => match network {
				NetworkError::WalletUnavailable => "No wallet is available.".to_string(),
				NetworkError::SwitchFailed(_) => "Failed to switch to custom network".to_string(),
				NetworkError::AddFailed(_) => "Failed to add custom network".to_string(),
			},
			Self::Execution(ExecutionError::WalletUnavailable) => "No wallet is available.".to_string(),
			Self::Execution(ExecutionError::RunInProgress) => {
				"A transaction is already in progress.".to_string()
			},
			Self::Execution(
				ExecutionError::SignerRejected(message)
				| ExecutionError::CallReverted(message)
				| ExecutionError::RpcError(message)
				| ExecutionError::InvalidAmount(message),
			) => format!("Transaction failed: {message}"),
			Self::Execution(error) => format!("Transaction failed: {error}"),
		}
	}
}

/// Result of a confirmed run.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
	pub tx_hash: B256,
	pub explorer_url: String,
	pub state: ExecutionState,
}

/// `{explorer_base_url}/tx/{hash}`
pub fn explorer_tx_url(chain: &ChainDescriptor, tx_hash: B256) -> String {
	chain.explorer_tx_url(&tx_hash.to_string())
}

/// Decoder, executor and resolver wired together.
pub struct IntentPipeline {
	decoder: IntentDecoder,
	executor: OperationExecutor,
	resolver: Option<Arc<TokenMetadataResolver>>,
}

impl IntentPipeline {
	pub fn new(decoder: IntentDecoder, executor: OperationExecutor) -> Self {
		Self {
			decoder,
			executor,
			resolver: None,
		}
	}

	pub fn with_resolver(mut self, resolver: Arc<TokenMetadataResolver>) -> Self {
		self.resolver = Some(resolver);
		self
	}

	/// Builds the pipeline from configuration.
	///
	/// Token metadata is read over each chain's RPC endpoint; `wallet` may
	/// be absent for inspection-only use.
	pub fn from_config(config: &Config, wallet: Option<Arc<dyn WalletCapability>>) -> Self {
		let mut decoder = IntentDecoder::new(config.chain_registry());
		if let Some(verification) = &config.intent.verification {
			decoder = decoder.with_verification(&verification.secret, verification.issuer.clone());
		}
		let executor = OperationExecutor::new(
			wallet.map(WalletClient::new),
			ExecutorSettings::from_config(config),
		);
		let resolver = TokenMetadataResolver::new(Arc::new(AlloyTokenReader::new()));

		Self::new(decoder, executor).with_resolver(Arc::new(resolver))
	}

	pub fn decoder(&self) -> &IntentDecoder {
		&self.decoder
	}

	pub fn executor(&self) -> &OperationExecutor {
		&self.executor
	}

	/// Decodes the link into a plan. Makes no wallet or RPC call.
	#[instrument(skip_all)]
	pub fn load(&self, link: &str) -> Result<OperationPlan, PipelineError> {
		let plan = self.decoder.decode_link(link)?;
		tracing::info!(kind = %plan.kind, chain_id = plan.chain.id, "Intent decoded");
		Ok(plan)
	}

	/// Metadata for the tokens the plan names; empty without a resolver.
	pub async fn resolve_tokens(&self, plan: &OperationPlan) -> Vec<TokenInfo> {
		match &self.resolver {
			Some(resolver) => resolver.resolve_plan(plan).await,
			None => Vec::new(),
		}
	}

	/// Runs the plan to confirmation.
	pub async fn execute(
		&self,
		plan: &OperationPlan,
		params: &ExecutionParams,
	) -> Result<ExecutionOutcome, PipelineError> {
		let tx_hash = self.executor.run(plan, params).await?;
		Ok(ExecutionOutcome {
			tx_hash,
			explorer_url: explorer_tx_url(&plan.chain, tx_hash),
			state: self.executor.state().await,
		})
	}
}
