//! Core execution pipeline for transaction intents.
//!
//! Ties the intent decoder to a wallet: the [`NetworkReconciler`] puts the
//! wallet on the plan's chain, the [`OperationExecutor`] drives the
//! per-kind state machine through the wallet's signer, and the
//! [`TokenMetadataResolver`] looks up display metadata alongside.
//! [`IntentPipeline`] is the facade the CLI uses.

pub mod event_bus;
pub mod executor;
pub mod metadata;
pub mod pipeline;
pub mod reconciler;

pub use event_bus::EventBus;
pub use executor::{ExecutionParams, ExecutorSettings, OperationExecutor, RunHandle};
pub use metadata::{MetadataError, TokenMetadataResolver, TokenReader};
pub use pipeline::{explorer_tx_url, ExecutionOutcome, IntentPipeline, PipelineError};
pub use reconciler::NetworkReconciler;
