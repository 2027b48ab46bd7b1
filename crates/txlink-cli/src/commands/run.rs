use crate::cli::output::Display;
use crate::commands::inspect::{load_intent, print_intent, print_tokens};
use anyhow::{anyhow, bail, Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tracing::{info, warn};
use txlink_config::Config;
use txlink_core::{ExecutionParams, IntentPipeline};
use txlink_types::{ProgressEvent, TokenAmount};
use txlink_wallet::{LocalWallet, SimulatedWallet, WalletCapability};

/// Decodes `link` and executes it, printing progress as it happens.
///
/// Token metadata is looked up alongside the run and printed when it
/// arrives; the run never waits for it.
pub async fn handle(
	config: &Config,
	link: &str,
	min_out: Option<TokenAmount>,
	simulate: bool,
) -> Result<()> {
	let wallet = build_wallet(config, simulate)?;
	let pipeline = IntentPipeline::from_config(config, Some(wallet));

	let plan = load_intent(&pipeline, link)?;
	print_intent(&plan);

	let params = min_out
		.map(ExecutionParams::with_min_amount_out)
		.unwrap_or_default();

	Display::section("Execution");
	let mut events = pipeline.executor().subscribe();
	let execution = pipeline.execute(&plan, &params);
	let tokens = pipeline.resolve_tokens(&plan);
	tokio::pin!(execution, tokens);
	let mut tokens_pending = true;

	let result = loop {
		tokio::select! {
			result = &mut execution => break result,
			Ok(event) = events.recv() => Display::progress(&event),
			resolved = &mut tokens, if tokens_pending => {
				tokens_pending = false;
				print_tokens(&resolved);
			},
			_ = tokio::signal::ctrl_c() => {
				warn!("Run interrupted");
				bail!("Interrupted before confirmation");
			},
		}
	};
	drain(&mut events);

	match result {
		Ok(outcome) => {
			info!(tx_hash = %outcome.tx_hash, "Run confirmed");
			Display::success("Transaction confirmed");
			Display::kv("Hash", &outcome.tx_hash.to_string());
			Display::kv("Explorer", &outcome.explorer_url);
			Ok(())
		},
		Err(err) => {
			warn!(error = %err, "Run failed");
			Err(anyhow!(err.user_message()))
		},
	}
}

/// Prints events published after the run future completed.
fn drain(events: &mut Receiver<ProgressEvent>) {
	while let Ok(event) = events.try_recv() {
		Display::progress(&event);
	}
}

/// The configured signer, or a simulated wallet when `simulate` is set.
///
/// Every registry chain is known to the wallet up front, so reconciliation
/// only adds chains the link brings with it.
pub fn build_wallet(config: &Config, simulate: bool) -> Result<Arc<dyn WalletCapability>> {
	let registry = config.chain_registry();

	if simulate {
		let mut wallet = SimulatedWallet::new();
		for chain_id in registry.chain_ids() {
			wallet = wallet.with_chain(chain_id);
		}
		if let Some(chain_id) = config.wallet.default_chain {
			wallet = wallet.with_active_chain(chain_id);
		}
		Display::info(&format!("Using simulated wallet {}", wallet.account()));
		return Ok(Arc::new(wallet));
	}

	let private_key = config
		.wallet
		.private_key
		.as_ref()
		.context("wallet.private_key is not configured; pass --simulate to use the simulated wallet")?;
	let mut wallet = LocalWallet::from_secret(private_key)?;
	for chain_id in registry.chain_ids() {
		if let Some(chain) = registry.descriptor(chain_id) {
			wallet = wallet.with_chain(chain_id, &chain.rpc_endpoint)?;
		}
	}
	if let Some(chain_id) = config.wallet.default_chain {
		wallet = wallet.with_active_chain(chain_id);
	}
	Display::info(&format!("Signing as {}", wallet.address()));
	Ok(Arc::new(wallet))
}
