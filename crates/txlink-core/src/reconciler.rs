//! Puts the wallet on the plan's chain before anything is signed.

use tracing::instrument;
use txlink_types::{NativeCurrency, NetworkError, OperationPlan};
use txlink_wallet::{AddChainParams, WalletClient, WalletError};

/// Switches the wallet to the plan's chain, adding it first when needed.
pub struct NetworkReconciler;

impl NetworkReconciler {
	/// Ensures `wallet` is on `plan.chain`.
	///
	/// Sends `wallet_switchEthereumChain`; when the wallet answers 4902 the
	/// chain is added from the plan's descriptor, and a successful add counts
	/// as the switch. Waits as long as the wallet takes to answer.
	#[instrument(skip_all, fields(chain_id = plan.chain.id))]
	pub async fn ensure_network(
		plan: &OperationPlan,
		wallet: Option<&WalletClient>,
	) -> Result<(), NetworkError> {
		let wallet = wallet.ok_or(NetworkError::WalletUnavailable)?;
		let chain_id_hex = plan.chain.id_hex();

		match wallet.switch_chain(&chain_id_hex).await {
			Ok(()) => {
				tracing::debug!("Wallet switched to {}", plan.chain);
				Ok(())
			},
			Err(err) if err.is_unrecognized_chain() => {
				tracing::info!("Chain unknown to wallet, adding {}", plan.chain);
				wallet
					.add_chain(&Self::add_chain_params(plan))
					.await
					.map_err(|e| NetworkError::AddFailed(e.message))
			},
			Err(WalletError { message, .. }) => Err(NetworkError::SwitchFailed(message)),
		}
	}

	/// Add-network request built from the plan's chain and currency.
	pub fn add_chain_params(plan: &OperationPlan) -> AddChainParams {
		AddChainParams {
			chain_id: plan.chain.id_hex(),
			chain_name: plan.chain.name.clone(),
			native_currency: NativeCurrency::new(plan.currency.clone(), plan.currency.clone()),
			rpc_urls: vec![plan.chain.rpc_endpoint.clone()],
		}
	}
}
