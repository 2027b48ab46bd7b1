use crate::cli::output::Display;
use txlink_config::Config;
use txlink_types::ChainEntry;

/// Prints every chain a link may target, built-ins plus configured ones.
pub fn handle(config: &Config) {
	let registry = config.chain_registry();
	Display::header("Supported Chains");

	for chain_id in registry.chain_ids() {
		if let Some(entry) = registry.get(chain_id) {
			print_entry(entry);
		}
	}
}

fn print_entry(entry: &ChainEntry) {
	let chain = &entry.descriptor;
	Display::section(&chain.to_string());
	Display::kv("Currency", &chain.native_currency.symbol);
	Display::kv("RPC", &chain.rpc_endpoint);
	Display::kv("Explorer", &chain.explorer_base_url);
	if let Some(router) = entry.contracts.router {
		Display::kv("Router", &router.to_string());
	}
	if let Some(wrapped) = entry.contracts.wrapped_native {
		Display::kv("Wrapped native", &wrapped.to_string());
	}
}
