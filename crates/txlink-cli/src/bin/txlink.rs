//! Main binary entry point for the txlink CLI.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use txlink_cli::{
	cli::{output::Display, Cli, Commands},
	commands::{self, load_config},
};

#[tokio::main]
async fn main() {
	// Load environment variables from .env file if it exists
	let _ = dotenvy::dotenv();

	init_logging();

	let cli = Cli::parse();

	if let Err(err) = dispatch(cli).await {
		Display::error(&format!("{err:#}"));
		std::process::exit(1);
	}
}

async fn dispatch(cli: Cli) -> Result<()> {
	let config = load_config(cli.config.as_deref()).await?;

	match cli.command {
		Commands::Inspect { link } => commands::inspect::handle(&config, &link).await,
		Commands::Run {
			link,
			min_out,
			simulate,
		} => commands::run::handle(&config, &link, min_out, simulate).await,
		Commands::Chains => {
			commands::chains::handle(&config);
			Ok(())
		},
	}
}

/// Initialize structured logging.
///
/// Controlled via RUST_LOG; defaults to info for txlink crates and warn
/// for everything else.
fn init_logging() {
	use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("txlink=info,txlink_core=info,txlink_intent=info,warn"));

	tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_target(true)
				.with_thread_ids(false)
				.with_file(false)
				.with_line_number(false)
				.compact(),
		)
		.with(env_filter)
		.init();
}
