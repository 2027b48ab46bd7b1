//! Handlers for the `txlink` subcommands.

pub mod chains;
pub mod inspect;
pub mod run;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use txlink_config::Config;

/// Loads the config file when one is given, otherwise the defaults.
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
	match path {
		Some(path) => {
			let config = Config::from_file(path)
				.await
				.with_context(|| format!("Failed to load config from {}", path.display()))?;
			info!(config_path = %path.display(), chains = config.chains.len(), "Configuration loaded");
			Ok(config)
		},
		None => Ok(Config::default()),
	}
}
