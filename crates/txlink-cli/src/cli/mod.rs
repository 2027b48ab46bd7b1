//! Command-line interface definitions and parsing.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use txlink_types::TokenAmount;

/// Inspect and run transaction intent links.
#[derive(Parser, Debug)]
#[command(name = "txlink")]
#[command(about = "txlink - decode and execute pre-authorized transaction links")]
#[command(version)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	/// Config file path
	#[arg(global = true, long, env = "TXLINK_CONFIG")]
	pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Decode a link and show the plan it describes
	Inspect {
		/// Intent link
		link: String,
	},

	/// Decode a link and execute it with the configured wallet
	Run {
		/// Intent link
		link: String,

		/// Minimum amount of the output token a swap must return
		#[arg(long)]
		min_out: Option<TokenAmount>,

		/// Use the in-memory simulated wallet instead of the configured key
		#[arg(long)]
		simulate: bool,
	},

	/// List the chains links may target
	Chains,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_run_with_min_out() {
		let cli = Cli::try_parse_from([
			"txlink",
			"run",
			"https://txlink.app/swap-token/1?token=a.b.c",
			"--min-out",
			"9.5",
			"--simulate",
		])
		.unwrap();

		match cli.command {
			Commands::Run {
				link,
				min_out,
				simulate,
			} => {
				assert!(link.ends_with("token=a.b.c"));
				assert_eq!(min_out.unwrap().as_str(), "9.5");
				assert!(simulate);
			},
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn test_rejects_invalid_min_out() {
		assert!(Cli::try_parse_from(["txlink", "run", "link", "--min-out", "ten"]).is_err());
	}

	#[test]
	fn test_global_config_flag() {
		let cli = Cli::try_parse_from(["txlink", "chains", "--config", "txlink.toml"]).unwrap();
		assert_eq!(cli.config, Some(PathBuf::from("txlink.toml")));
	}
}
