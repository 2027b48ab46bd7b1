//! Terminal output utilities and formatting.
//!
//! Colored status lines for the commands plus one-line renderings of plan
//! steps and executor progress events.

use colored::Colorize;
use txlink_types::{truncate_hex, ExecutionPhase, ProgressEvent, TokenInfo};

/// Terminal display utilities for formatted CLI output.
pub struct Display;

impl Display {
	/// Bold cyan title over a rule of the same width.
	pub fn header(text: &str) {
		let rule = "─".repeat(text.chars().count());
		println!("\n{}\n{}", text.bold().cyan(), rule.cyan());
	}

	pub fn success(message: &str) {
		println!("{} {message}", "✓".green().bold());
	}

	/// Written to stderr.
	pub fn error(message: &str) {
		eprintln!("{} {}", "✗".red().bold(), message.red());
	}

	pub fn warning(message: &str) {
		println!("{} {}", "!".yellow().bold(), message.yellow());
	}

	pub fn info(message: &str) {
		println!("{} {message}", "•".blue().bold());
	}

	/// Indented `key: value` line with the key padded for alignment.
	pub fn kv(key: &str, value: &str) {
		let label = format!("{:<12}", format!("{key}:"));
		println!("  {} {value}", label.bold());
	}

	pub fn section(title: &str) {
		println!("\n{} {}", "▸".cyan(), title.bold());
	}

	/// Prints one progress event as it arrives from the executor.
	pub fn progress(event: &ProgressEvent) {
		match event {
			ProgressEvent::PhaseChanged { to, .. } => {
				if let Some(label) = phase_label(*to) {
					println!("  {} {}", "→".cyan(), label);
				}
			},
			ProgressEvent::TransactionSubmitted { action, tx_hash } => {
				println!(
					"  {} {} submitted: {}",
					"↑".blue(),
					action,
					truncate_hex(&tx_hash.to_string())
				);
			},
			ProgressEvent::TransactionConfirmed {
				action,
				block_number,
				..
			} => {
				let block = block_number
					.map(|number| format!(" in block {number}"))
					.unwrap_or_default();
				println!("  {} {} confirmed{}", "✓".green(), action, block);
			},
			ProgressEvent::RunFailed { error } => {
				println!("  {} {}", "✗".red(), error.to_string().red());
			},
		}
	}

	/// Prints token metadata, or the lookup error in its place.
	pub fn token(info: &TokenInfo) {
		let address = info
			.address
			.map(|address| truncate_hex(&address.to_string()))
			.unwrap_or_else(|| "-".to_string());
		match &info.error {
			None => Self::kv(
				&info.symbol,
				&format!(
					"{} ({}, {} decimals, supply {})",
					info.name,
					address,
					info.decimals,
					info.formatted_supply()
				),
			),
			Some(error) => Self::kv(&address, &error.yellow().to_string()),
		}
	}
}

/// Status line shown when the executor enters `phase`.
pub fn phase_label(phase: ExecutionPhase) -> Option<&'static str> {
	match phase {
		ExecutionPhase::Idle => None,
		ExecutionPhase::Switching => Some("Switching network"),
		ExecutionPhase::Signing => Some("Waiting for signature"),
		ExecutionPhase::Depositing => Some("Depositing"),
		ExecutionPhase::Approving => Some("Approving token spend"),
		ExecutionPhase::Approved => Some("Allowance ready"),
		ExecutionPhase::Swapping => Some("Swapping"),
		ExecutionPhase::Confirmed => Some("Confirmed"),
		ExecutionPhase::Failed => Some("Failed"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_idle_has_no_label() {
		assert_eq!(phase_label(ExecutionPhase::Idle), None);
		assert_eq!(
			phase_label(ExecutionPhase::Approving),
			Some("Approving token spend")
		);
	}
}
