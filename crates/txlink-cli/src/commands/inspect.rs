use crate::cli::output::Display;
use anyhow::{anyhow, Result};
use tracing::{info, warn};
use txlink_config::Config;
use txlink_core::IntentPipeline;
use txlink_types::{OperationPlan, Participants, TokenInfo};

/// Decodes `link` and prints the plan without touching a wallet.
pub async fn handle(config: &Config, link: &str) -> Result<()> {
	let pipeline = IntentPipeline::from_config(config, None);
	let plan = load_intent(&pipeline, link)?;
	print_intent(&plan);
	print_tokens(&pipeline.resolve_tokens(&plan).await);
	Ok(())
}

/// Decodes a link, turning failures into their user-facing message.
pub fn load_intent(pipeline: &IntentPipeline, link: &str) -> Result<OperationPlan> {
	match pipeline.load(link) {
		Ok(plan) => {
			info!(
				kind = %plan.kind,
				chain_id = plan.chain.id,
				steps = plan.steps.len(),
				"Intent loaded"
			);
			Ok(plan)
		},
		Err(err) => {
			warn!(error = %err, "Intent rejected");
			Err(anyhow!(err.user_message()))
		},
	}
}

pub fn print_intent(plan: &OperationPlan) {
	Display::header("Transaction Intent");
	Display::kv("Operation", plan.kind.as_str());
	Display::kv("Chain", &plan.chain.to_string());
	Display::kv("Currency", &plan.currency);
	Display::kv("Expires", &plan.expires_at.to_rfc3339());
	if let Some(issuer) = &plan.issuer {
		Display::kv("Issuer", issuer);
	}
	if let Some(subject) = &plan.subject {
		Display::kv("Subject", subject);
	}

	match &plan.participants {
		Participants::Transfer { recipient, token } => {
			Display::kv("Recipient", &recipient.to_string());
			match token {
				Some(token) => Display::kv("Token", &token.to_string()),
				None => Display::kv("Token", "native"),
			}
		},
		Participants::Wrap { wrapped_token } => {
			Display::kv("Wrapped token", &wrapped_token.to_string());
		},
		Participants::Swap {
			router,
			from_token,
			to_token,
		} => {
			Display::kv("Router", &router.to_string());
			Display::kv("From", &from_token.to_string());
			Display::kv("To", &to_token.to_string());
		},
	}

	Display::section("Steps");
	for (index, step) in plan.steps.iter().enumerate() {
		println!("  {}. {} {}", index + 1, step.kind, step.amount);
	}

}

pub fn print_tokens(tokens: &[TokenInfo]) {
	if tokens.is_empty() {
		return;
	}
	Display::section("Tokens");
	for token in tokens {
		Display::token(token);
	}
}
