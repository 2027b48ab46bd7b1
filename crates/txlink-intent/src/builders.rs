//! Intent token builder for tests and local tooling.

use crate::claims::{ActionClaim, AmountClaim, ChainClaim, ChainIdClaim, IntentClaims};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};

/// Secret the builder signs with unless told otherwise.
pub const TEST_LINK_SECRET: &str = "txlink-test-secret-at-least-32-chars";

/// Fluent builder producing signed (HS256) intent tokens and links.
///
/// Presets target Cronos zkEVM Testnet (240) and expire an hour from now.
#[derive(Debug, Clone)]
pub struct IntentTokenBuilder {
	claims: IntentClaims,
	secret: String,
	route: &'static str,
}

impl IntentTokenBuilder {
	fn with_defaults(route: &'static str) -> Self {
		Self {
			claims: IntentClaims {
				from: Some("0x1234567890123456789012345678901234567890".to_string()),
				to: None,
				amount: None,
				contract_address: None,
				from_contract_address: None,
				to_contract_address: None,
				currency: Some("zkTCRO".to_string()),
				chain: Some(ChainClaim {
					id: ChainIdClaim::Number(240),
					name: Some("Cronos zkEVM Testnet".to_string()),
					explorer_url: Some("https://explorer.zkevm.cronos.org/testnet".to_string()),
					rpc: Some("https://testnet.zkevm.cronos.org".to_string()),
				}),
				exp: Utc::now().timestamp() + 3600,
				action: Vec::new(),
				kind: None,
				iss: None,
				sub: None,
			},
			secret: TEST_LINK_SECRET.to_string(),
			route,
		}
	}

	/// Native transfer of 1.5 to `0x3333…`, no actions.
	pub fn transfer() -> Self {
		let mut builder = Self::with_defaults("sign-transaction");
		builder.claims.to = Some(format!("0x{}", "33".repeat(20)));
		builder.claims.amount = Some(AmountClaim::from("1.5"));
		builder
	}

	/// Single deposit action of 2.
	pub fn wrap() -> Self {
		let mut builder = Self::with_defaults("wrap-token");
		builder.claims.action = vec![ActionClaim {
			action: "deposit".to_string(),
			amount: AmountClaim::from("2"),
		}];
		builder
	}

	/// Approve 10 then swap 10 from `0x1111…` to `0x2222…`.
	pub fn swap() -> Self {
		let mut builder = Self::with_defaults("swap-token");
		builder.claims.from_contract_address = Some(format!("0x{}", "11".repeat(20)));
		builder.claims.to_contract_address = Some(format!("0x{}", "22".repeat(20)));
		builder.claims.action = vec![
			ActionClaim {
				action: "approve".to_string(),
				amount: AmountClaim::from("10"),
			},
			ActionClaim {
				action: "swap".to_string(),
				amount: AmountClaim::from("10"),
			},
		];
		builder
	}

	/// Sets `exp` in unix seconds.
	pub fn with_exp(mut self, exp: i64) -> Self {
		self.claims.exp = exp;
		self
	}

	/// Sets `exp` relative to now.
	pub fn expires_in(mut self, seconds: i64) -> Self {
		self.claims.exp = Utc::now().timestamp() + seconds;
		self
	}

	/// Sets the `amount` claim and every action amount.
	pub fn with_amount(mut self, amount: &str) -> Self {
		self.claims.amount = Some(AmountClaim::from(amount));
		for action in &mut self.claims.action {
			action.amount = AmountClaim::from(amount);
		}
		self
	}

	pub fn with_chain_id(mut self, chain_id: u64) -> Self {
		if let Some(chain) = self.claims.chain.as_mut() {
			chain.id = ChainIdClaim::Number(chain_id);
		}
		self
	}

	pub fn with_contract_address(mut self, address: &str) -> Self {
		self.claims.contract_address = Some(address.to_string());
		self
	}

	pub fn with_kind(mut self, kind: &str) -> Self {
		self.claims.kind = Some(kind.to_string());
		self
	}

	pub fn with_issuer(mut self, issuer: &str) -> Self {
		self.claims.iss = Some(issuer.to_string());
		self
	}

	/// Signs with a different secret.
	pub fn with_secret(mut self, secret: &str) -> Self {
		self.secret = secret.to_string();
		self
	}

	/// Edits the raw claims.
	pub fn with_claims(mut self, edit: impl FnOnce(&mut IntentClaims)) -> Self {
		edit(&mut self.claims);
		self
	}

	pub fn claims(&self) -> &IntentClaims {
		&self.claims
	}

	/// Encodes the signed token.
	pub fn build(&self) -> String {
		encode(
			&Header::default(),
			&self.claims,
			&EncodingKey::from_secret(self.secret.as_bytes()),
		)
		.unwrap_or_default()
	}

	/// Full link on the preset's route.
	pub fn link(&self) -> String {
		format!("https://txlink.app/{}/1?token={}", self.route, self.build())
	}
}
