//! Intent token decoding.
//!
//! Turns a bearer token into a validated [`OperationPlan`]. Decoding never
//! touches the network; expiry is measured against an injected [`Clock`].

use crate::claims::{ActionClaim, AmountClaim, ChainClaim, IntentClaims};
use crate::clock::{Clock, SystemClock};
use crate::link::parse_link;
use crate::DecodeError;
use chrono::DateTime;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use txlink_types::{
	parse_address, Action, ActionKind, Address, ChainDescriptor, ChainRegistry, NativeCurrency,
	OperationKind, OperationPlan, Participants, PlanError, SecretString, TokenAmount,
};

/// Decodes intent tokens against a chain registry.
///
/// By default tokens are decoded structurally: the signature is not checked.
/// [`IntentDecoder::with_verification`] switches to HS256 verification with
/// an optional expected issuer.
#[derive(Clone)]
pub struct IntentDecoder {
	registry: ChainRegistry,
	clock: Arc<dyn Clock>,
	key: DecodingKey,
	validation: Validation,
	issuer: Option<String>,
}

impl IntentDecoder {
	/// Structural decoder using the system clock.
	pub fn new(registry: ChainRegistry) -> Self {
		let mut validation = base_validation();
		validation.insecure_disable_signature_validation();
		Self {
			registry,
			clock: Arc::new(SystemClock),
			key: DecodingKey::from_secret(&[]),
			validation,
			issuer: None,
		}
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	/// Requires a valid HS256 signature under `secret`, and `iss == issuer`
	/// when an issuer is given.
	pub fn with_verification(mut self, secret: &SecretString, issuer: Option<String>) -> Self {
		let mut validation = base_validation();
		if issuer.is_some() {
			validation.set_required_spec_claims(&["iss"]);
		}
		self.key = secret.with_exposed(|s| DecodingKey::from_secret(s.as_bytes()));
		self.validation = validation;
		self.issuer = issuer;
		self
	}

	pub fn registry(&self) -> &ChainRegistry {
		&self.registry
	}

	/// Decodes a bare token.
	pub fn decode(&self, token: &str) -> Result<OperationPlan, DecodeError> {
		self.decode_with_route(token, None)
	}

	/// Decodes the `token` parameter of an intent link, using the link's
	/// route as a kind hint.
	pub fn decode_link(&self, link: &str) -> Result<OperationPlan, DecodeError> {
		let link = parse_link(link)?;
		self.decode_with_route(&link.token, link.route)
	}

	/// Decodes a token with an optional kind hint from the link route.
	///
	/// # Errors
	///
	/// - [`DecodeError::TokenMissing`] for an empty token
	/// - [`DecodeError::TokenMalformed`] when the token is not a JWT, fails
	///   verification, or its claims do not describe a complete plan
	/// - [`DecodeError::TokenExpired`] when `exp` is not in the future
	/// - [`DecodeError::UnsupportedChain`] when the chain or its contracts
	///   are unknown
	#[instrument(skip_all, fields(route = ?route))]
	pub fn decode_with_route(
		&self,
		token: &str,
		route: Option<OperationKind>,
	) -> Result<OperationPlan, DecodeError> {
		let token = token.trim();
		if token.is_empty() {
			return Err(DecodeError::TokenMissing);
		}

		let claims = self.read_claims(token)?;

		let now = self.clock.now();
		let expires_at = DateTime::from_timestamp(claims.exp, 0)
			.ok_or_else(|| malformed(format!("exp {} is out of range", claims.exp)))?;
		if expires_at <= now {
			return Err(DecodeError::TokenExpired {
				expired_at: expires_at,
			});
		}

		let actions = parse_actions(&claims.action)?;
		let kind = resolve_kind(claims.kind.as_deref(), route, &actions)?;

		let chain_claim = claims
			.chain
			.as_ref()
			.ok_or_else(|| malformed("missing chain"))?;
		let chain_id = chain_claim
			.id
			.value()
			.ok_or_else(|| malformed(format!("invalid chain id {:?}", chain_claim.id)))?;
		let currency = claims
			.currency
			.as_deref()
			.map(str::trim)
			.filter(|c| !c.is_empty())
			.map(str::to_string);
		let chain = self.resolve_chain(chain_id, chain_claim, currency.as_deref())?;
		let currency = currency.unwrap_or_else(|| chain.native_currency.symbol.clone());

		let participants = self.participants(kind, chain_id, &claims)?;
		let steps = build_steps(kind, claims.amount.as_ref(), &actions)?;

		let plan = OperationPlan {
			chain,
			kind,
			participants,
			steps,
			currency,
			expires_at,
			issuer: claims.iss,
			subject: claims.sub,
		};
		plan.validate(now).map_err(|e| match e {
			PlanError::Expired(expired_at) => DecodeError::TokenExpired { expired_at },
			other => malformed(other.to_string()),
		})?;

		debug!(
			chain_id = plan.chain.id,
			kind = %plan.kind,
			steps = plan.steps.len(),
			"Decoded intent"
		);
		Ok(plan)
	}

	fn read_claims(&self, token: &str) -> Result<IntentClaims, DecodeError> {
		let claims = decode::<IntentClaims>(token, &self.key, &self.validation)
			.map_err(|e| match e.kind() {
				ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => malformed("signature"),
				ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => malformed("issuer"),
				_ => malformed(e.to_string()),
			})?
			.claims;

		if let Some(issuer) = &self.issuer {
			if claims.iss.as_deref() != Some(issuer.as_str()) {
				return Err(malformed("issuer"));
			}
		}
		Ok(claims)
	}

	/// Registered chains use the registry descriptor. Unregistered chains
	/// are accepted only when the token embeds a complete descriptor.
	fn resolve_chain(
		&self,
		chain_id: u64,
		claim: &ChainClaim,
		currency: Option<&str>,
	) -> Result<ChainDescriptor, DecodeError> {
		if let Some(registered) = self.registry.descriptor(chain_id) {
			return Ok(registered.clone());
		}

		let field = |value: &Option<String>| {
			value
				.as_deref()
				.map(str::trim)
				.filter(|v| !v.is_empty())
				.map(str::to_string)
		};
		let (Some(name), Some(rpc), Some(explorer), Some(currency)) = (
			field(&claim.name),
			field(&claim.rpc),
			field(&claim.explorer_url),
			currency,
		) else {
			return Err(DecodeError::UnsupportedChain(chain_id));
		};
		if url::Url::parse(&rpc).is_err() {
			return Err(DecodeError::UnsupportedChain(chain_id));
		}

		Ok(ChainDescriptor {
			id: chain_id,
			name,
			rpc_endpoint: rpc,
			explorer_base_url: explorer,
			native_currency: NativeCurrency::new(currency, currency),
		})
	}

	fn participants(
		&self,
		kind: OperationKind,
		chain_id: u64,
		claims: &IntentClaims,
	) -> Result<Participants, DecodeError> {
		let contracts = self.registry.contracts(chain_id).cloned().unwrap_or_default();
		match kind {
			OperationKind::Transfer => Ok(Participants::Transfer {
				recipient: required_address("to", claims.to.as_deref())?,
				token: optional_address("contractAddress", claims.contract_address.as_deref())?,
			}),
			OperationKind::Wrap => Ok(Participants::Wrap {
				wrapped_token: contracts
					.wrapped_native
					.ok_or(DecodeError::UnsupportedChain(chain_id))?,
			}),
			OperationKind::Swap => Ok(Participants::Swap {
				router: contracts
					.router
					.ok_or(DecodeError::UnsupportedChain(chain_id))?,
				from_token: required_address(
					"fromContractAddress",
					claims.from_contract_address.as_deref(),
				)?,
				to_token: required_address(
					"toContractAddress",
					claims.to_contract_address.as_deref(),
				)?,
			}),
		}
	}
}

fn base_validation() -> Validation {
	let mut validation = Validation::new(Algorithm::HS256);
	// expiry is checked against the injected clock with zero leeway
	validation.validate_exp = false;
	validation.validate_aud = false;
	validation.leeway = 0;
	validation.required_spec_claims = HashSet::new();
	validation
}

fn malformed(reason: impl Into<String>) -> DecodeError {
	DecodeError::TokenMalformed(reason.into())
}

fn required_address(field: &str, value: Option<&str>) -> Result<Address, DecodeError> {
	match value.map(str::trim).filter(|v| !v.is_empty()) {
		Some(value) => parse_address(value).map_err(|e| malformed(format!("{field}: {e}"))),
		None => Err(malformed(format!("missing {field}"))),
	}
}

fn optional_address(field: &str, value: Option<&str>) -> Result<Option<Address>, DecodeError> {
	match value.map(str::trim).filter(|v| !v.is_empty()) {
		Some(_) => required_address(field, value).map(Some),
		None => Ok(None),
	}
}

fn parse_action_kind(name: &str) -> Result<ActionKind, DecodeError> {
	match name.trim().to_ascii_lowercase().as_str() {
		"deposit" => Ok(ActionKind::Deposit),
		"approve" => Ok(ActionKind::Approve),
		"swap" => Ok(ActionKind::Swap),
		"transfer" => Ok(ActionKind::Transfer),
		other => Err(malformed(format!("unknown action '{other}'"))),
	}
}

fn parse_amount(claim: &AmountClaim) -> Result<TokenAmount, DecodeError> {
	claim
		.to_string()
		.parse::<TokenAmount>()
		.map_err(|e| malformed(e.to_string()))
}

fn parse_actions(actions: &[ActionClaim]) -> Result<Vec<Action>, DecodeError> {
	actions
		.iter()
		.map(|claim| {
			Ok(Action::new(
				parse_action_kind(&claim.action)?,
				parse_amount(&claim.amount)?,
			))
		})
		.collect()
}

fn infer_kind(actions: &[Action]) -> Option<OperationKind> {
	let has = |kind: ActionKind| actions.iter().any(|action| action.kind == kind);
	if has(ActionKind::Swap) {
		Some(OperationKind::Swap)
	} else if has(ActionKind::Deposit) {
		Some(OperationKind::Wrap)
	} else if has(ActionKind::Transfer) {
		Some(OperationKind::Transfer)
	} else {
		None
	}
}

/// Explicit claim, route hint and action inference must agree; the first
/// one present wins and Transfer is the fallback.
fn resolve_kind(
	explicit: Option<&str>,
	route: Option<OperationKind>,
	actions: &[Action],
) -> Result<OperationKind, DecodeError> {
	let explicit = explicit
		.map(|kind| kind.parse::<OperationKind>().map_err(malformed))
		.transpose()?;

	let mut resolved: Option<(&str, OperationKind)> = None;
	for (source, candidate) in [
		("kind claim", explicit),
		("route", route),
		("actions", infer_kind(actions)),
	] {
		let Some(candidate) = candidate else { continue };
		if let Some((first, kind)) = resolved {
			if kind != candidate {
				return Err(malformed(format!(
					"{source} describes a {candidate} but {first} describes a {kind}"
				)));
			}
		} else {
			resolved = Some((source, candidate));
		}
	}
	Ok(resolved.map_or(OperationKind::Transfer, |(_, kind)| kind))
}

/// Normalizes the steps of a plan.
///
/// Transfers carry one `Transfer` step, wraps one `Deposit`, swaps an
/// `Approve` and a `Swap` of the same amount.
fn build_steps(
	kind: OperationKind,
	amount: Option<&AmountClaim>,
	actions: &[Action],
) -> Result<Vec<Action>, DecodeError> {
	let find = |kind: ActionKind| {
		actions
			.iter()
			.find(|action| action.kind == kind)
			.map(|action| action.amount.clone())
	};
	let first = actions.first().map(|action| action.amount.clone());
	let claimed = amount.map(parse_amount).transpose()?;

	let missing = || malformed("missing amount");
	let steps = match kind {
		OperationKind::Transfer => {
			let amount = claimed
				.or_else(|| find(ActionKind::Transfer))
				.or(first)
				.ok_or_else(missing)?;
			vec![Action::new(ActionKind::Transfer, amount)]
		},
		OperationKind::Wrap => {
			let amount = find(ActionKind::Deposit)
				.or(first)
				.or(claimed)
				.ok_or_else(missing)?;
			vec![Action::new(ActionKind::Deposit, amount)]
		},
		OperationKind::Swap => {
			let amount = find(ActionKind::Swap)
				.or(first)
				.or(claimed)
				.ok_or_else(missing)?;
			vec![
				Action::new(ActionKind::Approve, amount.clone()),
				Action::new(ActionKind::Swap, amount),
			]
		},
	};
	Ok(steps)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builders::{IntentTokenBuilder, TEST_LINK_SECRET};
	use crate::claims::ChainIdClaim;
	use crate::clock::FixedClock;

	const NOW: i64 = 1_700_000_000;

	fn decoder() -> IntentDecoder {
		IntentDecoder::new(ChainRegistry::builtin()).with_clock(Arc::new(FixedClock::at_timestamp(NOW)))
	}

	#[test]
	fn test_decode_transfer() {
		let token = IntentTokenBuilder::transfer().with_exp(NOW + 60).build();
		let plan = decoder().decode(&token).unwrap();

		assert_eq!(plan.kind, OperationKind::Transfer);
		assert_eq!(plan.chain.id, 240);
		assert_eq!(plan.currency, "zkTCRO");
		assert_eq!(plan.steps.len(), 1);
		assert_eq!(plan.steps[0].kind, ActionKind::Transfer);
		assert_eq!(plan.steps[0].amount.as_str(), "1.5");
		assert!(matches!(
			plan.participants,
			Participants::Transfer { token: None, .. }
		));
		assert_eq!(plan.expires_at.timestamp(), NOW + 60);
	}

	#[test]
	fn test_decode_erc20_transfer() {
		let token = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_contract_address("0x4444444444444444444444444444444444444444")
			.build();
		let plan = decoder().decode(&token).unwrap();
		assert_eq!(
			plan.participants,
			Participants::Transfer {
				recipient: Address::repeat_byte(0x33),
				token: Some(Address::repeat_byte(0x44)),
			}
		);
	}

	#[test]
	fn test_decode_wrap_uses_registry_contract() {
		let token = IntentTokenBuilder::wrap().with_exp(NOW + 60).build();
		let plan = decoder().decode(&token).unwrap();

		let wrapped = ChainRegistry::builtin()
			.contracts(240)
			.unwrap()
			.wrapped_native
			.unwrap();
		assert_eq!(plan.kind, OperationKind::Wrap);
		assert_eq!(
			plan.participants,
			Participants::Wrap {
				wrapped_token: wrapped
			}
		);
		assert_eq!(plan.steps, vec![Action::new(ActionKind::Deposit, "2".parse().unwrap())]);
	}

	#[test]
	fn test_decode_swap_normalizes_steps() {
		let token = IntentTokenBuilder::swap().with_exp(NOW + 60).build();
		let plan = decoder().decode(&token).unwrap();

		assert_eq!(plan.kind, OperationKind::Swap);
		let kinds: Vec<_> = plan.steps.iter().map(|s| s.kind).collect();
		assert_eq!(kinds, vec![ActionKind::Approve, ActionKind::Swap]);
		assert!(plan.steps.iter().all(|s| s.amount.as_str() == "10"));
		match plan.participants {
			Participants::Swap {
				router,
				from_token,
				to_token,
			} => {
				assert_eq!(router, ChainRegistry::builtin().contracts(240).unwrap().router.unwrap());
				assert_eq!(from_token, Address::repeat_byte(0x11));
				assert_eq!(to_token, Address::repeat_byte(0x22));
			},
			other => panic!("unexpected participants {other:?}"),
		}
	}

	#[test]
	fn test_empty_token_is_missing() {
		assert_eq!(decoder().decode(""), Err(DecodeError::TokenMissing));
		assert_eq!(decoder().decode("  \n"), Err(DecodeError::TokenMissing));
	}

	#[test]
	fn test_garbage_is_malformed() {
		for token in ["not-a-jwt", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.bm90IGpzb24.sig"] {
			assert!(
				matches!(decoder().decode(token), Err(DecodeError::TokenMalformed(_))),
				"{token} should be malformed"
			);
		}
	}

	#[test]
	fn test_expiry_boundary() {
		let expired = IntentTokenBuilder::transfer().with_exp(NOW).build();
		assert!(matches!(
			decoder().decode(&expired),
			Err(DecodeError::TokenExpired { expired_at }) if expired_at.timestamp() == NOW
		));

		let past = IntentTokenBuilder::transfer().with_exp(NOW - 3600).build();
		assert!(matches!(
			decoder().decode(&past),
			Err(DecodeError::TokenExpired { .. })
		));

		let valid = IntentTokenBuilder::transfer().with_exp(NOW + 1).build();
		assert!(decoder().decode(&valid).is_ok());
	}

	#[test]
	fn test_invalid_amounts_are_malformed() {
		for amount in ["-1", "1e18", "ten", ""] {
			let token = IntentTokenBuilder::transfer()
				.with_exp(NOW + 60)
				.with_amount(amount)
				.build();
			assert!(
				matches!(decoder().decode(&token), Err(DecodeError::TokenMalformed(_))),
				"{amount} should be rejected"
			);
		}
	}

	#[test]
	fn test_missing_fields_are_malformed() {
		let no_recipient = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_claims(|c| c.to = None)
			.build();
		assert_eq!(
			decoder().decode(&no_recipient),
			Err(DecodeError::TokenMalformed("missing to".into()))
		);

		let no_to_token = IntentTokenBuilder::swap()
			.with_exp(NOW + 60)
			.with_claims(|c| c.to_contract_address = None)
			.build();
		assert!(matches!(
			decoder().decode(&no_to_token),
			Err(DecodeError::TokenMalformed(reason)) if reason.contains("toContractAddress")
		));

		let no_chain = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_claims(|c| c.chain = None)
			.build();
		assert!(matches!(
			decoder().decode(&no_chain),
			Err(DecodeError::TokenMalformed(_))
		));

		let no_amount = IntentTokenBuilder::wrap()
			.with_exp(NOW + 60)
			.with_claims(|c| {
				c.action.clear();
				c.amount = None;
				c.kind = Some("wrap".into());
			})
			.build();
		assert_eq!(
			decoder().decode(&no_amount),
			Err(DecodeError::TokenMalformed("missing amount".into()))
		);
	}

	#[test]
	fn test_unknown_action_is_malformed() {
		let token = IntentTokenBuilder::swap()
			.with_exp(NOW + 60)
			.with_claims(|c| c.action[0].action = "bridge".into())
			.build();
		assert!(matches!(
			decoder().decode(&token),
			Err(DecodeError::TokenMalformed(reason)) if reason.contains("bridge")
		));
	}

	#[test]
	fn test_kind_resolution() {
		// route hint decides when actions say nothing
		let token = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_claims(|c| c.action.clear())
			.build();
		let plan = decoder()
			.decode_with_route(&token, Some(OperationKind::Transfer))
			.unwrap();
		assert_eq!(plan.kind, OperationKind::Transfer);

		// a swap token opened on the wrap route contradicts itself
		let swap = IntentTokenBuilder::swap().with_exp(NOW + 60).build();
		assert!(matches!(
			decoder().decode_with_route(&swap, Some(OperationKind::Wrap)),
			Err(DecodeError::TokenMalformed(_))
		));

		// explicit kind claim conflicting with actions
		let conflicting = IntentTokenBuilder::swap()
			.with_exp(NOW + 60)
			.with_kind("transfer")
			.build();
		assert!(matches!(
			decoder().decode(&conflicting),
			Err(DecodeError::TokenMalformed(_))
		));
	}

	#[test]
	fn test_unsupported_chain() {
		let unknown = IntentTokenBuilder::swap()
			.with_exp(NOW + 60)
			.with_claims(|c| {
				c.chain = Some(ChainClaim {
					id: ChainIdClaim::Number(1),
					name: Some("Ethereum".into()),
					explorer_url: Some("https://etherscan.io".into()),
					rpc: Some("https://eth.llamarpc.com".into()),
				})
			})
			.build();
		// embedded descriptor is usable but no router is registered for chain 1
		assert_eq!(
			decoder().decode(&unknown),
			Err(DecodeError::UnsupportedChain(1))
		);

		let bare = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_claims(|c| {
				c.chain = Some(ChainClaim {
					id: ChainIdClaim::Number(1),
					name: None,
					explorer_url: None,
					rpc: None,
				})
			})
			.build();
		assert_eq!(decoder().decode(&bare), Err(DecodeError::UnsupportedChain(1)));
	}

	#[test]
	fn test_embedded_chain_descriptor_for_transfer() {
		let token = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_claims(|c| {
				c.currency = Some("ETH".into());
				c.chain = Some(ChainClaim {
					id: ChainIdClaim::Text("0x7a69".into()),
					name: Some("Local Devnet".into()),
					explorer_url: Some("http://localhost:4000".into()),
					rpc: Some("http://localhost:8545".into()),
				})
			})
			.build();
		let plan = decoder().decode(&token).unwrap();
		assert_eq!(plan.chain.id, 31337);
		assert_eq!(plan.chain.rpc_endpoint, "http://localhost:8545");
		assert_eq!(plan.chain.native_currency.symbol, "ETH");
		assert_eq!(plan.currency, "ETH");
	}

	#[test]
	fn test_registered_chain_ignores_embedded_endpoints() {
		let token = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_claims(|c| {
				if let Some(chain) = c.chain.as_mut() {
					chain.rpc = Some("http://attacker.invalid".into());
				}
			})
			.build();
		let plan = decoder().decode(&token).unwrap();
		assert_eq!(plan.chain.rpc_endpoint, "https://testnet.zkevm.cronos.org");
	}

	#[test]
	fn test_decode_link() {
		let link = IntentTokenBuilder::swap().with_exp(NOW + 60).link();
		let plan = decoder().decode_link(&link).unwrap();
		assert_eq!(plan.kind, OperationKind::Swap);

		assert_eq!(
			decoder().decode_link("https://txlink.app/swap-token/1"),
			Err(DecodeError::TokenMissing)
		);
	}

	#[test]
	fn test_verification_checks_signature_and_issuer() {
		let secret = SecretString::from(TEST_LINK_SECRET);
		let verifying = decoder().with_verification(&secret, Some("txlink".into()));

		let good = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_issuer("txlink")
			.build();
		let plan = verifying.decode(&good).unwrap();
		assert_eq!(plan.issuer.as_deref(), Some("txlink"));

		let forged = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_issuer("txlink")
			.with_secret("some-other-secret")
			.build();
		assert_eq!(
			verifying.decode(&forged),
			Err(DecodeError::TokenMalformed("signature".into()))
		);

		let wrong_issuer = IntentTokenBuilder::transfer()
			.with_exp(NOW + 60)
			.with_issuer("someone-else")
			.build();
		assert_eq!(
			verifying.decode(&wrong_issuer),
			Err(DecodeError::TokenMalformed("issuer".into()))
		);

		// structural decoding accepts any signature
		assert!(decoder().decode(&forged).is_ok());
	}
}
