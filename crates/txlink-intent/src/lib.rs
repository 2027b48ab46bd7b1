//! Intent decoding for the txlink pipeline.
//!
//! An intent link carries a JWT describing a pre-authorized on-chain
//! operation. This crate extracts the token from the link, decodes its
//! claims and normalizes them into an [`OperationPlan`] bound to a chain
//! from the registry.
//!
//! [`OperationPlan`]: txlink_types::OperationPlan

pub mod builders;
pub mod claims;
pub mod clock;
pub mod decoder;
pub mod link;

pub use builders::IntentTokenBuilder;
pub use claims::IntentClaims;
pub use clock::{Clock, FixedClock, SystemClock};
pub use decoder::IntentDecoder;
pub use link::{parse_link, IntentLink};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while decoding an intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	/// The link carries no token.
	#[error("Token is missing")]
	TokenMissing,
	/// The token is not a JWT or its claims do not describe a valid plan.
	#[error("Malformed token: {0}")]
	TokenMalformed(String),
	/// The token's `exp` is not in the future.
	#[error("Token expired at {expired_at}")]
	TokenExpired { expired_at: DateTime<Utc> },
	/// The chain, or a contract the operation needs on it, is unknown.
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(u64),
}
