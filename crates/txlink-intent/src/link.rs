//! Intent link parsing.
//!
//! Links look like `https://host/swap-token/1?token=<jwt>`. Relative forms
//! (`/swap-token/1?token=…`, `?token=…`) are accepted as well. The first
//! path segment, when it is a known route, hints at the operation kind.

use crate::DecodeError;
use txlink_types::OperationKind;
use url::Url;

const LINK_BASE: &str = "http://localhost/";

/// Token and route hint extracted from an intent link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentLink {
	pub token: String,
	pub route: Option<OperationKind>,
}

/// Maps a route segment to the operation kind it serves.
pub fn route_kind(segment: &str) -> Option<OperationKind> {
	match segment {
		"sign-transaction" => Some(OperationKind::Transfer),
		"wrap-token" => Some(OperationKind::Wrap),
		"swap-token" => Some(OperationKind::Swap),
		_ => None,
	}
}

/// Splits a link into its `token` query parameter and route hint.
///
/// # Errors
///
/// Returns [`DecodeError::TokenMissing`] when the link has no non-empty
/// `token` parameter, and [`DecodeError::TokenMalformed`] when it is not a
/// parseable URL at all.
pub fn parse_link(link: &str) -> Result<IntentLink, DecodeError> {
	let link = link.trim();
	if link.is_empty() {
		return Err(DecodeError::TokenMissing);
	}

	let base = Url::parse(LINK_BASE)
		.map_err(|e| DecodeError::TokenMalformed(format!("invalid link base: {e}")))?;
	let url = Url::options()
		.base_url(Some(&base))
		.parse(link)
		.map_err(|e| DecodeError::TokenMalformed(format!("invalid link: {e}")))?;

	let token = url
		.query_pairs()
		.find(|(key, _)| key == "token")
		.map(|(_, value)| value.trim().to_string())
		.filter(|value| !value.is_empty())
		.ok_or(DecodeError::TokenMissing)?;

	let route = url
		.path_segments()
		.and_then(|mut segments| segments.next())
		.and_then(route_kind);

	Ok(IntentLink { token, route })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_absolute_link() {
		let link = parse_link("https://pay.example.com/swap-token/1?token=abc.def.ghi").unwrap();
		assert_eq!(link.token, "abc.def.ghi");
		assert_eq!(link.route, Some(OperationKind::Swap));
	}

	#[test]
	fn test_parse_relative_link() {
		let link = parse_link("/wrap-token/7?foo=bar&token=a.b.c").unwrap();
		assert_eq!(link.token, "a.b.c");
		assert_eq!(link.route, Some(OperationKind::Wrap));

		let bare = parse_link("?token=a.b.c").unwrap();
		assert_eq!(bare.route, None);
	}

	#[test]
	fn test_unknown_route_gives_no_hint() {
		let link = parse_link("https://x.io/pay?token=a.b.c").unwrap();
		assert_eq!(link.route, None);
		assert_eq!(
			parse_link("https://x.io/sign-transaction/1?token=t").unwrap().route,
			Some(OperationKind::Transfer)
		);
	}

	#[test]
	fn test_missing_token() {
		assert_eq!(
			parse_link("https://x.io/swap-token/1"),
			Err(DecodeError::TokenMissing)
		);
		assert_eq!(
			parse_link("https://x.io/swap-token/1?token="),
			Err(DecodeError::TokenMissing)
		);
		assert_eq!(parse_link("   "), Err(DecodeError::TokenMissing));
	}
}
