//! Client identity used to partition rate-limit windows and tag stored plans.

// std
use std::net::IpAddr;
// self
use crate::_prelude::*;

/// Network-derived client identity.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientKey(String);
impl ClientKey {
	/// Shared bucket for clients without a derivable address.
	pub const UNKNOWN: &'static str = "unknown";

	/// Wraps an already-derived key.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the shared bucket used when no address is known.
	pub fn unknown() -> Self {
		Self(Self::UNKNOWN.into())
	}

	/// Derives a key from the `X-Forwarded-For` header value and the transport peer.
	///
	/// The first non-empty hop in the forwarded chain wins, then the peer address, then the
	/// shared [`ClientKey::UNKNOWN`] bucket.
	pub fn derive(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> Self {
		forwarded_for
			.and_then(|chain| chain.split(',').next())
			.map(str::trim)
			.filter(|hop| !hop.is_empty())
			.map(Self::new)
			.or_else(|| peer.map(|ip| Self(ip.to_string())))
			.unwrap_or_else(Self::unknown)
	}

	/// Whether this key is the shared unknown bucket.
	pub fn is_unknown(&self) -> bool {
		self.0 == Self::UNKNOWN
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ClientKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for ClientKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Client({})", self.0)
	}
}
impl Display for ClientKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
