//! Optional observability helpers for plan-share operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `plan_share.op` with the `op` (operation),
//!   `stage` (call site) and `outcome` fields, plus debug/warn events for denials and sweeps.
//! - Enable `metrics` to increment the `plan_share_op_total` counter for every
//!   success/failure/denial, labeled by `op` + `outcome`, plus
//!   `plan_share_rate_limit_denied_total{policy}` and `plan_share_swept_total{target}`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Plan text to token.
	Encode,
	/// Token to plan text.
	Decode,
	/// Fixed-window admission check.
	RateLimit,
	/// Short-id plan insertion.
	StorePut,
	/// Short-id plan lookup.
	StoreGet,
	/// Background expiry sweep.
	Sweep,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Encode => "encode",
			OpKind::Decode => "decode",
			OpKind::RateLimit => "rate_limit",
			OpKind::StorePut => "store_put",
			OpKind::StoreGet => "store_get",
			OpKind::Sweep => "sweep",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Completed as requested.
	Success,
	/// Returned a typed failure to the caller.
	Failure,
	/// Refused by a rate-limit policy.
	Denied,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
			OpOutcome::Denied => "denied",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
