//! Counters exported when the `metrics` feature is enabled; every helper is a no-op otherwise.

// self
use crate::obs::{OpKind, OpOutcome};

/// Counts one finished operation as `plan_share_op_total{op, outcome}`.
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!("plan_share_op_total", "op" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Counts a rate-limit refusal as `plan_share_rate_limit_denied_total{policy}`.
///
/// Denials also land in the generic op counter; this one keeps the policy name so a single
/// exhausted budget stands out.
pub fn record_denial(policy: &str) {
	#[cfg(feature = "metrics")]
	metrics::counter!("plan_share_rate_limit_denied_total", "policy" => policy.to_owned())
		.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = policy;
}

/// Adds the entries a sweep removed to `plan_share_swept_total{target}`.
pub fn record_swept(target: &'static str, removed: usize) {
	#[cfg(feature = "metrics")]
	metrics::counter!("plan_share_swept_total", "target" => target).increment(removed as u64);

	#[cfg(not(feature = "metrics"))]
	let _ = (target, removed);
}
