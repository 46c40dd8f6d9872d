//! Crate-level error types shared by the service facade and component configs.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by [`PlanService`](crate::service::PlanService) operations.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token could not be decoded into plan text.
	#[error(transparent)]
	Decode(#[from] crate::codec::DecodeError),
	/// Plan store rejected the operation.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Request input failed validation.
	#[error(transparent)]
	Validation(#[from] crate::validate::ValidationError),
	/// Plan identifier is malformed.
	#[error(transparent)]
	InvalidPlanId(#[from] crate::store::PlanIdError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The client exhausted its window for the policy.
	#[error("Rate limit exceeded for {policy}; resets at {}.", .decision.reset_at)]
	RateLimited {
		/// Policy label that refused the request.
		policy: &'static str,
		/// Decision carrying the window reset instant.
		decision: crate::rate_limit::RateLimitDecision,
	},
}
impl Error {
	/// Suggested HTTP status code for route handlers translating this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Error::RateLimited { .. } => 429,
			Error::Validation(_) | Error::InvalidPlanId(_) => 400,
			Error::Decode(_) | Error::Store(crate::store::StoreError::NotFound) => 404,
			Error::Store(_) | Error::Config(_) => 500,
		}
	}
}

/// Configuration and validation failures raised while building components.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A duration that drives windows, TTLs or sweeps must be positive.
	#[error("The `{field}` duration must be positive.")]
	NonPositiveDuration {
		/// Offending configuration field.
		field: &'static str,
	},
	/// Id generation needs at least one attempt.
	#[error("The `max_id_attempts` value must be at least 1.")]
	ZeroIdAttempts,
	/// Size bounds are inverted.
	#[error("The `{field}` bounds are inverted: min {min} > max {max}.")]
	InvertedBounds {
		/// Offending configuration field.
		field: &'static str,
		/// Configured lower bound.
		min: usize,
		/// Configured upper bound.
		max: usize,
	},
}

/// Rejects zero or negative durations.
pub(crate) fn ensure_positive(field: &'static str, value: Duration) -> Result<(), ConfigError> {
	if value.is_positive() { Ok(()) } else { Err(ConfigError::NonPositiveDuration { field }) }
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Capacity { attempts: 10 };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Store(_)));
		assert!(error.to_string().contains("10"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn status_codes_follow_error_kind() {
		assert_eq!(Error::from(StoreError::NotFound).status_code(), 404);
		assert_eq!(Error::from(StoreError::Capacity { attempts: 3 }).status_code(), 500);
		assert_eq!(
			Error::from(ConfigError::NonPositiveDuration { field: "ttl" }).status_code(),
			500
		);
	}

	#[test]
	fn ensure_positive_rejects_zero_and_negative() {
		assert!(ensure_positive("window", Duration::ZERO).is_err());
		assert!(ensure_positive("window", Duration::seconds(-1)).is_err());
		assert!(ensure_positive("window", Duration::milliseconds(1)).is_ok());
	}
}
