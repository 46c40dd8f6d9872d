//! Fixed-window request limiter keyed by policy name and client address.
//!
//! Windows are created lazily on a client's first request and reset lazily once their reset
//! instant passes; [`RateLimiter::sweep`] only reclaims memory for abandoned clients.

pub mod client;
pub mod policy;

pub use client::*;
pub use policy::*;

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock, duration_ms},
	error::{ConfigError, ensure_positive},
	obs::{OpKind, OpOutcome, OpSpan, record_denial, record_swept},
};

/// Settings for a [`RateLimiter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimiterConfig {
	/// How often the background sweep drops expired windows.
	#[serde(rename = "sweep_interval_ms", with = "duration_ms")]
	pub sweep_interval: Duration,
}
impl RateLimiterConfig {
	/// Overrides the sweep interval.
	pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
		self.sweep_interval = interval;

		self
	}

	/// Validates the configured durations.
	pub fn validate(&self) -> Result<(), ConfigError> {
		ensure_positive("sweep_interval", self.sweep_interval)
	}
}
impl Default for RateLimiterConfig {
	fn default() -> Self {
		Self { sweep_interval: Duration::hours(1) }
	}
}

/// Outcome of [`RateLimiter::check_and_consume`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
	/// Whether the request was admitted (and counted).
	pub allowed: bool,
	/// Budget of the policy that produced the decision.
	pub limit: u32,
	/// Requests left in the current window.
	pub remaining: u32,
	/// Instant at which the current window resets.
	#[serde(with = "time::serde::rfc3339")]
	pub reset_at: OffsetDateTime,
}
impl RateLimitDecision {
	/// Returns the `X-RateLimit-*` response headers describing this decision.
	pub fn headers(&self) -> [(&'static str, String); 3] {
		let reset = self
			.reset_at
			.format(&Rfc3339)
			.unwrap_or_else(|_| self.reset_at.unix_timestamp().to_string());

		[
			("X-RateLimit-Limit", self.limit.to_string()),
			("X-RateLimit-Remaining", self.remaining.to_string()),
			("X-RateLimit-Reset", reset),
		]
	}

	/// Time left until the window resets, clamped at zero.
	pub fn retry_after(&self, now: OffsetDateTime) -> Duration {
		(self.reset_at - now).max(Duration::ZERO)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct WindowKey {
	policy: String,
	client: ClientKey,
}

#[derive(Clone, Copy, Debug)]
struct Window {
	count: u32,
	reset_at: OffsetDateTime,
}

/// Thread-safe fixed-window limiter shared by every route.
pub struct RateLimiter {
	config: RateLimiterConfig,
	clock: Arc<dyn Clock>,
	windows: Mutex<HashMap<WindowKey, Window>>,
}
impl RateLimiter {
	/// Creates a limiter backed by the system clock.
	pub fn new(config: RateLimiterConfig) -> Result<Self, ConfigError> {
		Self::with_clock(config, Arc::new(SystemClock))
	}

	/// Creates a limiter that reads time from the provided clock.
	pub fn with_clock(
		config: RateLimiterConfig,
		clock: Arc<dyn Clock>,
	) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self { config, clock, windows: Default::default() })
	}

	/// Returns the limiter configuration.
	pub fn config(&self) -> &RateLimiterConfig {
		&self.config
	}

	/// Admits and counts the request if the client's window still has budget.
	///
	/// Rejected requests are not counted and leave the window untouched.
	pub fn check_and_consume(
		&self,
		policy_name: &str,
		client: &ClientKey,
		policy: RateLimitPolicy,
	) -> RateLimitDecision {
		let op = OpSpan::new(OpKind::RateLimit, "check_and_consume").entered();
		let now = self.clock.now();
		let key = WindowKey { policy: policy_name.to_owned(), client: client.clone() };
		let mut windows = self.windows.lock();
		let window = windows
			.get(&key)
			.copied()
			.filter(|window| window.reset_at > now)
			.unwrap_or(Window { count: 0, reset_at: now.saturating_add(policy.window) });

		if window.count >= policy.max_requests {
			drop(windows);
			op.finish(OpOutcome::Denied);
			record_denial(policy_name);

			#[cfg(feature = "tracing")]
			tracing::warn!(policy = policy_name, %client, reset_at = %window.reset_at, "rate limit exceeded");

			return RateLimitDecision {
				allowed: false,
				limit: policy.max_requests,
				remaining: 0,
				reset_at: window.reset_at,
			};
		}

		let count = window.count + 1;

		windows.insert(key, Window { count, reset_at: window.reset_at });
		drop(windows);
		op.finish(OpOutcome::Success);

		RateLimitDecision {
			allowed: true,
			limit: policy.max_requests,
			remaining: policy.max_requests - count,
			reset_at: window.reset_at,
		}
	}

	/// Applies one of the named policies from the static table.
	pub fn check_named(&self, policy: LimitPolicy, client: &ClientKey) -> RateLimitDecision {
		self.check_and_consume(policy.as_str(), client, policy.policy())
	}

	/// Drops every window whose reset instant has passed; returns how many were removed.
	pub fn sweep(&self) -> usize {
		let op = OpSpan::new(OpKind::Sweep, "rate_limit").entered();
		let now = self.clock.now();
		let mut windows = self.windows.lock();
		let before = windows.len();

		windows.retain(|_, window| window.reset_at >= now);

		let removed = before - windows.len();

		drop(windows);
		op.finish(OpOutcome::Success);
		record_swept("rate_limit_windows", removed);

		#[cfg(feature = "tracing")]
		tracing::debug!(removed, "swept expired rate-limit windows");

		removed
	}

	/// Number of windows currently held in memory, expired or not.
	pub fn tracked_windows(&self) -> usize {
		self.windows.lock().len()
	}
}
impl Debug for RateLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateLimiter")
			.field("config", &self.config)
			.field("tracked_windows", &self.tracked_windows())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::clock::ManualClock;

	fn limiter() -> (RateLimiter, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-11-10 12:00 UTC)));
		let limiter = RateLimiter::with_clock(RateLimiterConfig::default(), clock.clone())
			.expect("Default limiter config should be valid.");

		(limiter, clock)
	}

	#[test]
	fn rejected_requests_do_not_extend_the_window() {
		let (limiter, clock) = limiter();
		let client = ClientKey::new("1.1.1.1");
		let policy = RateLimitPolicy::new(1, Duration::seconds(10));
		let first = limiter.check_and_consume("test", &client, policy);

		clock.advance(Duration::seconds(5));

		let second = limiter.check_and_consume("test", &client, policy);

		assert!(first.allowed);
		assert!(!second.allowed);
		assert_eq!(second.reset_at, first.reset_at);
	}

	#[test]
	fn extreme_windows_saturate_instead_of_overflowing() {
		let (limiter, clock) = limiter();
		let client = ClientKey::new("1.1.1.1");
		let policy = RateLimitPolicy::new(1, Duration::MAX);
		let first = limiter.check_and_consume("forever", &client, policy);
		let second = limiter.check_and_consume("forever", &client, policy);

		assert!(first.allowed);
		assert!(first.reset_at > clock.now());
		assert!(!second.allowed);
		assert_eq!(second.reset_at, first.reset_at);
	}

	#[test]
	fn constructors_reject_invalid_config() {
		let clock: Arc<dyn Clock> =
			Arc::new(ManualClock::new(macros::datetime!(2025-11-10 12:00 UTC)));

		assert_eq!(
			RateLimiter::with_clock(
				RateLimiterConfig::default().with_sweep_interval(Duration::ZERO),
				clock,
			)
			.err(),
			Some(ConfigError::NonPositiveDuration { field: "sweep_interval" })
		);
	}

	#[test]
	fn zero_budget_denies_without_storing_a_window() {
		let (limiter, _clock) = limiter();
		let decision = limiter.check_and_consume(
			"closed",
			&ClientKey::unknown(),
			RateLimitPolicy::new(0, Duration::seconds(1)),
		);

		assert!(!decision.allowed);
		assert_eq!(limiter.tracked_windows(), 0);
	}

	#[test]
	fn policies_partition_windows() {
		let (limiter, _clock) = limiter();
		let client = ClientKey::new("1.1.1.1");

		for _ in 0..10 {
			assert!(limiter.check_named(LimitPolicy::AiGeneration, &client).allowed);
		}

		assert!(!limiter.check_named(LimitPolicy::AiGeneration, &client).allowed);

		let storage = limiter.check_named(LimitPolicy::PlanStorage, &client);

		assert!(storage.allowed);
		assert_eq!(storage.remaining, 49);
	}

	#[test]
	fn sweep_keeps_live_windows() {
		let (limiter, clock) = limiter();
		let policy = RateLimitPolicy::new(5, Duration::seconds(10));

		limiter.check_and_consume("short", &ClientKey::new("a"), policy);
		limiter.check_and_consume(
			"long",
			&ClientKey::new("b"),
			RateLimitPolicy::new(5, Duration::minutes(10)),
		);

		// Exactly at the reset instant the window is stale for admission but not yet swept.
		clock.advance(Duration::seconds(10));

		assert_eq!(limiter.sweep(), 0);

		clock.advance(Duration::milliseconds(1));

		assert_eq!(limiter.sweep(), 1);
		assert_eq!(limiter.tracked_windows(), 1);
	}

	#[test]
	fn headers_describe_the_decision() {
		let decision = RateLimitDecision {
			allowed: true,
			limit: 50,
			remaining: 49,
			reset_at: macros::datetime!(2025-11-10 13:00 UTC),
		};
		let headers = decision.headers();

		assert_eq!(headers[0], ("X-RateLimit-Limit", "50".to_owned()));
		assert_eq!(headers[1], ("X-RateLimit-Remaining", "49".to_owned()));
		assert_eq!(headers[2].0, "X-RateLimit-Reset");
		assert_eq!(
			OffsetDateTime::parse(&headers[2].1, &Rfc3339).expect("Reset header should be RFC 3339."),
			decision.reset_at
		);
	}

	#[test]
	fn retry_after_clamps_at_zero() {
		let reset_at = macros::datetime!(2025-11-10 13:00 UTC);
		let decision = RateLimitDecision { allowed: false, limit: 1, remaining: 0, reset_at };

		assert_eq!(decision.retry_after(reset_at - Duration::minutes(5)), Duration::minutes(5));
		assert_eq!(decision.retry_after(reset_at + Duration::minutes(5)), Duration::ZERO);
	}

	#[test]
	fn config_round_trips_through_json() {
		let config: RateLimiterConfig = serde_json::from_str(r#"{"sweep_interval_ms":60000}"#)
			.expect("Config should deserialize from JSON.");

		assert_eq!(config.sweep_interval, Duration::minutes(1));
		assert!(config.validate().is_ok());
		assert!(RateLimiterConfig::default().with_sweep_interval(Duration::ZERO).validate().is_err());
	}
}
