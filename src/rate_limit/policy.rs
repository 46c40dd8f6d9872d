//! Named fixed-window policies and the static policy table.

// self
use crate::{_prelude::*, clock::duration_ms};

/// Request budget applied per client over a fixed window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
	/// Requests permitted per window.
	pub max_requests: u32,
	/// Window length; the counter resets entirely once it elapses.
	#[serde(rename = "window_ms", with = "duration_ms")]
	pub window: Duration,
}
impl RateLimitPolicy {
	/// Creates a policy allowing `max_requests` per `window`.
	pub const fn new(max_requests: u32, window: Duration) -> Self {
		Self { max_requests, window }
	}
}

/// Policies recognised by the service, ordered from most to least restrictive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitPolicy {
	/// LLM-backed plan generation.
	AiGeneration,
	/// Short-id plan storage.
	PlanStorage,
	/// Short-id plan retrieval.
	PlanRetrieval,
}
impl LimitPolicy {
	/// Every named policy.
	pub const ALL: [LimitPolicy; 3] =
		[LimitPolicy::AiGeneration, LimitPolicy::PlanStorage, LimitPolicy::PlanRetrieval];

	const WINDOW: Duration = Duration::hours(1);

	/// Returns the stable policy name used to partition windows.
	pub const fn as_str(self) -> &'static str {
		match self {
			LimitPolicy::AiGeneration => "AI_GENERATION",
			LimitPolicy::PlanStorage => "PLAN_STORAGE",
			LimitPolicy::PlanRetrieval => "PLAN_RETRIEVAL",
		}
	}

	/// Returns the budget configured for this policy.
	pub const fn policy(self) -> RateLimitPolicy {
		match self {
			LimitPolicy::AiGeneration => RateLimitPolicy::new(10, Self::WINDOW),
			LimitPolicy::PlanStorage => RateLimitPolicy::new(50, Self::WINDOW),
			LimitPolicy::PlanRetrieval => RateLimitPolicy::new(200, Self::WINDOW),
		}
	}
}
impl Display for LimitPolicy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
