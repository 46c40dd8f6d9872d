//! Composition root tying the limiter, validators, plan store and codec together.
//!
//! Each method mirrors one HTTP route of the plan-sharing service minus the transport: it
//! consults the route's rate-limit policy first, then validates input, then touches the store or
//! codec. Route handlers translate the returned [`Error`] via [`Error::status_code`].

// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	codec,
	error::ConfigError,
	rate_limit::{ClientKey, LimitPolicy, RateLimitDecision, RateLimiter, RateLimiterConfig},
	share::ShareLink,
	store::{MemoryPlanStore, PlanId, PlanStore, PlanStoreConfig},
	validate::ValidationLimits,
};
#[cfg(feature = "tokio")]
use crate::sweep::{SweeperHandle, SweeperSet};

/// Settings for every component owned by a [`PlanService`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
	/// Public origin that share links point at.
	pub base_url: Url,
	/// Rate limiter settings.
	pub rate_limit: RateLimiterConfig,
	/// Plan store settings.
	pub store: PlanStoreConfig,
	/// Input size bounds.
	pub limits: ValidationLimits,
}
impl ServiceConfig {
	/// Validates every nested section.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.rate_limit.validate()?;
		self.store.validate()?;
		self.limits.validate()
	}
}
impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			base_url: Url::parse("http://localhost:3000/")
				.unwrap_or_else(|e| unreachable!("static URL is valid: {e}")),
			rate_limit: RateLimiterConfig::default(),
			store: PlanStoreConfig::default(),
			limits: ValidationLimits::default(),
		}
	}
}

/// Receipt returned after a plan is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPlanReceipt {
	/// Short id assigned by the store.
	pub id: PlanId,
	/// Shareable URL carrying the short id.
	pub share_url: Url,
	/// Storage-policy decision for response headers.
	pub decision: RateLimitDecision,
}

/// Plan content returned by a short-id lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedPlan {
	/// Markdown content.
	pub content: String,
	/// Retrieval-policy decision for response headers.
	pub decision: RateLimitDecision,
}

/// Shared facade passed by reference to every route handler.
///
/// The limiter and the store are built from the sections of one [`ServiceConfig`], so the
/// settings a component runs on are the only copy there is.
#[derive(Clone)]
pub struct PlanService {
	base_url: Url,
	limits: ValidationLimits,
	limiter: Arc<RateLimiter>,
	store: Arc<MemoryPlanStore>,
}
impl PlanService {
	/// Builds the service and its components on the system clock.
	pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
		Self::with_clock(config, Arc::new(SystemClock))
	}

	/// Builds the service with every component reading time from `clock`.
	///
	/// Fails before anything is constructed when any section of `config` is invalid.
	pub fn with_clock(config: ServiceConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
		config.validate()?;

		let ServiceConfig { base_url, rate_limit, store, limits } = config;
		let limiter = Arc::new(RateLimiter::with_clock(rate_limit, clock.clone())?);
		let store = Arc::new(MemoryPlanStore::with_clock(store, clock)?);

		Ok(Self { base_url, limits, limiter, store })
	}

	/// Public origin that share links point at.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Input size bounds applied to ideas and plans.
	pub fn limits(&self) -> &ValidationLimits {
		&self.limits
	}

	/// Fixed-window limiter shared across routes.
	pub fn limiter(&self) -> &Arc<RateLimiter> {
		&self.limiter
	}

	/// Short-id plan store.
	pub fn store(&self) -> &Arc<MemoryPlanStore> {
		&self.store
	}

	/// Checks the generation budget and the idea before an LLM call is made.
	pub fn admit_generation(&self, client: &ClientKey, idea: &str) -> Result<RateLimitDecision> {
		let decision = self.admit(LimitPolicy::AiGeneration, client)?;

		self.limits.validate_idea(idea)?;

		Ok(decision)
	}

	/// Validates and stores plan content under a new short id.
	pub fn store_plan(&self, client: &ClientKey, content: String) -> Result<StoredPlanReceipt> {
		let decision = self.admit(LimitPolicy::PlanStorage, client)?;

		if let Err(e) = self.limits.validate_plan_content(&content) {
			#[cfg(feature = "tracing")]
			tracing::info!(%client, error = %e, "plan storage validation failed");

			return Err(e.into());
		}

		let id = self.store.put(content, client)?;
		let share_url = ShareLink::Short(id.clone()).to_url(&self.base_url);

		Ok(StoredPlanReceipt { id, share_url, decision })
	}

	/// Resolves a short id supplied by a client.
	pub fn fetch_plan(&self, client: &ClientKey, raw_id: &str) -> Result<FetchedPlan> {
		let decision = self.admit(LimitPolicy::PlanRetrieval, client)?;
		let id = PlanId::parse(raw_id)?;
		let content = self.store.get(&id)?;

		Ok(FetchedPlan { content, decision })
	}

	/// Decodes a self-contained share token, bounded by the maximum plan size.
	pub fn decode_shared(&self, token: &str) -> Result<String> {
		// Plan bounds count characters; a UTF-8 character takes at most four bytes.
		let max_bytes = self.limits.plan_max_chars.saturating_mul(4);

		Ok(codec::decode_with_limit(token, max_bytes)?)
	}

	/// Starts the limiter and store sweeps on the intervals those components were built with.
	///
	/// Must be called from within a tokio runtime.
	#[cfg(feature = "tokio")]
	pub fn spawn_sweepers(&self) -> SweeperSet {
		let mut set = SweeperSet::default();
		let limiter = self.limiter.clone();
		let store = self.store.clone();

		set.push(SweeperHandle::spawn(
			"rate_limit",
			self.limiter.config().sweep_interval.unsigned_abs(),
			move || limiter.sweep(),
		));
		set.push(SweeperHandle::spawn(
			"plan_store",
			self.store.config().sweep_interval.unsigned_abs(),
			move || store.sweep(),
		));

		set
	}

	fn admit(&self, policy: LimitPolicy, client: &ClientKey) -> Result<RateLimitDecision> {
		let decision = self.limiter.check_named(policy, client);

		if decision.allowed {
			Ok(decision)
		} else {
			Err(Error::RateLimited { policy: policy.as_str(), decision })
		}
	}
}
impl Debug for PlanService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PlanService")
			.field("base_url", &self.base_url.as_str())
			.field("limits", &self.limits)
			.field("limiter", &self.limiter)
			.field("store", &self.store)
			.finish()
	}
}
