//! Storage contracts and the built-in ephemeral plan store.

pub mod id;
pub mod memory;

pub use id::*;
pub use memory::MemoryPlanStore;

// self
use crate::{
	_prelude::*,
	clock::duration_ms,
	error::{ConfigError, ensure_positive},
	rate_limit::ClientKey,
};

/// Short-id storage contract for shareable plans.
pub trait PlanStore
where
	Self: Send + Sync,
{
	/// Stores `content` under a freshly generated id.
	fn put(&self, content: String, originator: &ClientKey) -> Result<PlanId, StoreError>;

	/// Returns the content stored under `id`.
	///
	/// Unknown and expired ids both yield [`StoreError::NotFound`].
	fn get(&self, id: &PlanId) -> Result<String, StoreError>;

	/// Deletes every entry older than the TTL; returns how many were removed.
	fn sweep(&self) -> usize;

	/// Number of entries currently held, expired or not.
	fn len(&self) -> usize;

	/// Returns true when no entries are held.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Error type produced by [`PlanStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Every generated id collided with a live entry.
	#[error("Failed to generate a unique plan id after {attempts} attempts.")]
	Capacity {
		/// Number of ids generated before giving up.
		attempts: u32,
	},
	/// The id is unknown or its entry expired.
	#[error("Plan not found or expired.")]
	NotFound,
}

/// A plan held by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlan {
	/// Markdown content.
	pub content: String,
	/// Instant the plan was stored.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Client that stored the plan.
	pub originator: ClientKey,
}
impl StoredPlan {
	/// Whether the plan has outlived `ttl` at `now`.
	pub fn is_expired(&self, now: OffsetDateTime, ttl: Duration) -> bool {
		now - self.created_at > ttl
	}
}

/// Settings for a [`MemoryPlanStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanStoreConfig {
	/// Lifetime of a stored plan.
	#[serde(rename = "ttl_ms", with = "duration_ms")]
	pub ttl: Duration,
	/// How often the background sweep deletes expired plans.
	#[serde(rename = "sweep_interval_ms", with = "duration_ms")]
	pub sweep_interval: Duration,
	/// Id generations tried before reporting [`StoreError::Capacity`].
	pub max_id_attempts: u32,
}
impl PlanStoreConfig {
	const DEFAULT_MAX_ID_ATTEMPTS: u32 = 10;

	/// Overrides the plan lifetime.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Overrides the sweep interval.
	pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
		self.sweep_interval = interval;

		self
	}

	/// Overrides the bounded id-generation attempts.
	pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
		self.max_id_attempts = attempts;

		self
	}

	/// Validates durations and attempt bounds.
	pub fn validate(&self) -> Result<(), ConfigError> {
		ensure_positive("ttl", self.ttl)?;
		ensure_positive("sweep_interval", self.sweep_interval)?;

		if self.max_id_attempts == 0 {
			return Err(ConfigError::ZeroIdAttempts);
		}

		Ok(())
	}
}
impl Default for PlanStoreConfig {
	fn default() -> Self {
		Self {
			ttl: Duration::days(30),
			sweep_interval: Duration::hours(24),
			max_id_attempts: Self::DEFAULT_MAX_ID_ATTEMPTS,
		}
	}
}
