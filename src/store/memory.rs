//! Thread-safe in-memory [`PlanStore`] implementation; entries die with the process.

// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	error::ConfigError,
	obs::{OpKind, OpOutcome, OpSpan, record_swept},
	rate_limit::ClientKey,
	store::{IdSource, PlanId, PlanStore, PlanStoreConfig, RandomIdSource, StoreError, StoredPlan},
};

type PlanMap = RwLock<HashMap<PlanId, StoredPlan>>;

/// Process-local plan store with TTL expiry and bounded id-collision retries.
pub struct MemoryPlanStore {
	config: PlanStoreConfig,
	clock: Arc<dyn Clock>,
	ids: Arc<dyn IdSource>,
	plans: PlanMap,
}
impl MemoryPlanStore {
	/// Creates a store backed by the system clock and random ids.
	pub fn new(config: PlanStoreConfig) -> Result<Self, ConfigError> {
		Self::with_clock(config, Arc::new(SystemClock))
	}

	/// Creates a store that reads time from the provided clock.
	///
	/// Fails when `config` carries a non-positive duration or zero id attempts.
	pub fn with_clock(
		config: PlanStoreConfig,
		clock: Arc<dyn Clock>,
	) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self { config, clock, ids: Arc::new(RandomIdSource), plans: Default::default() })
	}

	/// Replaces the identifier source.
	pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
		self.ids = ids;

		self
	}

	/// Returns the store configuration.
	pub fn config(&self) -> &PlanStoreConfig {
		&self.config
	}

	/// Returns a copy of the entry under `id`, including its metadata, if still live.
	pub fn inspect(&self, id: &PlanId) -> Option<StoredPlan> {
		let now = self.clock.now();

		self.plans.read().get(id).filter(|plan| !plan.is_expired(now, self.config.ttl)).cloned()
	}
}
impl PlanStore for MemoryPlanStore {
	fn put(&self, content: String, originator: &ClientKey) -> Result<PlanId, StoreError> {
		let op = OpSpan::new(OpKind::StorePut, "put").entered();
		let now = self.clock.now();
		let mut plans = self.plans.write();
		let mut attempts = 0;
		let id = loop {
			if attempts == self.config.max_id_attempts {
				drop(plans);
				op.finish(OpOutcome::Failure);

				#[cfg(feature = "tracing")]
				tracing::warn!(attempts, "plan id generation exhausted its attempts");

				return Err(StoreError::Capacity { attempts });
			}

			attempts += 1;

			let candidate = self.ids.next_id();

			if !plans.contains_key(&candidate) {
				break candidate;
			}
		};

		#[cfg(feature = "tracing")]
		tracing::debug!(%id, client = %originator, content_len = content.len(), "plan stored");

		plans.insert(id.clone(), StoredPlan { content, created_at: now, originator: originator.clone() });
		drop(plans);
		op.finish(OpOutcome::Success);

		Ok(id)
	}

	fn get(&self, id: &PlanId) -> Result<String, StoreError> {
		let op = OpSpan::new(OpKind::StoreGet, "get").entered();
		let result = self.inspect(id).map(|plan| plan.content).ok_or(StoreError::NotFound);

		op.finish(if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure });

		result
	}

	fn sweep(&self) -> usize {
		let op = OpSpan::new(OpKind::Sweep, "plan_store").entered();
		let now = self.clock.now();
		let ttl = self.config.ttl;
		let mut plans = self.plans.write();
		let before = plans.len();

		plans.retain(|_, plan| !plan.is_expired(now, ttl));

		let removed = before - plans.len();

		drop(plans);
		op.finish(OpOutcome::Success);
		record_swept("plans", removed);

		#[cfg(feature = "tracing")]
		tracing::debug!(removed, "swept expired plans");

		removed
	}

	fn len(&self) -> usize {
		self.plans.read().len()
	}
}
impl Debug for MemoryPlanStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryPlanStore")
			.field("config", &self.config)
			.field("len", &self.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::clock::ManualClock;

	/// Replays a fixed list of ids, repeating the last one forever.
	struct ScriptedIds {
		ids: Vec<PlanId>,
		cursor: AtomicUsize,
	}
	impl ScriptedIds {
		fn new(ids: &[&str]) -> Self {
			let ids = ids
				.iter()
				.map(|raw| PlanId::parse(raw).expect("Scripted id fixtures should be valid."))
				.collect();

			Self { ids, cursor: AtomicUsize::new(0) }
		}
	}
	impl IdSource for ScriptedIds {
		fn next_id(&self) -> PlanId {
			let at = self.cursor.fetch_add(1, Ordering::Relaxed).min(self.ids.len() - 1);

			self.ids[at].clone()
		}
	}

	fn store_with(ids: &[&str], attempts: u32) -> (MemoryPlanStore, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(time::macros::datetime!(2025-11-10 12:00 UTC)));
		let store = MemoryPlanStore::with_clock(
			PlanStoreConfig::default().with_max_id_attempts(attempts),
			clock.clone(),
		)
		.expect("Scripted store config should be valid.")
		.with_id_source(Arc::new(ScriptedIds::new(ids)));

		(store, clock)
	}

	#[test]
	fn collision_retries_until_a_free_id() {
		let (store, _clock) = store_with(&["AAAAAAAA", "AAAAAAAA", "BBBBBBBB"], 3);
		let client = ClientKey::unknown();
		let first = store.put("one".into(), &client).expect("First put should succeed.");
		let second = store.put("two".into(), &client).expect("Second put should retry past the collision.");

		assert_eq!(first.as_ref(), "AAAAAAAA");
		assert_eq!(second.as_ref(), "BBBBBBBB");
	}

	#[test]
	fn exhausted_attempts_report_capacity() {
		let (store, _clock) = store_with(&["AAAAAAAA"], 10);
		let client = ClientKey::unknown();

		store.put("one".into(), &client).expect("First put should succeed.");

		assert_eq!(store.put("two".into(), &client), Err(StoreError::Capacity { attempts: 10 }));
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn expired_entries_are_hidden_before_the_sweep() {
		let (store, clock) = store_with(&["AAAAAAAA"], 1);
		let client = ClientKey::new("203.0.113.9");
		let id = store.put("plan".into(), &client).expect("Put should succeed.");
		let stored = store.inspect(&id).expect("Fresh plan should be inspectable.");

		assert_eq!(stored.originator, client);

		clock.advance(Duration::days(30) + Duration::seconds(1));

		assert_eq!(store.get(&id), Err(StoreError::NotFound));
		assert_eq!(store.len(), 1);
		assert_eq!(store.sweep(), 1);
		assert!(store.is_empty());
	}

	#[test]
	fn expired_ids_can_be_reissued() {
		let (store, clock) = store_with(&["AAAAAAAA"], 1);
		let client = ClientKey::unknown();

		store.put("old".into(), &client).expect("First put should succeed.");
		clock.advance(Duration::days(31));

		assert_eq!(store.sweep(), 1);

		let id = store.put("new".into(), &client).expect("Swept id should be reusable.");

		assert_eq!(store.get(&id).expect("Reissued id should resolve."), "new");
	}

	#[test]
	fn constructors_reject_invalid_config() {
		let clock = Arc::new(ManualClock::new(time::macros::datetime!(2025-11-10 12:00 UTC)));

		assert_eq!(
			MemoryPlanStore::with_clock(
				PlanStoreConfig::default().with_max_id_attempts(0),
				clock.clone()
			)
			.err(),
			Some(ConfigError::ZeroIdAttempts)
		);
		assert_eq!(
			MemoryPlanStore::with_clock(PlanStoreConfig::default().with_ttl(Duration::ZERO), clock)
				.err(),
			Some(ConfigError::NonPositiveDuration { field: "ttl" })
		);
	}
}
