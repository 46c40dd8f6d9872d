// std
use std::{collections::HashSet, thread};
// self
use plan_share::{
	_preludet::*,
	rate_limit::ClientKey,
	store::{MemoryPlanStore, PLAN_ID_LEN, PlanId, PlanStore, PlanStoreConfig, StoreError},
};

fn build_store() -> (MemoryPlanStore, Arc<plan_share::clock::ManualClock>) {
	let clock = manual_clock();
	let store = MemoryPlanStore::with_clock(PlanStoreConfig::default(), clock.clone())
		.expect("Default store config should be valid.");

	(store, clock)
}

#[test]
fn thousand_puts_yield_distinct_well_formed_ids() {
	let (store, _clock) = build_store();
	let client = ClientKey::new("198.51.100.4");
	let ids: HashSet<PlanId> = (0..1_000)
		.map(|n| store.put(format!("plan {n}"), &client).expect("Put should succeed."))
		.collect();

	assert_eq!(ids.len(), 1_000);
	assert_eq!(store.len(), 1_000);

	for id in &ids {
		assert_eq!(id.len(), PLAN_ID_LEN);
		assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()), "Id {id} is not alphanumeric.");
	}
}

#[test]
fn get_returns_content_until_ttl_then_not_found() {
	let (store, clock) = build_store();
	let id = store
		.put(SAMPLE_PLAN.to_owned(), &ClientKey::unknown())
		.expect("Putting the sample plan should succeed.");

	assert_eq!(store.get(&id).expect("Fresh plan should resolve."), SAMPLE_PLAN);

	clock.advance(Duration::days(30));

	assert_eq!(store.get(&id).expect("Plan exactly at the TTL should still resolve."), SAMPLE_PLAN);

	clock.advance(Duration::seconds(1));

	assert_eq!(store.get(&id), Err(StoreError::NotFound));
}

#[test]
fn unknown_and_expired_ids_are_indistinguishable() {
	let (store, clock) = build_store();
	let id = store.put("plan".into(), &ClientKey::unknown()).expect("Put should succeed.");

	clock.advance(Duration::days(31));

	let never = PlanId::parse("Zz09Yy18").expect("Fixture id should parse.");

	assert_eq!(store.get(&id), store.get(&never));
	assert_eq!(store.sweep(), 1);
	assert_eq!(store.get(&id), Err(StoreError::NotFound));
}

#[test]
fn sweep_only_removes_plans_older_than_ttl() {
	let (store, clock) = build_store();
	let client = ClientKey::unknown();
	let old = store.put("old".into(), &client).expect("Put should succeed.");

	clock.advance(Duration::days(20));

	let recent = store.put("recent".into(), &client).expect("Put should succeed.");

	clock.advance(Duration::days(11));

	assert_eq!(store.sweep(), 1);
	assert_eq!(store.get(&old), Err(StoreError::NotFound));
	assert_eq!(store.get(&recent).expect("Recent plan should survive the sweep."), "recent");
}

#[test]
fn concurrent_puts_never_share_an_id() {
	let (store, _clock) = build_store();
	let ids: Vec<PlanId> = thread::scope(|scope| {
		let workers: Vec<_> = (0..4)
			.map(|worker| {
				let store = &store;

				scope.spawn(move || {
					let client = ClientKey::new(format!("10.0.0.{worker}"));

					(0..250)
						.map(|n| store.put(format!("{worker}-{n}"), &client).expect("Put should succeed."))
						.collect::<Vec<_>>()
				})
			})
			.collect();

		workers
			.into_iter()
			.flat_map(|w| w.join().expect("Worker thread should not panic."))
			.collect()
	});
	let unique: HashSet<_> = ids.iter().collect();

	assert_eq!(unique.len(), 1_000);
}
