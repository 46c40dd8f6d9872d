//! Background expiry sweeps with owned cancellation handles.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{
	sync::oneshot,
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpSpan},
};

/// Handle to a running sweep task.
///
/// [`SweeperHandle::shutdown`] stops the task gracefully; dropping the handle aborts it.
pub struct SweeperHandle {
	label: &'static str,
	stop: Option<oneshot::Sender<()>>,
	task: Option<JoinHandle<()>>,
}
impl SweeperHandle {
	/// Spawns a task on the current tokio runtime that calls `sweep` every `interval`.
	///
	/// The first sweep runs one full interval after spawning. `interval` must be non-zero.
	pub fn spawn<F>(label: &'static str, interval: StdDuration, sweep: F) -> Self
	where
		F: 'static + Send + Fn() -> usize,
	{
		let (stop, mut stopped) = oneshot::channel();
		let span = OpSpan::new(OpKind::Sweep, label);
		let task = tokio::spawn(span.instrument(async move {
			let mut ticker = time::interval_at(Instant::now() + interval, interval);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				tokio::select! {
					_ = &mut stopped => break,
					_ = ticker.tick() => {
						let _removed = sweep();

						#[cfg(feature = "tracing")]
						tracing::trace!(label, removed = _removed, "sweep tick");
					},
				}
			}
		}));

		Self { label, stop: Some(stop), task: Some(task) }
	}

	/// Label given at spawn time.
	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Whether the task has exited.
	pub fn is_finished(&self) -> bool {
		self.task.as_ref().is_none_or(JoinHandle::is_finished)
	}

	/// Signals the task to stop and waits for it to exit.
	pub async fn shutdown(mut self) {
		if let Some(stop) = self.stop.take() {
			let _ = stop.send(());
		}
		if let Some(task) = self.task.take() {
			let _ = task.await;
		}
	}
}
impl Drop for SweeperHandle {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}
impl Debug for SweeperHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SweeperHandle")
			.field("label", &self.label)
			.field("finished", &self.is_finished())
			.finish()
	}
}

/// Sweeps started together and stopped together.
#[derive(Debug, Default)]
pub struct SweeperSet(Vec<SweeperHandle>);
impl SweeperSet {
	/// Adds a running sweeper to the set.
	pub fn push(&mut self, handle: SweeperHandle) {
		self.0.push(handle);
	}

	/// Labels of the sweepers in the set.
	pub fn labels(&self) -> Vec<&'static str> {
		self.0.iter().map(SweeperHandle::label).collect()
	}

	/// Stops every sweeper and waits for all of them to exit.
	pub async fn shutdown(self) {
		for handle in self.0 {
			handle.shutdown().await;
		}
	}
}
