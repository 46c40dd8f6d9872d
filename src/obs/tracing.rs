// std
use std::future::Future;
// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpOutcome, record_op_outcome},
};

/// Future returned by [`OpSpan::instrument`]; a passthrough when tracing is disabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`OpSpan::instrument`]; a passthrough when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// `plan_share.op` span tagged with the operation and the call site.
///
/// The `outcome` field starts empty and is filled by [`OpSpanGuard::finish`].
#[derive(Clone, Debug)]
pub struct OpSpan {
	kind: OpKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Opens the span for `kind`; `stage` names the call site.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(not(feature = "tracing"))]
		let _ = stage;

		Self {
			kind,
			#[cfg(feature = "tracing")]
			span: tracing::debug_span!(
				"plan_share.op",
				op = kind.as_str(),
				stage,
				outcome = tracing::field::Empty
			),
		}
	}

	/// Operation this span covers.
	pub fn kind(&self) -> OpKind {
		self.kind
	}

	/// Enters the span for a synchronous operation.
	pub fn entered(self) -> OpSpanGuard {
		OpSpanGuard {
			kind: self.kind,
			#[cfg(feature = "tracing")]
			entered: self.span.entered(),
		}
	}

	/// Runs `fut` inside the span without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Entered [`OpSpan`]; the span closes when the guard drops.
pub struct OpSpanGuard {
	kind: OpKind,
	#[cfg(feature = "tracing")]
	entered: tracing::span::EnteredSpan,
}
impl OpSpanGuard {
	/// Stamps `outcome` onto the span and counts it in the operation metric.
	pub fn finish(&self, outcome: OpOutcome) {
		#[cfg(feature = "tracing")]
		self.entered.record("outcome", outcome.as_str());

		record_op_outcome(self.kind, outcome);
	}
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "OpSpanGuard({})", self.kind)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn guard_reports_its_operation() {
		let guard = OpSpan::new(OpKind::Encode, "guard_reports_its_operation").entered();

		guard.finish(OpOutcome::Success);

		assert_eq!(format!("{guard:?}"), "OpSpanGuard(encode)");
	}

	#[tokio::test]
	async fn instrumented_future_keeps_its_output() {
		let span = OpSpan::new(OpKind::Sweep, "instrumented_future_keeps_its_output");

		assert_eq!(span.kind(), OpKind::Sweep);
		assert_eq!(span.instrument(async { 42 }).await, 42);
	}
}
