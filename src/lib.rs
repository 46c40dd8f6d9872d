//! Shareable project-plan core: URL-safe plan tokens, fixed-window client rate limits, and an
//! ephemeral short-id plan store with background sweeps.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod clock;
pub mod codec;
pub mod error;
pub mod obs;
pub mod rate_limit;
pub mod service;
pub mod share;
pub mod store;
#[cfg(feature = "tokio")] pub mod sweep;
pub mod validate;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Fixtures shared by unit and integration tests; enabled via `cfg(test)` or the `test`
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		clock::{Clock, ManualClock},
		service::{PlanService, ServiceConfig},
	};

	/// Markdown plan that satisfies the content validator.
	pub const SAMPLE_PLAN: &str = "# Project Overview\n\n- **Goal**: Ship a habit tracker web app \
	                               for busy teams.\n\n## Phase 1\n\n- [ ] Task: Set up the \
	                               project structure\n- [ ] Task: Configure the database\n";

	/// Project idea that satisfies the idea validator.
	pub const SAMPLE_IDEA: &str = "A web app that helps small teams track daily habits.";

	/// Builds a manual clock pinned to a fixed instant.
	pub fn manual_clock() -> Arc<ManualClock> {
		Arc::new(ManualClock::new(time::macros::datetime!(2025-11-10 12:00 UTC)))
	}

	/// Builds a service with default settings whose components read the provided clock.
	pub fn build_test_service(clock: Arc<ManualClock>) -> PlanService {
		let clock: Arc<dyn Clock> = clock;

		PlanService::with_clock(ServiceConfig::default(), clock)
			.expect("Default service config should be valid.")
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use {color_eyre as _, tokio as _};
