//! Short plan identifiers and the sources that mint them.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

/// Length of every plan identifier.
pub const PLAN_ID_LEN: usize = 8;

/// Error returned when a plan identifier is malformed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum PlanIdError {
	/// The identifier does not have exactly [`PLAN_ID_LEN`] characters.
	#[error("Plan id must be {expected} characters, got {actual}.")]
	Length {
		/// Required character count.
		expected: usize,
		/// Supplied character count.
		actual: usize,
	},
	/// The identifier contains something other than ASCII letters and digits.
	#[error("Plan id must be alphanumeric.")]
	NotAlphanumeric,
}

/// Eight-character `[A-Za-z0-9]` identifier for a stored plan.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanId(String);
impl PlanId {
	/// Parses and validates an identifier.
	pub fn parse(value: impl AsRef<str>) -> Result<Self, PlanIdError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for PlanId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for PlanId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for PlanId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<PlanId> for String {
	fn from(value: PlanId) -> Self {
		value.0
	}
}
impl TryFrom<String> for PlanId {
	type Error = PlanIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for PlanId {
	type Err = PlanIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Debug for PlanId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Plan({})", self.0)
	}
}
impl Display for PlanId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Mints candidate plan identifiers.
pub trait IdSource
where
	Self: Send + Sync,
{
	/// Returns the next candidate identifier.
	fn next_id(&self) -> PlanId;
}

/// Uniformly random alphanumeric identifiers from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdSource;
impl IdSource for RandomIdSource {
	fn next_id(&self) -> PlanId {
		PlanId(rand::rng().sample_iter(Alphanumeric).take(PLAN_ID_LEN).map(char::from).collect())
	}
}

fn validate_view(view: &str) -> Result<(), PlanIdError> {
	if view.len() != PLAN_ID_LEN {
		return Err(PlanIdError::Length { expected: PLAN_ID_LEN, actual: view.chars().count() });
	}
	if !view.bytes().all(|b| b.is_ascii_alphanumeric()) {
		return Err(PlanIdError::NotAlphanumeric);
	}

	Ok(())
}
