//! Input checks applied before generating, storing, or serving plans.

// std
use std::sync::LazyLock;
// crates.io
use regex::{Regex, RegexSet};
// self
use crate::{_prelude::*, error::ConfigError};

const PROJECT_KEYWORDS: &[&str] = &[
	"app",
	"website",
	"platform",
	"system",
	"application",
	"service",
	"tool",
	"dashboard",
	"api",
	"interface",
	"software",
	"program",
	"solution",
	"build",
	"create",
	"develop",
	"make",
	"design",
	"implement",
	"users",
	"user",
	"client",
	"customer",
	"data",
	"database",
	"web",
	"mobile",
	"desktop",
	"cloud",
	"server",
	"frontend",
	"backend",
];

static INAPPROPRIATE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)\b(hack|crack|exploit|malware|virus|illegal|piracy|fraud|scam|porn|adult|explicit)\b",
	)
	.unwrap_or_else(|e| unreachable!("static pattern is valid: {e}"))
});
static PLAN_INDICATORS: LazyLock<RegexSet> = LazyLock::new(|| {
	RegexSet::new([
		r"(?i)#{1,6}\s*project",
		r"(?i)#{1,6}\s*overview",
		r"(?i)#{1,6}\s*user stor",
		r"(?i)#{1,6}\s*technical",
		r"(?i)#{1,6}\s*implementation",
		r"(?i)#{1,6}\s*milestone",
		r"(?i)#{1,6}\s*phase",
		r"(?i)\*\*goal\*\*",
		r"(?i)\*\*timeline\*\*",
		r"- \[ \]",
	])
	.unwrap_or_else(|e| unreachable!("static patterns are valid: {e}"))
});

/// Rejection reasons for user-supplied ideas and plans.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ValidationError {
	/// Input is shorter than the lower bound.
	#[error("{subject} must be at least {min} characters.")]
	TooShort {
		/// What was validated.
		subject: &'static str,
		/// Minimum character count.
		min: usize,
	},
	/// Input is longer than the upper bound.
	#[error("{subject} must be at most {max} characters.")]
	TooLong {
		/// What was validated.
		subject: &'static str,
		/// Maximum character count.
		max: usize,
	},
	/// The idea does not describe a software project.
	#[error("Input should describe a software/technology project idea.")]
	NotAProject,
	/// The idea contains disallowed terms.
	#[error("Input contains inappropriate content.")]
	Inappropriate,
	/// The content has none of the structure of a project plan.
	#[error("Content does not appear to be a valid project plan.")]
	NotAPlan,
}

/// Character-count bounds enforced by the validators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
	/// Minimum idea length.
	pub idea_min_chars: usize,
	/// Maximum idea length.
	pub idea_max_chars: usize,
	/// Minimum stored plan length.
	pub plan_min_chars: usize,
	/// Maximum stored plan length.
	pub plan_max_chars: usize,
}
impl ValidationLimits {
	/// Rejects inverted bounds.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.idea_min_chars > self.idea_max_chars {
			return Err(ConfigError::InvertedBounds {
				field: "idea_chars",
				min: self.idea_min_chars,
				max: self.idea_max_chars,
			});
		}
		if self.plan_min_chars > self.plan_max_chars {
			return Err(ConfigError::InvertedBounds {
				field: "plan_chars",
				min: self.plan_min_chars,
				max: self.plan_max_chars,
			});
		}

		Ok(())
	}

	/// Checks a project idea before it is sent for generation.
	pub fn validate_idea(&self, idea: &str) -> Result<(), ValidationError> {
		check_length("Project idea", idea, self.idea_min_chars, self.idea_max_chars)?;

		let lowered = idea.to_lowercase();

		if !PROJECT_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
			return Err(ValidationError::NotAProject);
		}
		if INAPPROPRIATE.is_match(idea) {
			return Err(ValidationError::Inappropriate);
		}

		Ok(())
	}

	/// Checks plan content before it is stored under a short id.
	pub fn validate_plan_content(&self, content: &str) -> Result<(), ValidationError> {
		check_length("Plan content", content, self.plan_min_chars, self.plan_max_chars)?;

		if !PLAN_INDICATORS.is_match(content) {
			return Err(ValidationError::NotAPlan);
		}

		Ok(())
	}
}
impl Default for ValidationLimits {
	fn default() -> Self {
		Self { idea_min_chars: 20, idea_max_chars: 1_000, plan_min_chars: 100, plan_max_chars: 50_000 }
	}
}

/// Checks a project idea against the default limits.
pub fn validate_idea(idea: &str) -> Result<(), ValidationError> {
	ValidationLimits::default().validate_idea(idea)
}

/// Checks plan content against the default limits.
pub fn validate_plan_content(content: &str) -> Result<(), ValidationError> {
	ValidationLimits::default().validate_plan_content(content)
}

fn check_length(
	subject: &'static str,
	input: &str,
	min: usize,
	max: usize,
) -> Result<(), ValidationError> {
	let chars = input.chars().count();

	if chars < min {
		return Err(ValidationError::TooShort { subject, min });
	}
	if chars > max {
		return Err(ValidationError::TooLong { subject, max });
	}

	Ok(())
}
