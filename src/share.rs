//! Shareable plan links and the companion scaffolding command.
//!
//! Two link forms live in the URL fragment: `#/p=<token>` embeds the whole plan as a codec token,
//! while `#/plan/<id>` points at a short id in the plan store.

// self
use crate::{_prelude::*, codec, store::PlanId};

const ENCODED_PREFIX: &str = "/p=";
const SHORT_PREFIX: &str = "/plan/";

/// Project templates understood by the scaffolding CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaffoldTemplate {
	/// General Next.js application.
	#[default]
	Next,
	/// Next.js with the Vercel AI SDK preconfigured.
	VercelAi,
}
impl ScaffoldTemplate {
	/// Returns the CLI template name.
	pub const fn as_str(self) -> &'static str {
		match self {
			ScaffoldTemplate::Next => "next",
			ScaffoldTemplate::VercelAi => "vercel-ai",
		}
	}
}
impl Display for ScaffoldTemplate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A plan reference that fits in a URL fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareLink {
	/// Self-contained codec token.
	Encoded(String),
	/// Short id resolved through the plan store.
	Short(PlanId),
}
impl ShareLink {
	/// Builds a self-contained link for the plan text.
	pub fn encode_plan(text: &str) -> Self {
		Self::Encoded(codec::encode(text))
	}

	/// Returns the fragment (without `#`) that carries this link.
	pub fn fragment(&self) -> String {
		match self {
			ShareLink::Encoded(token) => format!("{ENCODED_PREFIX}{token}"),
			ShareLink::Short(id) => format!("{SHORT_PREFIX}{id}"),
		}
	}

	/// Returns `base` with this link set as its fragment.
	pub fn to_url(&self, base: &Url) -> Url {
		let mut url = base.clone();

		url.set_fragment(Some(&self.fragment()));

		url
	}

	/// Recognises either link form in a fragment, with or without the leading `#`.
	pub fn parse_fragment(fragment: &str) -> Option<Self> {
		let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

		if let Some(raw) = fragment.strip_prefix(SHORT_PREFIX) {
			return PlanId::parse(raw).ok().map(Self::Short);
		}

		fragment
			.strip_prefix(ENCODED_PREFIX)
			.filter(|token| {
				!token.is_empty()
					&& token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
			})
			.map(|token| Self::Encoded(token.to_owned()))
	}

	/// Extracts a link from a full URL's fragment.
	pub fn from_url(url: &Url) -> Option<Self> {
		url.fragment().and_then(Self::parse_fragment)
	}

	/// Path that serves the raw Markdown for this link.
	pub fn api_path(&self) -> String {
		match self {
			ShareLink::Encoded(token) => format!("/api/plan/{token}"),
			ShareLink::Short(id) => format!("/api/plans/{id}"),
		}
	}

	/// Absolute raw-Markdown URL for this link on `base`'s origin.
	pub fn api_url(&self, base: &Url) -> Result<Url, url::ParseError> {
		base.join(&self.api_path())
	}
}

/// Returns the scaffolding CLI invocation that bootstraps a project from a shared plan.
pub fn scaffold_command(project_name: &str, template: ScaffoldTemplate, plan_url: &Url) -> String {
	format!("npx create-vibe-code-app {project_name} --template {template} --plan {plan_url}")
}
