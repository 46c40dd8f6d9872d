//! Demonstrates storing a plan under a short id, sharing it through both link forms, and printing
//! the scaffolding command, with background sweeps running for the lifetime of the service.

// std
use std::net::{IpAddr, Ipv4Addr};
// crates.io
use color_eyre::Result;
// self
use plan_share::{
	rate_limit::ClientKey,
	service::{PlanService, ServiceConfig},
	share::{ScaffoldTemplate, ShareLink, scaffold_command},
};

const PLAN: &str = "# Project Overview\n\n- **Goal**: Launch a recipe-sharing web app.\n\n## Phase \
                    1: Foundation\n\n- [ ] Task: Set up the project structure\n- [ ] Task: Model \
                    recipes in the database\n";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let service = PlanService::new(ServiceConfig::default())?;
	let sweepers = service.spawn_sweepers();
	let client =
		ClientKey::derive(Some("203.0.113.9, 10.0.0.1"), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
	let receipt = service.store_plan(&client, PLAN.to_owned())?;

	println!("Short link: {}", receipt.share_url);

	for (name, value) in receipt.decision.headers() {
		println!("  {name}: {value}");
	}

	let fetched = service.fetch_plan(&client, &receipt.id)?;
	let encoded = ShareLink::encode_plan(&fetched.content);
	let encoded_url = encoded.to_url(service.base_url());

	println!("Encoded link ({} chars): {encoded_url}", encoded_url.as_str().len());

	if let Some(ShareLink::Encoded(token)) = ShareLink::from_url(&encoded_url) {
		assert_eq!(service.decode_shared(&token)?, PLAN);
	}

	let plan_url = ShareLink::Short(receipt.id).api_url(service.base_url())?;

	println!("{}", scaffold_command("recipe-box", ScaffoldTemplate::Next, &plan_url));

	sweepers.shutdown().await;

	Ok(())
}
