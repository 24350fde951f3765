//! Walks through minting a HubSpot authorization URL and verifying the state the redirect
//! hands back, using the in-memory store.
//!
//! Reads `HUBSPOT_CLIENT_ID` / `HUBSPOT_CLIENT_SECRET` when present and falls back to demo
//! credentials otherwise.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use hubspot_bridge::{
	auth::{OrgId, StateBinding, UserId},
	config::IntegrationConfig,
	flows::ReqwestIntegration,
	store::{KeyValueStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = match IntegrationConfig::from_env() {
		Ok(config) => config,
		Err(_) => IntegrationConfig::builder("demo-client", "demo-secret").build()?,
	};
	let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
	let integration = ReqwestIntegration::new(store, config)?;
	let user = UserId::new("user-123")?;
	let org = OrgId::new("org-acme")?;
	let url = integration.authorize(&user, &org).await?;

	println!("Open {url} in a popup to connect HubSpot.");

	// Simulate the redirect handler receiving the `state` parameter back.
	let returned_state = url
		.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.unwrap_or_default();
	let binding = StateBinding::new(user.clone(), org.clone());
	let state = integration.verify_state(&returned_state, Some(&binding)).await?;

	println!("Verified state for user {} in organization {}.", state.user_id, state.org_id);

	match integration.verify_state(&returned_state, Some(&binding)).await {
		Ok(_) => eprintln!("Replay unexpectedly succeeded."),
		Err(e) => println!("Replay rejected with {}: {}", e.status_code(), e.public_detail()),
	}

	println!("A real callback would now call `complete_callback` with the returned code.");

	Ok(())
}
