//! HubSpot OAuth 2.0 authorization-code glue: one-time state tokens, a read-once credential
//! handoff through an expiring key-value store, and CRM objects normalized into uniform items.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod crm;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::IntegrationConfig,
		flows::Integration,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		store::{KeyValueStore, MemoryStore},
	};

	/// Integration type alias used by reqwest-backed integration tests.
	pub type ReqwestTestIntegration = Integration<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a configuration whose token endpoint, authorization endpoint, and CRM API base all
	/// point at `base_url` (typically an `httpmock` server).
	pub fn test_config(base_url: &str) -> IntegrationConfig {
		let base = base_url.trim_end_matches('/');

		IntegrationConfig::builder("client-it", "secret-it")
			.authorization_endpoint(
				Url::parse(&format!("{base}/oauth/authorize"))
					.expect("Mock authorization endpoint should parse."),
			)
			.token_endpoint(
				Url::parse(&format!("{base}/oauth/v1/token"))
					.expect("Mock token endpoint should parse."),
			)
			.api_base(Url::parse(&format!("{base}/")).expect("Mock API base should parse."))
			.redirect_uri(
				Url::parse("https://app.example.com/integrations/hubspot/oauth2callback")
					.expect("Redirect URI fixture should parse."),
			)
			.build()
			.expect("Test configuration should build successfully.")
	}

	/// Constructs an [`Integration`] backed by an in-memory store and the insecure reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_integration(
		config: IntegrationConfig,
	) -> (ReqwestTestIntegration, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn KeyValueStore> = store_backend.clone();
		let integration = Integration::with_http_client(
			store,
			config,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(integration, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
