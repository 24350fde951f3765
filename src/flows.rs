//! High-level flow orchestrators built on the shared integration handle.

pub mod authorize;
pub mod callback;
pub mod common;
pub mod credentials;
pub mod items;

pub use callback::*;

// self
use crate::{
	_prelude::*,
	config::IntegrationConfig,
	http::ProviderHttpClient,
	oauth::{TokenExchange, TransportErrorMapper},
	store::{KeyValueStore, StoreKey},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Integration specialized for the crate's default reqwest transport stack.
pub type ReqwestIntegration = Integration<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates the HubSpot authorization, callback, credential handoff, and item fetch flows.
///
/// The integration owns the explicit configuration, the expiring store, and the HTTP transport
/// so each flow only deals with its own steps. Every outbound call (token exchange and CRM
/// queries alike) goes through the same [`ProviderHttpClient`], which lets tests swap the
/// transport wholesale.
pub struct Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound HubSpot request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Expiring store holding pending states and cached credentials.
	pub store: Arc<dyn KeyValueStore>,
	/// Configuration shared by every flow.
	pub config: IntegrationConfig,
	token_exchange: Arc<TokenExchange<C, M>>,
	flow_guards: Arc<Mutex<HashMap<StoreKey, Arc<AsyncMutex<()>>>>>,
}
impl<C, M> Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an integration that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn KeyValueStore>,
		config: IntegrationConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let http_client = http_client.into();
		let transport_mapper = mapper.into();
		let token_exchange = Arc::new(TokenExchange::from_config(
			&config,
			http_client.clone(),
			transport_mapper.clone(),
		));

		Self {
			http_client,
			transport_mapper,
			store,
			config,
			token_exchange,
			flow_guards: Default::default(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Integration<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an integration with its own reqwest transport, honoring the configured request
	/// timeout.
	pub fn new(store: Arc<dyn KeyValueStore>, config: IntegrationConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(config.request_timeout)?;

		Ok(Self::with_http_client(store, config, http_client, ReqwestTransportErrorMapper))
	}
}
impl<C, M> Clone for Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			token_exchange: self.token_exchange.clone(),
			flow_guards: self.flow_guards.clone(),
		}
	}
}
impl<C, M> Debug for Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Integration")
			.field("config", &self.config)
			.field("token_exchange", &self.token_exchange)
			.finish()
	}
}
