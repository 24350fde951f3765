//! Explicit integration configuration.
//!
//! [`IntegrationConfig`] carries everything the flows need (client credentials, redirect URI,
//! scopes, endpoints, store TTLs, request timeout) and is passed into
//! [`Integration`](crate::flows::Integration) at construction. Defaults mirror a stock HubSpot
//! public app; every URL can be redirected at a mock server for tests.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	error::ConfigError,
};

/// HubSpot authorization endpoint.
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://app.hubspot.com/oauth/authorize";
/// HubSpot token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
/// HubSpot CRM API base.
pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com/";
/// Record link template applied to every normalized item.
pub const DEFAULT_RECORD_URL_TEMPLATE: &str = "https://app.hubspot.com/contacts/{id}";
/// Callback URI registered with the HubSpot app.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/integrations/hubspot/oauth2callback";
/// Scopes requested during authorization.
pub const DEFAULT_SCOPES: &str =
	"oauth crm.objects.contacts.read crm.objects.companies.read crm.objects.deals.read tickets";
/// Store key prefix shared by every entry this integration writes.
pub const DEFAULT_KEY_NAMESPACE: &str = "hubspot";
/// Maximum CRM page size HubSpot accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

const ENV_CLIENT_ID: &str = "HUBSPOT_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "HUBSPOT_CLIENT_SECRET";
const ENV_REDIRECT_URI: &str = "HUBSPOT_REDIRECT_URI";
const ENV_SCOPES: &str = "HUBSPOT_SCOPES";

/// Endpoint set used by the integration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubSpotEndpoints {
	/// Authorization endpoint users are sent to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// CRM API base; always ends with `/`.
	pub api_base: Url,
	/// Record link template; `{id}` is replaced with the remote object id.
	pub record_url_template: String,
}

/// Validated configuration consumed by every flow.
#[derive(Clone, Debug)]
pub struct IntegrationConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Fixed redirect URI registered with HubSpot.
	pub redirect_uri: Url,
	/// Scopes requested during authorization.
	pub scopes: ScopeSet,
	/// Provider endpoints.
	pub endpoints: HubSpotEndpoints,
	/// Prefix for store keys so integrations sharing one store never collide.
	pub key_namespace: String,
	/// Lifetime of a pending authorization state.
	pub state_ttl: Duration,
	/// Lifetime of cached credentials awaiting pickup.
	pub credentials_ttl: Duration,
	/// `limit` sent with each CRM object query.
	pub page_size: u32,
	/// Upper bound for each outbound HTTP call.
	pub request_timeout: Duration,
}
impl IntegrationConfig {
	/// Creates a builder seeded with the HubSpot defaults.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> IntegrationConfigBuilder {
		IntegrationConfigBuilder::new(client_id, client_secret)
	}

	/// Reads `HUBSPOT_CLIENT_ID`, `HUBSPOT_CLIENT_SECRET`, and the optional
	/// `HUBSPOT_REDIRECT_URI` / `HUBSPOT_SCOPES` from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_with(|name| std::env::var(name).ok())
	}

	/// Same as [`from_env`](Self::from_env) but with an injectable variable lookup.
	pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let client_id =
			lookup(ENV_CLIENT_ID).ok_or(ConfigError::MissingEnv { name: ENV_CLIENT_ID })?;
		let client_secret =
			lookup(ENV_CLIENT_SECRET).ok_or(ConfigError::MissingEnv { name: ENV_CLIENT_SECRET })?;
		let mut builder = Self::builder(client_id, client_secret);

		if let Some(raw) = lookup(ENV_REDIRECT_URI) {
			let redirect = Url::parse(&raw)
				.map_err(|source| ConfigError::InvalidUrl { name: "redirect", source })?;

			builder = builder.redirect_uri(redirect);
		}
		if let Some(raw) = lookup(ENV_SCOPES) {
			builder = builder.scopes(ScopeSet::from_str(&raw)?);
		}

		builder.build()
	}
}

/// Builder for [`IntegrationConfig`] values.
#[derive(Debug)]
pub struct IntegrationConfigBuilder {
	client_id: String,
	client_secret: String,
	redirect_uri: Option<Url>,
	scopes: Option<ScopeSet>,
	authorization_endpoint: Option<Url>,
	token_endpoint: Option<Url>,
	api_base: Option<Url>,
	record_url_template: String,
	key_namespace: String,
	state_ttl: Duration,
	credentials_ttl: Duration,
	page_size: u32,
	request_timeout: Duration,
}
impl IntegrationConfigBuilder {
	const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);
	const DEFAULT_TTL: Duration = Duration::seconds(600);

	/// Creates a new builder seeded with the provided client credentials.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			redirect_uri: None,
			scopes: None,
			authorization_endpoint: None,
			token_endpoint: None,
			api_base: None,
			record_url_template: DEFAULT_RECORD_URL_TEMPLATE.into(),
			key_namespace: DEFAULT_KEY_NAMESPACE.into(),
			state_ttl: Self::DEFAULT_TTL,
			credentials_ttl: Self::DEFAULT_TTL,
			page_size: MAX_PAGE_SIZE,
			request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Overrides the requested scopes.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the CRM API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Overrides the record link template (must contain `{id}`).
	pub fn record_url_template(mut self, template: impl Into<String>) -> Self {
		self.record_url_template = template.into();

		self
	}

	/// Overrides the store key namespace; an empty namespace drops the prefix.
	pub fn key_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.key_namespace = namespace.into();

		self
	}

	/// Overrides the pending-state lifetime (defaults to 600 seconds).
	pub fn state_ttl(mut self, ttl: Duration) -> Self {
		self.state_ttl = ttl;

		self
	}

	/// Overrides the cached-credentials lifetime (defaults to 600 seconds).
	pub fn credentials_ttl(mut self, ttl: Duration) -> Self {
		self.credentials_ttl = ttl;

		self
	}

	/// Overrides the CRM page size (defaults to 100).
	pub fn page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size;

		self
	}

	/// Overrides the outbound request timeout (defaults to 30 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<IntegrationConfig, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingSetting { name: "client_id" });
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::MissingSetting { name: "client_secret" });
		}
		if !self.record_url_template.contains("{id}") {
			return Err(ConfigError::RecordUrlTemplate { template: self.record_url_template });
		}
		if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
			return Err(ConfigError::PageSizeOutOfRange { value: self.page_size });
		}

		validate_duration("state_ttl", self.state_ttl)?;
		validate_duration("credentials_ttl", self.credentials_ttl)?;
		validate_duration("request_timeout", self.request_timeout)?;

		let redirect_uri = resolve_url("redirect", self.redirect_uri, DEFAULT_REDIRECT_URI)?;
		let authorization =
			resolve_url("authorization", self.authorization_endpoint, DEFAULT_AUTHORIZATION_URL)?;
		let token = resolve_url("token", self.token_endpoint, DEFAULT_TOKEN_URL)?;
		let mut api_base = resolve_url("api_base", self.api_base, DEFAULT_API_BASE)?;

		if !api_base.path().ends_with('/') {
			let path = format!("{}/", api_base.path());

			api_base.set_path(&path);
		}

		let scopes = match self.scopes {
			Some(scopes) => scopes,
			None => ScopeSet::from_str(DEFAULT_SCOPES)?,
		};

		Ok(IntegrationConfig {
			client_id: self.client_id,
			client_secret: TokenSecret::new(self.client_secret),
			redirect_uri,
			scopes,
			endpoints: HubSpotEndpoints {
				authorization,
				token,
				api_base,
				record_url_template: self.record_url_template,
			},
			key_namespace: self.key_namespace,
			state_ttl: self.state_ttl,
			credentials_ttl: self.credentials_ttl,
			page_size: self.page_size,
			request_timeout: self.request_timeout,
		})
	}
}

fn resolve_url(
	name: &'static str,
	configured: Option<Url>,
	default: &str,
) -> Result<Url, ConfigError> {
	let url = match configured {
		Some(url) => url,
		None => Url::parse(default).map_err(|source| ConfigError::InvalidUrl { name, source })?,
	};

	if matches!(url.scheme(), "http" | "https") {
		Ok(url)
	} else {
		Err(ConfigError::UnsupportedScheme { name, url: url.to_string() })
	}
}

fn validate_duration(name: &'static str, value: Duration) -> Result<(), ConfigError> {
	if value.is_positive() { Ok(()) } else { Err(ConfigError::NonPositiveDuration { name }) }
}
