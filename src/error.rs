//! Integration-level error types shared across flows, transports, and stores.

// self
use crate::_prelude::*;

/// Integration-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Client-safe message returned for every state verification failure.
const STATE_FAILURE_DETAIL: &str = "State does not match.";

/// Canonical integration error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider reported an OAuth error on the authorization redirect.
	#[error("Provider reported an authorization error: {error}.")]
	Provider {
		/// OAuth `error` code supplied by the provider.
		error: String,
		/// Optional OAuth `error_description` supplied by the provider.
		description: Option<String>,
	},
	/// Callback request omitted a required query parameter.
	#[error("Callback is missing the `{name}` parameter.")]
	MissingCallbackParameter {
		/// Name of the missing parameter.
		name: &'static str,
	},
	/// Returned `state` parameter could not be decoded.
	#[error("Authorization state could not be decoded.")]
	InvalidState,
	/// No pending state exists for the decoded user/organization pair.
	#[error("Authorization state expired or was never issued.")]
	StateExpiredOrMissing,
	/// Returned nonce differs from the pending one, or the caller binding disagrees.
	#[error("Authorization state does not match the pending request.")]
	StateMismatch,
	/// Token endpoint rejected the authorization code exchange.
	#[error("Failed to exchange the authorization code: {reason}.")]
	TokenExchangeFailed {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider- or integration-supplied reason string.
		reason: String,
	},
	/// No cached credentials exist (never stored, already consumed, or expired).
	#[error("No cached credentials were found.")]
	NoCredentials,
	/// Credential blob is malformed or lacks an `access_token`.
	#[error("Credentials do not contain an access token.")]
	MissingAccessToken,
	/// Provider responded with a body that could not be parsed.
	#[error("Provider returned a malformed response body.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Unexpected failure that aborted an item fetch.
	#[error("Error fetching HubSpot items: {source}")]
	Fetch {
		/// Underlying failure.
		#[source]
		source: Box<Error>,
	},
}
impl Error {
	/// Wraps an unexpected failure raised while fetching items.
	pub fn fetch(source: Error) -> Self {
		match source {
			Self::Fetch { .. } => source,
			other => Self::Fetch { source: Box::new(other) },
		}
	}

	/// HTTP-equivalent status code for the failure.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Provider { .. }
			| Self::MissingCallbackParameter { .. }
			| Self::InvalidState
			| Self::StateExpiredOrMissing
			| Self::StateMismatch
			| Self::TokenExchangeFailed { .. }
			| Self::NoCredentials
			| Self::MissingAccessToken => 400,
			Self::Storage(_)
			| Self::Config(_)
			| Self::Transport(_)
			| Self::ResponseParse { .. }
			| Self::Fetch { .. } => 500,
		}
	}

	/// Message that is safe to return to the end user.
	///
	/// State verification failures collapse into a single message so callers cannot probe
	/// which check rejected them.
	pub fn public_detail(&self) -> String {
		match self {
			Self::Provider { error, description } =>
				description.clone().unwrap_or_else(|| error.clone()),
			Self::MissingCallbackParameter { .. } => "Missing code or state parameter.".into(),
			Self::InvalidState | Self::StateExpiredOrMissing | Self::StateMismatch =>
				STATE_FAILURE_DETAIL.into(),
			Self::TokenExchangeFailed { .. } => "Failed to exchange code for token.".into(),
			Self::NoCredentials => "No credentials found.".into(),
			Self::MissingAccessToken => "No access token found in credentials.".into(),
			Self::Fetch { .. } => self.to_string(),
			Self::Storage(_) | Self::Config(_) | Self::Transport(_) | Self::ResponseParse { .. } =>
				"Internal integration error.".into(),
		}
	}
}

/// Configuration and validation failures raised by the integration.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured URL cannot be parsed or joined.
	#[error("The {name} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed to parse.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than `http`/`https`.
	#[error("The {name} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which URL failed validation.
		name: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// A required setting is empty.
	#[error("The {name} setting cannot be empty.")]
	MissingSetting {
		/// Setting name.
		name: &'static str,
	},
	/// A required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// A duration setting is zero or negative.
	#[error("The {name} duration must be positive.")]
	NonPositiveDuration {
		/// Setting name.
		name: &'static str,
	},
	/// CRM page size is outside the range HubSpot accepts.
	#[error("Page size {value} is outside 1..=100.")]
	PageSizeOutOfRange {
		/// Rejected page size.
		value: u32,
	},
	/// Record URL template lacks the `{id}` placeholder.
	#[error("Record URL template must contain `{{id}}`: {template}.")]
	RecordUrlTemplate {
		/// Rejected template.
		template: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {call}.")]
	Network {
		/// Label of the outbound call.
		call: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The outbound call exceeded the configured timeout.
	#[error("Request timed out while calling the {call}.")]
	Timeout {
		/// Label of the outbound call.
		call: String,
	},
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the {call}: {message}.")]
	Other {
		/// Label of the outbound call.
		call: String,
		/// Transport-supplied message.
		message: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during an outbound call.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(call: impl Display, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { call: call.to_string(), source: Box::new(src) }
	}
}
