//! Token exchange against the HubSpot token endpoint plus transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{CredentialBlob, TokenSecret},
	config::IntegrationConfig,
	error::ConfigError,
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
};
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// Successful token response: the parsed object plus the body exactly as received.
#[derive(Clone)]
pub(crate) struct TokenResponseBody {
	pub(crate) credentials: CredentialBlob,
	pub(crate) raw: String,
}
impl Debug for TokenResponseBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponseBody").field("credentials", &self.credentials).finish()
	}
}

/// Outbound call being performed when a transport failure surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboundCall {
	/// Authorization-code exchange against the token endpoint.
	TokenExchange,
	/// CRM object listing for the labeled object collection.
	CrmObjects(&'static str),
}
impl Display for OutboundCall {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::TokenExchange => f.write_str("token endpoint"),
			Self::CrmObjects(path) => write!(f, "CRM {path} endpoint"),
		}
	}
}

/// Maps HTTP transport failures into integration [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an integration error.
	fn map_transport_error(
		&self,
		call: OutboundCall,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		call: OutboundCall,
		_: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(call, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::Other { call: call.to_string(), message }.into(),
			_ => TransportError::Other {
				call: call.to_string(),
				message: "unrecognized transport failure".into(),
			}
			.into(),
		}
	}
}

/// Exchanges authorization codes for the raw provider credential blob.
pub(crate) struct TokenExchange<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	token_url: Url,
	client_id: String,
	client_secret: TokenSecret,
	redirect_uri: Url,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenExchange<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_config(
		config: &IntegrationConfig,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			token_url: config.endpoints.token.clone(),
			client_id: config.client_id.clone(),
			client_secret: config.client_secret.clone(),
			redirect_uri: config.redirect_uri.clone(),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		}
	}

	/// Posts `grant_type=authorization_code` with the code, redirect URI, and client
	/// credentials, returning the provider's JSON response untouched.
	pub(crate) async fn exchange_code(&self, code: &str) -> Result<TokenResponseBody> {
		let request = self.token_request(code)?;
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let response = handle.call(request).await.map_err(|err| {
			let metadata = meta.take();

			self.error_mapper.map_transport_error(
				OutboundCall::TokenExchange,
				metadata.as_ref(),
				err,
			)
		})?;

		read_token_response(response.status().as_u16(), response.body())
	}

	fn token_request(&self, code: &str) -> Result<HttpRequest> {
		let form = form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", "authorization_code")
			.append_pair("code", code)
			.append_pair("redirect_uri", self.redirect_uri.as_str())
			.append_pair("client_id", &self.client_id)
			.append_pair("client_secret", self.client_secret.expose())
			.finish();

		Request::builder()
			.method(Method::POST)
			.uri(self.token_url.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(form.into_bytes())
			.map_err(|e| ConfigError::from(e).into())
	}
}
impl<C, M> Debug for TokenExchange<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchange")
			.field("token_url", &self.token_url.as_str())
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.finish()
	}
}

fn read_token_response(status: u16, body: &[u8]) -> Result<TokenResponseBody> {
	if status != 200 {
		return Err(Error::TokenExchangeFailed {
			status: Some(status),
			reason: token_failure_reason(status, body),
		});
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let fields: JsonMap<String, JsonValue> = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::ResponseParse { source, status: Some(status) })?;

	Ok(TokenResponseBody {
		credentials: CredentialBlob::new(fields),
		raw: String::from_utf8_lossy(body).into_owned(),
	})
}

// OAuth error bodies carry `error_description`/`error`; HubSpot's own errors carry `message`.
fn token_failure_reason(status: u16, body: &[u8]) -> String {
	let fields = serde_json::from_slice::<JsonMap<String, JsonValue>>(body).unwrap_or_default();

	["error_description", "message", "error"]
		.into_iter()
		.find_map(|field| {
			fields.get(field).and_then(JsonValue::as_str).filter(|reason| !reason.is_empty())
		})
		.map(str::to_owned)
		.unwrap_or_else(|| format!("token endpoint answered with status {status}"))
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(call: OutboundCall, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { call: call.to_string() }.into();
	}

	TransportError::network(call, err).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn success_bodies_are_kept_verbatim() {
		let raw = r#"{"access_token":"at","token_type":"Bearer","refresh_token":null,"expires_in":1800}"#;
		let body = read_token_response(200, raw.as_bytes()).expect("A JSON object should parse.");

		assert_eq!(body.raw, raw);
		assert_eq!(body.credentials.get("token_type"), Some(&JsonValue::from("Bearer")));
		assert_eq!(body.credentials.get("refresh_token"), Some(&JsonValue::Null));
	}

	#[test]
	fn missing_token_type_is_accepted() {
		let body = read_token_response(200, br#"{"access_token":"at","expires_in":1800}"#)
			.expect("Token responses without a token type should parse.");

		assert_eq!(body.credentials.access_token().map(|t| t.expose().to_owned()), Some("at".into()));
	}

	#[test]
	fn non_object_success_bodies_fail_to_parse() {
		for body in [&b"not json"[..], &b"[1,2]"[..], &b"\"token\""[..]] {
			assert!(matches!(
				read_token_response(200, body),
				Err(Error::ResponseParse { status: Some(200), .. })
			));
		}
	}

	#[test]
	fn failures_pick_the_most_specific_reason() {
		let reason = |status, body: &str| match read_token_response(status, body.as_bytes()) {
			Err(Error::TokenExchangeFailed { status: Some(code), reason }) if code == status =>
				reason,
			other => panic!("Unexpected outcome: {other:?}."),
		};

		assert_eq!(
			reason(400, r#"{"error":"invalid_grant","error_description":"code expired"}"#),
			"code expired"
		);
		assert_eq!(
			reason(400, r#"{"status":"BAD_AUTH_CODE","message":"missing or unknown auth code"}"#),
			"missing or unknown auth code"
		);
		assert_eq!(reason(401, r#"{"error":"invalid_client"}"#), "invalid_client");
		assert_eq!(reason(502, "<html>bad gateway</html>"), "token endpoint answered with status 502");
	}

	#[test]
	fn outbound_calls_render_labels() {
		assert_eq!(OutboundCall::TokenExchange.to_string(), "token endpoint");
		assert_eq!(OutboundCall::CrmObjects("deals").to_string(), "CRM deals endpoint");
	}
}
