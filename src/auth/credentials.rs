//! Opaque credential blob returned by the HubSpot token endpoint.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Raw JSON object handed back by the token endpoint (`access_token`, `refresh_token`,
/// `expires_in`, ...), kept verbatim so downstream callers see every provider field.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBlob(JsonMap<String, JsonValue>);
impl CredentialBlob {
	/// Wraps an already-parsed JSON object.
	pub fn new(fields: JsonMap<String, JsonValue>) -> Self {
		Self(fields)
	}

	/// Accepts a JSON object, or a JSON string holding a serialized object.
	///
	/// Any other shape is treated as a malformed blob and fails with
	/// [`Error::MissingAccessToken`].
	pub fn from_value(value: JsonValue) -> Result<Self> {
		match value {
			JsonValue::Object(fields) => Ok(Self(fields)),
			JsonValue::String(raw) => raw.parse(),
			_ => Err(Error::MissingAccessToken),
		}
	}

	/// Bearer token, if the blob carries a non-empty `access_token` string.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.0
			.get("access_token")
			.and_then(JsonValue::as_str)
			.filter(|token| !token.is_empty())
			.map(TokenSecret::new)
	}

	/// Looks up an arbitrary provider field.
	pub fn get(&self, field: &str) -> Option<&JsonValue> {
		self.0.get(field)
	}
}
impl FromStr for CredentialBlob {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match serde_json::from_str(s) {
			Ok(JsonValue::Object(fields)) => Ok(Self(fields)),
			_ => Err(Error::MissingAccessToken),
		}
	}
}
impl TryFrom<JsonValue> for CredentialBlob {
	type Error = Error;

	fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
		Self::from_value(value)
	}
}
impl From<CredentialBlob> for JsonValue {
	fn from(value: CredentialBlob) -> Self {
		JsonValue::Object(value.0)
	}
}
impl Debug for CredentialBlob {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialBlob").field("fields", &self.0.keys().collect::<Vec<_>>()).finish()
	}
}
