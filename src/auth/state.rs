//! One-time authorization state round-tripped through the HubSpot redirect.
//!
//! The state travels as URL-safe base64 of a small JSON document
//! (`{"state": <nonce>, "user_id": .., "org_id": ..}`), and a copy of the same document waits in
//! the store until the callback consumes it.

// crates.io
use base64::{
	Engine as _,
	alphabet,
	engine::{
		DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
		general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
	},
};
use rand::RngCore;
// self
use crate::{
	_prelude::*,
	auth::{OrgId, UserId},
};

const NONCE_BYTES: usize = 32;
/// Accepts padded and unpadded URL-safe input, since some proxies strip `=`.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Pending authorization request for a single user/organization pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
	/// Random single-use nonce.
	#[serde(rename = "state", alias = "nonce")]
	pub nonce: String,
	/// User who started the authorization.
	pub user_id: UserId,
	/// Organization the user belongs to.
	pub org_id: OrgId,
}
impl AuthorizationState {
	/// Mints a fresh state with a 32-byte random nonce.
	pub fn generate(user_id: UserId, org_id: OrgId) -> Self {
		Self { nonce: generate_nonce(), user_id, org_id }
	}

	/// JSON form persisted in the store.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Parses the JSON form persisted in the store.
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(raw)
	}

	/// Encodes the state for the `state` query parameter.
	pub fn encode(&self) -> Result<String, serde_json::Error> {
		Ok(URL_SAFE.encode(serde_json::to_vec(self)?))
	}

	/// Decodes a returned `state` query parameter.
	pub fn decode(encoded: &str) -> Result<Self> {
		let bytes = URL_SAFE_LENIENT.decode(encoded.trim()).map_err(|_| Error::InvalidState)?;

		serde_json::from_slice(&bytes).map_err(|_| Error::InvalidState)
	}

	/// Returns true when the state belongs to the bound caller.
	pub fn matches_binding(&self, binding: &StateBinding) -> bool {
		self.user_id == binding.user_id && self.org_id == binding.org_id
	}
}
impl Debug for AuthorizationState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationState")
			.field("nonce", &"<redacted>")
			.field("user_id", &self.user_id)
			.field("org_id", &self.org_id)
			.finish()
	}
}

/// Caller context the returned state must belong to.
///
/// Without a binding the callback trusts the user/organization named inside the decoded
/// payload to pick the store entry it is checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBinding {
	/// Expected user.
	pub user_id: UserId,
	/// Expected organization.
	pub org_id: OrgId,
}
impl StateBinding {
	/// Creates a binding for the provided user/organization pair.
	pub fn new(user_id: UserId, org_id: OrgId) -> Self {
		Self { user_id, org_id }
	}
}

fn generate_nonce() -> String {
	let mut bytes = [0_u8; NONCE_BYTES];

	rand::rng().fill_bytes(&mut bytes);

	URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn fixture() -> AuthorizationState {
		AuthorizationState::generate(
			UserId::new("user-1").expect("User fixture should be valid."),
			OrgId::new("org-1").expect("Org fixture should be valid."),
		)
	}

	#[test]
	fn nonce_carries_32_bytes_of_entropy() {
		let state = fixture();

		assert_eq!(state.nonce.len(), 43, "32 bytes encode to 43 unpadded base64 characters.");
		assert!(state.nonce.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
		assert_ne!(state.nonce, fixture().nonce);
	}

	#[test]
	fn encoded_state_decodes_with_or_without_padding() {
		let state = fixture();
		let encoded = state.encode().expect("State should encode.");

		assert_eq!(AuthorizationState::decode(&encoded).expect("Padded state decodes."), state);
		assert_eq!(
			AuthorizationState::decode(encoded.trim_end_matches('='))
				.expect("Unpadded state decodes."),
			state
		);
	}

	#[test]
	fn wire_format_uses_state_key() {
		let state = fixture();
		let json: JsonValue = serde_json::from_str(&state.to_json().expect("State should serialize."))
			.expect("Serialized state should be JSON.");

		assert_eq!(json["state"], JsonValue::String(state.nonce.clone()));
		assert_eq!(json["user_id"], "user-1");
		assert_eq!(json["org_id"], "org-1");

		let aliased = AuthorizationState::from_json(
			r#"{"nonce":"abc","user_id":"user-1","org_id":"org-1"}"#,
		)
		.expect("The nonce alias should be accepted.");

		assert_eq!(aliased.nonce, "abc");
	}

	#[test]
	fn garbage_is_invalid_state() {
		assert!(matches!(AuthorizationState::decode("%%%"), Err(Error::InvalidState)));

		let not_json = URL_SAFE.encode("not json");

		assert!(matches!(AuthorizationState::decode(&not_json), Err(Error::InvalidState)));

		let bad_ids = URL_SAFE.encode(r#"{"state":"n","user_id":"a b","org_id":"o"}"#);

		assert!(matches!(AuthorizationState::decode(&bad_ids), Err(Error::InvalidState)));
	}

	#[test]
	fn debug_redacts_nonce() {
		let state = fixture();

		assert!(!format!("{state:?}").contains(&state.nonce));
	}
}
