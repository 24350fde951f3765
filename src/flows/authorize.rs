//! Authorization URL minting and one-time state verification.
//!
//! [`Integration::authorize`] stores a fresh [`AuthorizationState`] under the caller's state key
//! and returns the HubSpot consent URL carrying the encoded state. [`Integration::verify_state`]
//! consumes that entry exactly once: a replayed, tampered, or expired state never verifies.

// self
use crate::{
	_prelude::*,
	auth::{AuthorizationState, OrgId, StateBinding, UserId},
	flows::{Integration, common},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
	store::{StoreError, StoreKey},
};

impl<C, M> Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Mints a pending state for the pair and returns the HubSpot authorization URL.
	///
	/// Calling this again for the same pair overwrites (and so invalidates) the previous state.
	pub async fn authorize(&self, user_id: &UserId, org_id: &OrgId) -> Result<Url> {
		common::observe(FlowKind::Authorize, "authorize", async move {
			let state = AuthorizationState::generate(user_id.clone(), org_id.clone());
			let key = self.state_key(user_id, org_id);
			let stored = state.to_json().map_err(serialization_error)?;

			self.store.set_with_expiry(&key, stored, self.config.state_ttl).await?;

			let encoded = state.encode().map_err(serialization_error)?;

			Ok(self.authorization_url(&encoded))
		})
		.await
	}

	/// Verifies and consumes a returned `state` parameter.
	///
	/// With a `binding`, a payload naming any other user/organization fails with
	/// [`Error::StateMismatch`] before the store is consulted.
	pub async fn verify_state(
		&self,
		encoded: &str,
		binding: Option<&StateBinding>,
	) -> Result<AuthorizationState> {
		common::observe(FlowKind::Callback, "verify_state", async move {
			let state = decode_bound_state(encoded, binding)?;
			let key = self.state_key(&state.user_id, &state.org_id);
			let guard = common::flow_guard(self, &key);
			let _consume = guard.lock().await;

			self.check_pending_state(&state, &key).await?;
			self.store.delete(&key).await?;

			Ok(state)
		})
		.await
	}

	/// Fails unless `key` holds a live state whose nonce equals the returned one.
	pub(crate) async fn check_pending_state(
		&self,
		state: &AuthorizationState,
		key: &StoreKey,
	) -> Result<()> {
		let raw = self.store.get(key).await?.ok_or(Error::StateExpiredOrMissing)?;
		let pending = AuthorizationState::from_json(&raw).map_err(serialization_error)?;

		if pending.nonce != state.nonce {
			return Err(Error::StateMismatch);
		}

		Ok(())
	}

	fn authorization_url(&self, encoded_state: &str) -> Url {
		let mut url = self.config.endpoints.authorization.clone();

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("client_id", &self.config.client_id)
				.append_pair("redirect_uri", self.config.redirect_uri.as_str());

			if !self.config.scopes.is_empty() {
				query.append_pair("scope", &self.config.scopes.normalized());
			}

			query.append_pair("state", encoded_state);
		}

		url
	}
}

/// Decodes a returned state and applies the optional caller binding.
pub(crate) fn decode_bound_state(
	encoded: &str,
	binding: Option<&StateBinding>,
) -> Result<AuthorizationState> {
	let state = AuthorizationState::decode(encoded)?;

	if binding.is_some_and(|binding| !state.matches_binding(binding)) {
		return Err(Error::StateMismatch);
	}

	Ok(state)
}

fn serialization_error(e: serde_json::Error) -> Error {
	StoreError::Serialization { message: e.to_string() }.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn state() -> AuthorizationState {
		AuthorizationState::generate(
			UserId::new("user-1").expect("User fixture should be valid."),
			OrgId::new("org-1").expect("Org fixture should be valid."),
		)
	}

	#[test]
	fn bound_decode_rejects_foreign_pairs() {
		let state = state();
		let encoded = state.encode().expect("State should encode.");
		let own = StateBinding::new(state.user_id.clone(), state.org_id.clone());
		let foreign = StateBinding::new(
			UserId::new("user-2").expect("User fixture should be valid."),
			state.org_id.clone(),
		);

		assert_eq!(
			decode_bound_state(&encoded, Some(&own)).expect("Own binding should pass."),
			state
		);
		assert!(matches!(decode_bound_state(&encoded, Some(&foreign)), Err(Error::StateMismatch)));
		assert!(decode_bound_state(&encoded, None).is_ok());
	}

	#[test]
	fn bound_decode_rejects_garbage() {
		assert!(matches!(decode_bound_state("%%%", None), Err(Error::InvalidState)));
	}
}
