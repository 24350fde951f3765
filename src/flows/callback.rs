//! OAuth callback handling: state verification, code exchange, and credential caching.

// crates.io
use futures::future;
// self
use crate::{
	_prelude::*,
	auth::{AuthorizationState, CredentialBlob, StateBinding},
	flows::{Integration, authorize, common},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
};

const CLOSE_WINDOW_HTML: &str = "<html>\n\t<script>\n\t\twindow.close();\n\t</script>\n</html>\n";

/// Query parameters HubSpot appends to the redirect URI.
///
/// Every field is optional so web framework query extractors can deserialize any redirect;
/// [`Integration::complete_callback`] decides which combinations are acceptable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Encoded [`AuthorizationState`].
	pub state: Option<String>,
	/// OAuth error code reported by the provider.
	pub error: Option<String>,
	/// Human-readable provider error description.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Parameters of a successful redirect.
	pub fn new(code: impl Into<String>, state: impl Into<String>) -> Self {
		Self { code: Some(code.into()), state: Some(state.into()), ..Default::default() }
	}

	fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str> {
		value
			.filter(|value| !value.is_empty())
			.ok_or(Error::MissingCallbackParameter { name })
	}
}

/// Response rendered once the callback succeeds; its script only closes the popup window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackPage {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value.
	pub content_type: &'static str,
	/// HTML body.
	pub body: String,
}
impl CallbackPage {
	/// Page that closes the authorization popup.
	pub fn close_window() -> Self {
		Self { status: 200, content_type: "text/html; charset=utf-8", body: CLOSE_WINDOW_HTML.into() }
	}
}

impl<C, M> Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Completes the authorization redirect.
	///
	/// Provider errors short-circuit with [`Error::Provider`]. Otherwise the state is verified
	/// against the pending entry, the code is exchanged while the entry is deleted, and the
	/// credentials are cached for [`Integration::take_credentials`].
	pub async fn complete_callback(
		&self,
		params: CallbackParams,
		binding: Option<&StateBinding>,
	) -> Result<CallbackPage> {
		common::observe(FlowKind::Callback, "complete_callback", async move {
			if let Some(error) = params.error {
				return Err(Error::Provider { error, description: params.error_description });
			}

			let code = CallbackParams::required(params.code.as_deref(), "code")?;
			let encoded = CallbackParams::required(params.state.as_deref(), "state")?;
			let state = authorize::decode_bound_state(encoded, binding)?;
			let key = self.state_key(&state.user_id, &state.org_id);
			let guard = common::flow_guard(self, &key);
			let _consume = guard.lock().await;

			self.check_pending_state(&state, &key).await?;
			self.exchange_code(&state, code).await?;

			Ok(CallbackPage::close_window())
		})
		.await
	}

	/// Exchanges `code` for credentials and caches the token endpoint's body, exactly as
	/// received, for `state`'s user/organization pair.
	///
	/// The exchange and the deletion of the consumed state entry run concurrently and neither
	/// waits on the other's outcome; an exchange failure is reported ahead of a deletion
	/// failure.
	pub async fn exchange_code(
		&self,
		state: &AuthorizationState,
		code: &str,
	) -> Result<CredentialBlob> {
		let state_key = self.state_key(&state.user_id, &state.org_id);
		let (exchanged, deleted) = future::join(
			self.token_exchange.exchange_code(code),
			self.store.delete(&state_key),
		)
		.await;
		let response = exchanged?;

		deleted?;

		self.store
			.set_with_expiry(
				&self.credentials_key(&state.user_id, &state.org_id),
				response.raw,
				self.config.credentials_ttl,
			)
			.await?;

		Ok(response.credentials)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn required_rejects_missing_and_empty() {
		assert!(matches!(
			CallbackParams::required(None, "code"),
			Err(Error::MissingCallbackParameter { name: "code" })
		));
		assert!(matches!(
			CallbackParams::required(Some(""), "state"),
			Err(Error::MissingCallbackParameter { name: "state" })
		));
		assert_eq!(
			CallbackParams::required(Some("abc"), "code").expect("Present values should pass."),
			"abc"
		);
	}

	#[test]
	fn params_deserialize_from_query_maps() {
		let params: CallbackParams = serde_json::from_value(serde_json::json!({
			"error": "access_denied",
			"error_description": "User declined."
		}))
		.expect("Error redirects should deserialize.");

		assert_eq!(params.error.as_deref(), Some("access_denied"));
		assert!(params.code.is_none());
	}

	#[test]
	fn close_window_page_is_html() {
		let page = CallbackPage::close_window();

		assert_eq!(page.status, 200);
		assert_eq!(page.content_type, "text/html; charset=utf-8");
		assert!(page.body.contains("window.close();"));
	}
}
