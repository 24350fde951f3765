//! Read-once pickup of credentials cached by the callback.

// self
use crate::{
	_prelude::*,
	auth::{CredentialBlob, OrgId, UserId},
	flows::{Integration, common},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
};

impl<C, M> Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the cached credentials for the pair and deletes them.
	///
	/// A second call (or a call after the entry expired) fails with [`Error::NoCredentials`].
	pub async fn take_credentials(&self, user_id: &UserId, org_id: &OrgId) -> Result<CredentialBlob> {
		common::observe(FlowKind::CredentialRetrieval, "take_credentials", async move {
			let key = self.credentials_key(user_id, org_id);
			let guard = common::flow_guard(self, &key);
			let _consume = guard.lock().await;
			let raw = self.store.get(&key).await?.ok_or(Error::NoCredentials)?;
			let credentials = raw.parse::<CredentialBlob>()?;

			self.store.delete(&key).await?;

			Ok(credentials)
		})
		.await
	}
}
