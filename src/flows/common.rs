//! Shared helpers for flow implementations (store keys, per-key guards, flow observation).

// self
use crate::{
	_prelude::*,
	auth::{OrgId, UserId},
	flows::Integration,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{StoreKey, StoreKeyKind},
};

impl<C, M> Integration<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Store key holding the pending authorization state for a user/organization pair.
	pub fn state_key(&self, user_id: &UserId, org_id: &OrgId) -> StoreKey {
		StoreKey::new(&self.config.key_namespace, StoreKeyKind::State, org_id, user_id)
	}

	/// Store key holding cached credentials for a user/organization pair.
	pub fn credentials_key(&self, user_id: &UserId, org_id: &OrgId) -> StoreKey {
		StoreKey::new(&self.config.key_namespace, StoreKeyKind::Credentials, org_id, user_id)
	}
}

/// Returns (and creates on demand) the in-process guard for a store key.
///
/// Read-then-delete sequences hold the guard so two concurrent callers in one process cannot
/// both consume the same entry.
pub(crate) fn flow_guard<C, M>(integration: &Integration<C, M>, key: &StoreKey) -> Arc<AsyncMutex<()>>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let mut guards = integration.flow_guards.lock();

	guards.retain(|_, guard| Arc::strong_count(guard) > 1);
	guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

/// Runs `fut` inside a flow span, recording attempt/success/failure outcomes.
pub(crate) async fn observe<T, F>(kind: FlowKind, stage: &'static str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span
		.instrument(async move {
			let result = fut.await;

			if let Err(err) = &result {
				obs::log_flow_failure(kind, err);
			}

			result
		})
		.await;

	match &result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
	}

	result
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn keys_follow_the_namespace() {
		let (integration, _) = build_reqwest_test_integration(test_config("http://127.0.0.1:1"));
		let user = UserId::new("user-1").expect("User fixture should be valid.");
		let org = OrgId::new("org-1").expect("Org fixture should be valid.");

		assert_eq!(integration.state_key(&user, &org).to_string(), "hubspot_state:org-1:user-1");
		assert_eq!(
			integration.credentials_key(&user, &org).to_string(),
			"hubspot_credentials:org-1:user-1"
		);
	}

	#[tokio::test]
	async fn guards_are_shared_per_key_and_released() {
		let (integration, _) = build_reqwest_test_integration(test_config("http://127.0.0.1:1"));
		let user = UserId::new("user-1").expect("User fixture should be valid.");
		let org = OrgId::new("org-1").expect("Org fixture should be valid.");
		let key = integration.state_key(&user, &org);
		let first = flow_guard(&integration, &key);
		let second = flow_guard(&integration, &key);

		assert!(Arc::ptr_eq(&first, &second));

		let held = first.lock().await;

		assert!(second.try_lock().is_none());

		drop(held);
		drop(first);
		drop(second);

		let _other = flow_guard(&integration, &integration.credentials_key(&user, &org));

		assert_eq!(integration.flow_guards.lock().len(), 1);
	}

	#[tokio::test]
	async fn observe_passes_results_through() {
		let ok = observe(FlowKind::Authorize, "test", async { Ok(7) }).await;

		assert_eq!(ok.expect("Successful flows should pass their value through."), 7);

		let err = observe::<(), _>(FlowKind::Callback, "test", async { Err(Error::StateMismatch) })
			.await;

		assert!(matches!(err, Err(Error::StateMismatch)));
	}
}
