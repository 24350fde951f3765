#![cfg(feature = "reqwest")]

// self
use hubspot_bridge::{
	_preludet::*,
	auth::{AuthorizationState, OrgId, StateBinding, UserId},
	store::KeyValueStore,
};

const UNUSED_BASE: &str = "http://127.0.0.1:9";

fn ids() -> (UserId, OrgId) {
	(
		UserId::new("user-456").expect("User identifier should be valid for state tests."),
		OrgId::new("org-123").expect("Org identifier should be valid for state tests."),
	)
}

fn state_param(url: &Url) -> String {
	url.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Authorization URL should carry a state parameter.")
}

#[tokio::test]
async fn authorize_builds_consent_url_and_stores_state() {
	let config = test_config(UNUSED_BASE);
	let (integration, store) = build_reqwest_test_integration(config.clone());
	let (user, org) = ids();
	let url = integration.authorize(&user, &org).await.expect("Authorization should start.");
	let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert_eq!(url.path(), "/oauth/authorize");
	assert_eq!(pairs.get("client_id"), Some(&"client-it".into()));
	assert_eq!(pairs.get("redirect_uri"), Some(&config.redirect_uri.as_str().into()));
	assert_eq!(pairs.get("scope"), Some(&config.scopes.normalized()));

	let state = AuthorizationState::decode(&state_param(&url))
		.expect("State parameter should decode back into an authorization state.");

	assert_eq!(state.user_id, user);
	assert_eq!(state.org_id, org);
	assert_eq!(state.nonce.len(), 43);

	let stored = store
		.get(&integration.state_key(&user, &org))
		.await
		.expect("Store lookup should succeed.")
		.expect("Pending state should be stored.");
	let pending =
		AuthorizationState::from_json(&stored).expect("Stored state should parse back from JSON.");

	assert_eq!(pending, state);
}

#[tokio::test]
async fn state_verifies_exactly_once() {
	let (integration, store) = build_reqwest_test_integration(test_config(UNUSED_BASE));
	let (user, org) = ids();
	let url = integration.authorize(&user, &org).await.expect("Authorization should start.");
	let encoded = state_param(&url);
	let verified =
		integration.verify_state(&encoded, None).await.expect("First verification should pass.");

	assert_eq!(verified.user_id, user);
	assert!(store.is_empty(), "Verified state should be deleted.");

	let replay = integration
		.verify_state(&encoded, None)
		.await
		.expect_err("Replaying a consumed state should fail.");

	assert!(matches!(replay, Error::StateExpiredOrMissing));
	assert_eq!(replay.status_code(), 400);
	assert_eq!(replay.public_detail(), "State does not match.");
}

#[tokio::test]
async fn tampered_nonce_is_rejected_without_consuming_state() {
	let (integration, _store) = build_reqwest_test_integration(test_config(UNUSED_BASE));
	let (user, org) = ids();
	let url = integration.authorize(&user, &org).await.expect("Authorization should start.");
	let encoded = state_param(&url);
	let mut tampered = AuthorizationState::decode(&encoded).expect("State should decode.");

	tampered.nonce.push('x');

	let err = integration
		.verify_state(&tampered.encode().expect("Tampered state should encode."), None)
		.await
		.expect_err("A tampered nonce should fail verification.");

	assert!(matches!(err, Error::StateMismatch));

	integration
		.verify_state(&encoded, None)
		.await
		.expect("The genuine state should still verify after a rejected attempt.");
}

#[tokio::test]
async fn reauthorizing_invalidates_the_previous_state() {
	let (integration, _store) = build_reqwest_test_integration(test_config(UNUSED_BASE));
	let (user, org) = ids();
	let first = integration.authorize(&user, &org).await.expect("Authorization should start.");
	let second = integration.authorize(&user, &org).await.expect("Authorization should restart.");
	let err = integration
		.verify_state(&state_param(&first), None)
		.await
		.expect_err("An overwritten state should fail verification.");

	assert!(matches!(err, Error::StateMismatch));

	integration
		.verify_state(&state_param(&second), None)
		.await
		.expect("The latest state should verify.");
}

#[tokio::test]
async fn expired_state_is_missing() {
	let mut config = test_config(UNUSED_BASE);

	config.state_ttl = Duration::milliseconds(100);

	let (integration, _store) = build_reqwest_test_integration(config);
	let (user, org) = ids();
	let url = integration.authorize(&user, &org).await.expect("Authorization should start.");

	tokio::time::sleep(std::time::Duration::from_millis(200)).await;

	let err = integration
		.verify_state(&state_param(&url), None)
		.await
		.expect_err("An expired state should fail verification.");

	assert!(matches!(err, Error::StateExpiredOrMissing));
}

#[tokio::test]
async fn binding_rejects_states_minted_for_someone_else() {
	let (integration, store) = build_reqwest_test_integration(test_config(UNUSED_BASE));
	let (user, org) = ids();
	let url = integration.authorize(&user, &org).await.expect("Authorization should start.");
	let other = StateBinding::new(
		UserId::new("user-999").expect("User identifier should be valid for state tests."),
		org.clone(),
	);
	let err = integration
		.verify_state(&state_param(&url), Some(&other))
		.await
		.expect_err("A foreign binding should fail verification.");

	assert!(matches!(err, Error::StateMismatch));
	assert_eq!(store.len(), 1, "A rejected binding must not consume the pending state.");

	let own = StateBinding::new(user, org);

	integration
		.verify_state(&state_param(&url), Some(&own))
		.await
		.expect("The matching binding should verify.");
}

#[tokio::test]
async fn undecodable_state_is_invalid() {
	let (integration, _store) = build_reqwest_test_integration(test_config(UNUSED_BASE));

	for garbage in ["", "not base64 !", "bm90IGpzb24"] {
		let err = integration
			.verify_state(garbage, None)
			.await
			.expect_err("Undecodable states should fail verification.");

		assert!(matches!(err, Error::InvalidState), "Unexpected error for {garbage:?}: {err:?}.");
	}
}

#[tokio::test]
async fn concurrent_verifications_consume_once() {
	let (integration, _store) = build_reqwest_test_integration(test_config(UNUSED_BASE));
	let (user, org) = ids();
	let url = integration.authorize(&user, &org).await.expect("Authorization should start.");
	let encoded = state_param(&url);
	let (first, second) = tokio::join!(
		integration.verify_state(&encoded, None),
		integration.verify_state(&encoded, None)
	);

	assert_eq!(
		[first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
		1,
		"Exactly one concurrent verification should succeed."
	);
}
