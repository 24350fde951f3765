//! Expiring key-value store contract and built-in implementations.
//!
//! The integration only needs three single-key operations (get, set-with-expiry, delete);
//! anything offering those atomically per key can back it.

pub mod memory;
#[cfg(feature = "redis")] pub mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")] pub use redis::RedisStore;

// self
use crate::{
	_prelude::*,
	auth::{OrgId, UserId},
};

/// Boxed future returned by [`KeyValueStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for short-lived string values.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Fetches the live value stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<String>>;

	/// Stores `value` under `key`, replacing any previous value, expiring after `ttl`.
	fn set_with_expiry<'a>(
		&'a self,
		key: &'a StoreKey,
		value: String,
		ttl: Duration,
	) -> StoreFuture<'a, ()>;

	/// Removes `key`; deleting a missing key is not an error.
	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding or decoding stored values.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// The requested time-to-live is zero or negative.
	#[error("Time-to-live must be positive, got {seconds}s.")]
	InvalidTtl {
		/// Rejected TTL in whole seconds.
		seconds: i64,
	},
}

/// Kind of value stored under a [`StoreKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKeyKind {
	/// Pending authorization state.
	State,
	/// Exchanged credentials awaiting pickup.
	Credentials,
}
impl StoreKeyKind {
	/// Returns the key segment for this kind.
	pub const fn as_str(self) -> &'static str {
		match self {
			StoreKeyKind::State => "state",
			StoreKeyKind::Credentials => "credentials",
		}
	}
}

/// Unique key identifying a stored value, rendered as
/// `{namespace}_{kind}:{org_id}:{user_id}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Integration namespace; empty means no prefix.
	pub namespace: String,
	/// Value kind.
	pub kind: StoreKeyKind,
	/// Organization component.
	pub org_id: OrgId,
	/// User component.
	pub user_id: UserId,
}
impl StoreKey {
	/// Builds a key for the provided namespace, kind, and user/organization pair.
	pub fn new(
		namespace: impl Into<String>,
		kind: StoreKeyKind,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Self {
		Self { namespace: namespace.into(), kind, org_id: org_id.clone(), user_id: user_id.clone() }
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if !self.namespace.is_empty() {
			write!(f, "{}_", self.namespace)?;
		}

		write!(f, "{}:{}:{}", self.kind.as_str(), self.org_id, self.user_id)
	}
}
