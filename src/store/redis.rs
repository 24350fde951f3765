//! Redis-backed [`KeyValueStore`] for deployments that share state across processes.

// crates.io
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
// self
use crate::{
	_prelude::*,
	store::{KeyValueStore, StoreError, StoreFuture, StoreKey},
};

/// Stores values with `SET .. EX`, so Redis itself enforces expiry.
#[derive(Clone)]
pub struct RedisStore {
	client: Client,
	connection: Arc<AsyncMutex<Option<MultiplexedConnection>>>,
}
impl RedisStore {
	/// Creates a store for the provided Redis URL; the connection is opened on first use.
	pub fn open(url: &str) -> Result<Self, StoreError> {
		let client = Client::open(url).map_err(backend_error)?;

		Ok(Self { client, connection: Default::default() })
	}

	/// Returns a multiplexed connection, reusing the cached one when present.
	async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
		let mut guard = self.connection.lock().await;

		if let Some(conn) = guard.as_ref() {
			return Ok(conn.clone());
		}

		let conn = self.client.get_multiplexed_async_connection().await.map_err(backend_error)?;

		*guard = Some(conn.clone());

		Ok(conn)
	}

	/// Forgets the cached connection so the next call reconnects.
	async fn reset(&self) {
		*self.connection.lock().await = None;
	}
}
impl KeyValueStore for RedisStore {
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move {
			let mut conn = self.connection().await?;
			let result: Result<Option<String>, _> = conn.get(key.to_string()).await;

			if result.is_err() {
				self.reset().await;
			}

			result.map_err(backend_error)
		})
	}

	fn set_with_expiry<'a>(
		&'a self,
		key: &'a StoreKey,
		value: String,
		ttl: Duration,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let seconds = u64::try_from(ttl.whole_seconds())
				.ok()
				.filter(|secs| *secs > 0)
				.ok_or(StoreError::InvalidTtl { seconds: ttl.whole_seconds() })?;
			let mut conn = self.connection().await?;
			let result: Result<(), _> = conn.set_ex(key.to_string(), value, seconds).await;

			if result.is_err() {
				self.reset().await;
			}

			result.map_err(backend_error)
		})
	}

	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut conn = self.connection().await?;
			let result: Result<(), _> = conn.del(key.to_string()).await;

			if result.is_err() {
				self.reset().await;
			}

			result.map_err(backend_error)
		})
	}
}
impl Debug for RedisStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedisStore").field("connection_info", self.client.get_connection_info()).finish()
	}
}

fn backend_error(e: redis::RedisError) -> StoreError {
	StoreError::Backend { message: e.to_string() }
}
