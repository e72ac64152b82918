//! Redis backend using a bb8 connection pool.

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};

use crate::cache::{BackendStore, CacheError, ExpiryConvention};
use crate::config::settings::ResolvedBackend;

type RedisPool = Pool<Client>;

/// Redis-based backend with bb8 connection pool.
///
/// Expiries are relative seconds (`SET .. EX`). Every key is stored under
/// `{key_prefix}:{key}` so `flush` only removes entries this store wrote.
pub struct RedisStore {
    pool: RedisPool,
    key_prefix: String,
}

impl RedisStore {
    /// Open a pool against `backend.host:backend.port`.
    ///
    /// The pool is built eagerly, so an unreachable server is reported here
    /// as [`CacheError::Connection`].
    pub async fn connect(backend: &ResolvedBackend) -> Result<Self, CacheError> {
        let client = Client::open(Self::url(backend).as_str())
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(backend.pool_size)
            .connection_timeout(std::time::Duration::from_secs(backend.connection_timeout))
            .build(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::debug!(host = %backend.host, port = backend.port, "Connected redis backend");

        Ok(Self {
            pool,
            key_prefix: backend.key_prefix.clone(),
        })
    }

    fn url(backend: &ResolvedBackend) -> String {
        let scheme = if backend.tls_enabled { "rediss" } else { "redis" };
        format!("{}://{}:{}/", scheme, backend.host, backend.port)
    }

    fn prefixed_key(&self, key: &str) -> String {
        prefixed(&self.key_prefix, key)
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

fn prefixed(prefix: &str, key: &str) -> String {
    format!("{}:{}", prefix, key)
}

#[async_trait]
impl BackendStore for RedisStore {
    fn expiry_convention(&self) -> ExpiryConvention {
        ExpiryConvention::Relative
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .get(&prefixed)
            .await
            .map_err(|e: RedisError| CacheError::from(e))
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .set_ex::<_, _, ()>(&prefixed, value, expiry.max(1))
            .await
            .map_err(CacheError::from)
    }

    async fn add(&self, key: &str, value: Vec<u8>, expiry: u64) -> Result<bool, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let reply: Option<String> = redis::cmd("SET")
            .arg(&prefixed)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(expiry.max(1))
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::from(e))?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let removed: i64 = conn_ref.del(&prefixed).await.map_err(CacheError::from)?;
        Ok(removed > 0)
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let pattern = format!("{}:*", self.key_prefix);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::from(e))?;

        if !keys.is_empty() {
            let conn_ref: &mut MultiplexedConnection = &mut conn;
            conn_ref
                .del::<_, ()>(keys)
                .await
                .map_err(CacheError::from)?;
        }

        Ok(())
    }

    async fn get_multi(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, CacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed: Vec<String> = keys.iter().map(|k| self.prefixed_key(k)).collect();

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        redis::cmd("MGET")
            .arg(&prefixed)
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::from(e))
    }

    async fn set_multi(&self, entries: Vec<(String, Vec<u8>)>, expiry: u64) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.cmd("SET")
                .arg(self.prefixed_key(&key))
                .arg(value)
                .arg("EX")
                .arg(expiry.max(1))
                .ignore();
        }

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        pipe.query_async::<()>(conn_ref)
            .await
            .map_err(CacheError::from)
    }
}
