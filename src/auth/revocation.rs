use moka::future::Cache;
use std::time::Duration;

/// Refresh token ids that were rotated or logged out. Entries expire with the
/// tokens themselves, so the cache never outgrows the live token set.
#[derive(Clone)]
pub struct RevokedTokens {
    cache: Cache<String, ()>,
}

impl RevokedTokens {
    pub fn new(refresh_ttl_secs: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(500_000) // tune based on memory
                .time_to_live(Duration::from_secs(refresh_ttl_secs.max(1)))
                .build(),
        }
    }

    pub async fn revoke(&self, jti: &str) {
        self.cache.insert(jti.to_string(), ()).await;
    }

    /// Revokes `jti` and reports whether this call was the one that did it.
    /// Check and insert are one cache operation, so of several concurrent
    /// callers with the same id exactly one sees `true`.
    pub async fn revoke_once(&self, jti: &str) -> bool {
        self.cache.entry(jti.to_string()).or_insert(()).await.is_fresh()
    }
}
