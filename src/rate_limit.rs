//! Per-user admission control for wallet analysis requests.
//!
//! Each caller gets an independent sliding-window rate limiter. The gate is
//! checked exactly once, before resolution begins; a denied request never
//! reaches the data sources. Entries accumulate per distinct caller until
//! [`UserRateLimiter::cleanup_old_entries`] runs, so the map is unbounded
//! between cleanups.

use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Per-user rate limiter keyed by the caller's chat identity.
pub struct UserRateLimiter {
    limiters:
        Arc<RwLock<HashMap<i64, (RateLimiter<NotKeyed, InMemoryState, DefaultClock>, Instant)>>>,
    /// Quota configuration (requests per minute)
    quota: NonZeroU32,
    /// Cleanup interval for old entries
    cleanup_interval: Duration,
}

impl UserRateLimiter {
    /// Create a new per-user rate limiter.
    ///
    /// # Arguments
    /// * `requests_per_minute` - Maximum requests allowed per minute per user
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            quota: NonZeroU32::new(requests_per_minute)
                .unwrap_or_else(|| NonZeroU32::new(10).unwrap()),
            cleanup_interval: Duration::from_secs(300),
        }
    }

    /// Check if a request from the given user is allowed.
    ///
    /// # Returns
    /// * `Ok(())` if the request is admitted
    /// * `Err(wait)` with the duration until the next slot if rate limited
    pub async fn check(&self, user_id: i64) -> Result<(), Duration> {
        let mut limiters = self.limiters.write().await;

        let (limiter, last_access) = limiters.entry(user_id).or_insert_with(|| {
            let quota = Quota::per_minute(self.quota);
            (RateLimiter::direct(quota), Instant::now())
        });

        *last_access = Instant::now();

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                use governor::clock::Clock;
                let now = DefaultClock::default().now();
                Err(not_until.wait_time_from(now))
            }
        }
    }

    /// Drop limiter entries not used since the cleanup interval. Call
    /// periodically to bound the per-caller map.
    pub async fn cleanup_old_entries(&self) {
        let mut limiters = self.limiters.write().await;
        let cutoff = Instant::now() - self.cleanup_interval;

        limiters.retain(|_, (_, last_access)| *last_access > cutoff);

        if !limiters.is_empty() {
            tracing::debug!("Rate limiter cleanup: {} active users", limiters.len());
        }
    }
}
