//! Request rate limiting shared by every request of one client.

use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::config::RateLimit;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token bucket granting at most `max_requests` permits per `period`.
///
/// Permits are spread evenly over the period, so back-to-back requests are
/// spaced by `period / max_requests`. Cloning shares the same bucket.
#[derive(Clone)]
pub struct Limiter {
    inner: Arc<DirectRateLimiter>,
    rate: RateLimit,
}

impl Limiter {
    pub fn new(rate: RateLimit) -> Self {
        // `replenish_interval` is non-zero: the period is at least one second
        // and `max_requests` fits in a u32.
        let quota = Quota::with_period(rate.replenish_interval())
            .unwrap_or_else(|| Quota::per_second(rate.max_requests));

        Self {
            inner: Arc::new(RateLimiter::direct(quota)),
            rate,
        }
    }

    /// Wait until a permit is available, then consume it.
    pub async fn acquire(&self) {
        if self.inner.check().is_err() {
            tracing::debug!("Rate limit of {} reached, waiting", self.rate);
            self.inner.until_ready().await;
        }
    }

    pub fn rate(&self) -> RateLimit {
        self.rate
    }
}

impl std::fmt::Debug for Limiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Limiter").field("rate", &self.rate).finish()
    }
}
