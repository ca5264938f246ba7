use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fixed-window request counter per client
///
/// Each client's counter lives in a `moka` cache entry whose time-to-live is
/// the window length, so the window starts at the client's first request and
/// the count resets when the entry expires.
pub struct RateLimiter {
    counters: moka::future::Cache<String, Arc<AtomicU32>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, max_clients: u64) -> Self {
        let counters = moka::future::CacheBuilder::new(max_clients)
            .time_to_live(window)
            .build();

        Self {
            counters,
            max_requests,
            window,
        }
    }

    /// Count a request; `false` once the client has used up its window
    pub async fn check(&self, client: &str) -> bool {
        let counter = self
            .counters
            .get_with(client.to_string(), async { Arc::new(AtomicU32::new(0)) })
            .await;

        let used = counter.fetch_add(1, Ordering::Relaxed) + 1;
        used <= self.max_requests
    }

    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }
}
