use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context::RequestContext;
use crate::dispatcher::{DispatchResult, Handler, Next};
use crate::response::ResponseGuard;

/// Passive request metrics: total count and average latency.
///
/// This middleware never blocks or answers requests, it only observes.
/// Counters are atomics with relaxed ordering, so collection is lock-free
/// and eventually consistent. Clones share the same counters: register one
/// clone as middleware and keep another to read the numbers.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests that passed through this middleware.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.inner.request_count.load(Ordering::Relaxed)
    }

    /// Mean latency of the stack downstream of this middleware.
    /// Zero until the first request completes.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.inner.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.inner.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Handler for Metrics {
    fn handle(&self, _ctx: &RequestContext, _res: &ResponseGuard, next: Next<'_>) -> DispatchResult {
        self.inner.request_count.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let out = next.advance();
        self.inner
            .total_latency_ns
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_requests_means_zero_latency() {
        let metrics = Metrics::new();
        assert_eq!(metrics.request_count(), 0);
        assert_eq!(metrics.average_latency(), Duration::from_nanos(0));
    }
}
