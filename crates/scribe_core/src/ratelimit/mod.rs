//! Sliding-window rate limiting for outbound API calls.
//!
//! Admission is based on the count of calls within the trailing window,
//! continuously re-evaluated, rather than a fixed-interval bucket. All
//! state lives in one lock-protected ordered collection of timestamps,
//! so concurrent callers can never jointly exceed the limit.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window admission control.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    /// Timestamps of admitted calls, oldest first.
    requests: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` per trailing `window`.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Mutex::new(VecDeque::new()),
        }
    }

    /// The admission cap per window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// The trailing window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check admission, recording the call if admitted.
    ///
    /// Returns `(true, ZERO)` when admitted. When refused, returns
    /// `(false, wait)` where `wait` is the time until the oldest
    /// in-window call expires, always in `(0, window]`. Prune, check,
    /// and record happen under one lock acquisition.
    pub fn can_proceed(&self) -> (bool, Duration) {
        let now = Instant::now();
        let mut requests = self.requests.lock();

        Self::prune(&mut requests, now, self.window);

        if requests.len() < self.max_requests {
            requests.push_back(now);
            return (true, Duration::ZERO);
        }

        let wait = match requests.front() {
            Some(&oldest) => self.window.saturating_sub(now.duration_since(oldest)),
            None => Duration::ZERO,
        };
        (false, wait)
    }

    /// Block until a slot frees up, then claim it.
    ///
    /// Returns the total time waited (zero if admitted immediately).
    /// After sleeping, admission is retried once; the window has advanced
    /// past the oldest entry by then.
    pub fn wait_if_needed(&self) -> Duration {
        let (admitted, wait) = self.can_proceed();
        if admitted {
            return Duration::ZERO;
        }

        tracing::debug!("Rate limit reached, waiting {:.2}s", wait.as_secs_f64());
        std::thread::sleep(wait);
        self.can_proceed();
        wait
    }

    /// Async counterpart of [`wait_if_needed`](Self::wait_if_needed).
    ///
    /// Suspends instead of blocking a runtime thread.
    pub async fn wait_if_needed_async(&self) -> Duration {
        let (admitted, wait) = self.can_proceed();
        if admitted {
            return Duration::ZERO;
        }

        tracing::debug!("Rate limit reached, waiting {:.2}s", wait.as_secs_f64());
        tokio::time::sleep(wait).await;
        self.can_proceed();
        wait
    }

    /// Number of admissions currently inside the window.
    pub fn get_current_count(&self) -> usize {
        let now = Instant::now();
        let mut requests = self.requests.lock();
        Self::prune(&mut requests, now, self.window);
        requests.len()
    }

    /// `(used, available)` slot counts; `available` is never negative.
    pub fn get_availability(&self) -> (usize, usize) {
        let used = self.get_current_count();
        (used, self.max_requests.saturating_sub(used))
    }

    /// Forget all recorded admissions.
    pub fn reset(&self) {
        self.requests.lock().clear();
    }

    fn prune(requests: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&front) = requests.front() {
            if now.duration_since(front) >= window {
                requests.pop_front();
            } else {
                break;
            }
        }
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (used, available) = self.get_availability();
        write!(
            f,
            "RateLimiter(max={}, window={}s, used={}, available={})",
            self.max_requests,
            self.window.as_secs_f64(),
            used,
            available
        )
    }
}
