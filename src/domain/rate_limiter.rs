//! Fixed-window request admission control keyed by client identity.
//!
//! Each client gets a counter that resets at the end of its own window. This
//! is O(1) per key in both time and memory, at the cost of letting up to
//! `2 × rate_limit` requests through when a burst straddles a window reset.
//!
//! All state lives behind a single mutex. Every decision is therefore
//! linearized, per key and globally; sharding the map by key hash would raise
//! throughput without changing what callers observe.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Used for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-client counter for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientWindow {
    /// Requests admitted since `window_start`.
    pub count: u32,
    pub window_start: Instant,
}

/// Fixed-window rate limiter.
///
/// Built once from configuration and shared by `Arc`. Pair it with
/// [`run_cleanup`] so idle clients do not accumulate.
///
/// # Examples
///
/// ```ignore
/// let limiter = RateLimiter::new(60, Duration::from_secs(60));
///
/// assert!(limiter.allow("203.0.113.7"));
/// ```
pub struct RateLimiter {
    clients: Mutex<HashMap<String, ClientWindow>>,
    rate_limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter admitting `rate_limit` requests per `window` per key.
    pub fn new(rate_limit: u32, window: Duration) -> Self {
        Self::with_clock(rate_limit, window, Arc::new(SystemClock))
    }

    /// Creates a limiter reading time from `clock`.
    pub fn with_clock(rate_limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            rate_limit,
            window,
            clock,
        }
    }

    pub fn rate_limit(&self) -> u32 {
        self.rate_limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decides whether `key` may act now, updating its window in the same
    /// critical section.
    ///
    /// - unseen key: new window with `count = 1`, admitted
    /// - window expired: reset to `count = 1`, admitted
    /// - `count < rate_limit`: incremented, admitted
    /// - otherwise: denied, state untouched
    ///
    /// Any string is a valid key, the empty string included.
    pub fn allow(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut clients = self.clients();

        let Some(window) = clients.get_mut(key) else {
            clients.insert(
                key.to_string(),
                ClientWindow {
                    count: 1,
                    window_start: now,
                },
            );
            return true;
        };

        if now.saturating_duration_since(window.window_start) > self.window {
            window.count = 1;
            window.window_start = now;
            return true;
        }

        if window.count < self.rate_limit {
            window.count += 1;
            return true;
        }

        false
    }

    /// Drops every window idle for longer than one window length and returns
    /// how many were removed. Windows still in their active period stay.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut clients = self.clients();

        let before = clients.len();
        clients.retain(|_, window| now.saturating_duration_since(window.window_start) <= self.window);

        before - clients.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.clients().len()
    }

    /// Snapshot of the window for `key`, if tracked.
    pub fn window_for(&self, key: &str) -> Option<ClientWindow> {
        self.clients().get(key).copied()
    }

    // A panic while holding the lock cannot leave a window half-updated, so
    // poisoning is ignored.
    fn clients(&self) -> MutexGuard<'_, HashMap<String, ClientWindow>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodically evicts idle windows until `shutdown` flips to `true` or its
/// sender is dropped.
///
/// Ticks once per window length; the first sweep happens one window after
/// start.
pub async fn run_cleanup(limiter: Arc<RateLimiter>, mut shutdown: watch::Receiver<bool>) {
    let period = limiter.window();
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = limiter.cleanup();
                if removed > 0 {
                    debug!(removed, remaining = limiter.tracked_clients(), "Evicted idle rate limit windows");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Rate limit cleanup stopped");
}
