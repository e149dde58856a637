use crate::backend::{AttemptRecord, MemoryBackend};
use crate::time_provider::{SystemTimeProvider, TimeProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Largest backoff exponent; keeps `2^n` well inside `u32`.
const MAX_BACKOFF_EXPONENT: u32 = 20;

/// Hard ceiling for a single backoff period, whatever the configuration says
pub const BACKOFF_CEILING: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Rate limit policy for one kind of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
	/// Attempts allowed per window
	pub max_attempts: u32,
	/// Length of the window, measured from the last attempt
	pub window: Duration,
	/// Whether violations impose an exponentially growing backoff
	pub backoff: bool,
	/// Backoff imposed on the first violation
	pub backoff_base: Duration,
	/// Upper bound for a single backoff period
	pub max_backoff: Duration,
}

impl ThrottleConfig {
	/// Creates a policy without backoff.
	///
	/// # Examples
	///
	/// ```
	/// use accio_throttling::ThrottleConfig;
	/// use std::time::Duration;
	///
	/// let config = ThrottleConfig::new(10, Duration::from_secs(30));
	/// assert_eq!(config.max_attempts, 10);
	/// assert!(!config.backoff);
	/// ```
	pub fn new(max_attempts: u32, window: Duration) -> Self {
		Self {
			max_attempts,
			window,
			backoff: false,
			backoff_base: Duration::from_secs(60),
			max_backoff: Duration::from_secs(24 * 60 * 60),
		}
	}

	/// Sign-in and password reset: 5 attempts per minute, with backoff.
	pub fn auth() -> Self {
		Self::new(5, Duration::from_secs(60)).with_backoff(true)
	}

	/// Contact form submissions: 3 per five minutes.
	pub fn contact() -> Self {
		Self::new(3, Duration::from_secs(300))
	}

	/// Search queries: 60 per minute.
	pub fn search() -> Self {
		Self::new(60, Duration::from_secs(60))
	}

	pub fn with_backoff(mut self, enabled: bool) -> Self {
		self.backoff = enabled;
		self
	}

	pub fn with_backoff_base(mut self, base: Duration) -> Self {
		self.backoff_base = base;
		self
	}

	pub fn with_max_backoff(mut self, max: Duration) -> Self {
		self.max_backoff = max;
		self
	}

	/// Backoff for the `violations`-th violation (0-based): `base * 2^violations`,
	/// capped at `max_backoff` and at [`BACKOFF_CEILING`].
	///
	/// # Examples
	///
	/// ```
	/// use accio_throttling::ThrottleConfig;
	/// use std::time::Duration;
	///
	/// let config = ThrottleConfig::auth();
	/// assert_eq!(config.backoff_for(0), Duration::from_secs(60));
	/// assert_eq!(config.backoff_for(3), Duration::from_secs(480));
	/// ```
	pub fn backoff_for(&self, violations: u32) -> Duration {
		let factor = 1u32 << violations.min(MAX_BACKOFF_EXPONENT);
		self.backoff_base
			.saturating_mul(factor)
			.min(self.max_backoff)
			.min(BACKOFF_CEILING)
	}
}

impl Default for ThrottleConfig {
	fn default() -> Self {
		Self::auth()
	}
}

/// Outcome of an attempt (or of a dry-run check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
	/// Whether the action may proceed
	pub allowed: bool,
	/// Attempts left in the current window after this one
	pub remaining: u32,
	/// Time until the record resets to fresh, if there is a live record
	pub reset_after: Option<Duration>,
	/// Remaining backoff, if a backoff is in force
	pub backoff_remaining: Option<Duration>,
}

impl RateLimitDecision {
	/// How long the caller should wait before trying again; `None` when allowed.
	pub fn retry_after(&self) -> Option<Duration> {
		if self.allowed {
			return None;
		}
		self.backoff_remaining.or(self.reset_after)
	}
}

/// In-memory, per-key sliding-window rate limiter.
///
/// State machine per key: no record (fresh), active while the count is below
/// `max_attempts`, blocked once it reaches it. With backoff enabled each
/// violation sets a deadline of `backoff_base * 2^(count - max_attempts)`;
/// attempts before that deadline are rejected without touching the record.
/// Once the window since the last attempt has elapsed and no backoff is live
/// the record starts over.
///
/// Check and record happen under one lock, so concurrent callers for the same
/// key cannot both observe "allowed" for the last free slot.
///
/// # Examples
///
/// ```
/// use accio_throttling::{RateLimiter, ThrottleConfig};
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(ThrottleConfig::new(2, Duration::from_secs(60)));
/// assert!(limiter.can_attempt("k"));
/// assert!(limiter.can_attempt("k"));
/// assert!(!limiter.can_attempt("k"));
/// ```
pub struct RateLimiter<T: TimeProvider = SystemTimeProvider> {
	config: ThrottleConfig,
	backend: Mutex<MemoryBackend>,
	time_provider: Arc<T>,
}

impl RateLimiter<SystemTimeProvider> {
	/// Creates a limiter driven by the system clock.
	pub fn new(config: ThrottleConfig) -> Self {
		Self::with_time_provider(config, Arc::new(SystemTimeProvider::new()))
	}
}

impl<T: TimeProvider> RateLimiter<T> {
	/// Create a new limiter with a custom time provider
	pub fn with_time_provider(config: ThrottleConfig, time_provider: Arc<T>) -> Self {
		Self {
			config,
			backend: Mutex::new(MemoryBackend::new()),
			time_provider,
		}
	}

	pub fn config(&self) -> &ThrottleConfig {
		&self.config
	}

	/// Checks and records one attempt for `key`, returning only whether it is
	/// allowed.
	pub fn can_attempt(&self, key: &str) -> bool {
		self.attempt(key).allowed
	}

	/// Checks and records one attempt for `key` atomically.
	pub fn attempt(&self, key: &str) -> RateLimitDecision {
		let now = self.time_provider.now();
		let mut backend = self.backend.lock();
		backend.maybe_evict_expired(now, self.config.window);

		let mut slot = backend.get(key).copied();
		let decision = self.apply(&mut slot, now);
		match slot {
			Some(record) => backend.insert(key, record),
			None => {
				backend.remove(key);
			}
		}
		decision
	}

	/// Reports what [`attempt`](Self::attempt) would decide, without recording.
	pub fn check(&self, key: &str) -> RateLimitDecision {
		let now = self.time_provider.now();
		let backend = self.backend.lock();
		let mut slot = backend.get(key).copied();
		self.apply(&mut slot, now)
	}

	/// Records an attempt for callers that check separately.
	///
	/// Identical in effect to [`attempt`](Self::attempt); attempts made while a
	/// backoff is live are not counted.
	pub fn record_attempt(&self, key: &str) {
		let _ = self.attempt(key);
	}

	/// Attempts left for `key` in its current window.
	pub fn remaining_attempts(&self, key: &str) -> u32 {
		let now = self.time_provider.now();
		let backend = self.backend.lock();
		match backend.get(key) {
			Some(record) if record.backoff_remaining(now).is_some() => 0,
			Some(record) if !record.is_expired(now, self.config.window) => self
				.config
				.max_attempts
				.saturating_sub(record.attempt_count),
			_ => self.config.max_attempts,
		}
	}

	/// Time until `key` starts over as fresh, or `None` when it already is.
	pub fn time_until_reset(&self, key: &str) -> Option<Duration> {
		let now = self.time_provider.now();
		let backend = self.backend.lock();
		backend
			.get(key)
			.and_then(|record| self.reset_after(record, now))
	}

	/// Current record for `key`, if any.
	pub fn record(&self, key: &str) -> Option<AttemptRecord> {
		self.backend.lock().get(key).copied()
	}

	/// Unconditionally clears the record for `key`.
	pub fn reset(&self, key: &str) {
		self.backend.lock().remove(key);
	}

	/// Clears every record.
	pub fn clear(&self) {
		self.backend.lock().clear();
	}

	/// Removes expired records now and returns how many were dropped.
	pub fn sweep_expired(&self) -> usize {
		let now = self.time_provider.now();
		self.backend
			.lock()
			.evict_expired(now, self.config.window)
	}

	/// Number of keys currently holding a record.
	pub fn tracked_keys(&self) -> usize {
		self.backend.lock().len()
	}

	fn reset_after(&self, record: &AttemptRecord, now: Instant) -> Option<Duration> {
		let window = record.window_remaining(now, self.config.window);
		let backoff = record.backoff_remaining(now);
		match (window, backoff) {
			(Some(w), Some(b)) => Some(w.max(b)),
			(w, b) => w.or(b),
		}
	}

	/// Runs the state machine for one attempt against `slot`.
	fn apply(&self, slot: &mut Option<AttemptRecord>, now: Instant) -> RateLimitDecision {
		let config = &self.config;

		if let Some(record) = slot.as_ref() {
			if let Some(backoff) = record.backoff_remaining(now) {
				return RateLimitDecision {
					allowed: false,
					remaining: 0,
					reset_after: self.reset_after(record, now),
					backoff_remaining: Some(backoff),
				};
			}
			if record.is_expired(now, config.window) {
				*slot = None;
			}
		}

		let record = slot.get_or_insert_with(|| AttemptRecord::fresh(now));

		if record.attempt_count < config.max_attempts {
			record.attempt_count += 1;
			record.last_attempt = now;
			return RateLimitDecision {
				allowed: true,
				remaining: config.max_attempts - record.attempt_count,
				reset_after: Some(config.window),
				backoff_remaining: None,
			};
		}

		let backoff = config.backoff.then(|| {
			let delay = config.backoff_for(record.attempt_count - config.max_attempts);
			record.backoff_until = Some(now.checked_add(delay).unwrap_or(now));
			delay
		});
		record.attempt_count = record.attempt_count.saturating_add(1);
		record.last_attempt = now;

		RateLimitDecision {
			allowed: false,
			remaining: 0,
			reset_after: Some(backoff.map_or(config.window, |b| b.max(config.window))),
			backoff_remaining: backoff,
		}
	}
}
