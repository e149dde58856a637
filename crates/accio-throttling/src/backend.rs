use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-key attempt state kept by the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
	/// Attempts counted since the record was (re)started, including denied ones
	pub attempt_count: u32,
	/// Time of the most recent counted attempt; the window slides from here
	pub last_attempt: Instant,
	/// Deadline of the current backoff, if one was imposed
	pub backoff_until: Option<Instant>,
}

impl AttemptRecord {
	pub(crate) fn fresh(now: Instant) -> Self {
		Self {
			attempt_count: 0,
			last_attempt: now,
			backoff_until: None,
		}
	}

	/// Remaining backoff at `now`, or `None` when no backoff is live.
	pub fn backoff_remaining(&self, now: Instant) -> Option<Duration> {
		self.backoff_until
			.filter(|until| *until > now)
			.map(|until| until.duration_since(now))
	}

	/// Remaining window at `now`, measured from the last attempt.
	pub fn window_remaining(&self, now: Instant, window: Duration) -> Option<Duration> {
		let elapsed = now.saturating_duration_since(self.last_attempt);
		window.checked_sub(elapsed).filter(|d| !d.is_zero())
	}

	/// A record is expired once its window has elapsed and no backoff is live.
	pub fn is_expired(&self, now: Instant, window: Duration) -> bool {
		self.backoff_remaining(now).is_none() && self.window_remaining(now, window).is_none()
	}
}

/// Probabilistic eviction runs roughly once per this many attempt operations.
pub(crate) const EVICTION_INTERVAL: u64 = 100;

/// In-memory storage for attempt records.
///
/// Not synchronised on its own; the limiter keeps it behind a mutex so that
/// check and record happen under one lock.
#[derive(Debug, Default)]
pub(crate) struct MemoryBackend {
	records: HashMap<String, AttemptRecord>,
	/// Counter for eviction scheduling
	ops_counter: u64,
}

impl MemoryBackend {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn get(&self, key: &str) -> Option<&AttemptRecord> {
		self.records.get(key)
	}

	pub(crate) fn insert(&mut self, key: &str, record: AttemptRecord) {
		self.records.insert(key.to_string(), record);
	}

	pub(crate) fn remove(&mut self, key: &str) -> Option<AttemptRecord> {
		self.records.remove(key)
	}

	pub(crate) fn clear(&mut self) {
		self.records.clear();
	}

	pub(crate) fn len(&self) -> usize {
		self.records.len()
	}

	/// Evict expired entries from the storage map.
	///
	/// Called on every attempt to bound memory growth; only every
	/// [`EVICTION_INTERVAL`]th call actually scans the map.
	pub(crate) fn maybe_evict_expired(&mut self, now: Instant, window: Duration) {
		let count = self.ops_counter;
		self.ops_counter = self.ops_counter.wrapping_add(1);
		if count % EVICTION_INTERVAL != 0 {
			return;
		}
		self.evict_expired(now, window);
	}

	/// Removes every expired record and returns how many were dropped.
	pub(crate) fn evict_expired(&mut self, now: Instant, window: Duration) -> usize {
		let before = self.records.len();
		self.records
			.retain(|_, record| !record.is_expired(now, window));
		before - self.records.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_fresh_record_is_expired_after_window() {
		// Arrange
		let start = Instant::now();
		let record = AttemptRecord::fresh(start);
		let window = Duration::from_secs(60);

		// Act & Assert
		assert!(!record.is_expired(start + Duration::from_secs(30), window));
		assert!(record.is_expired(start + Duration::from_secs(60), window));
	}

	#[rstest]
	fn test_live_backoff_keeps_record_alive() {
		// Arrange
		let start = Instant::now();
		let mut record = AttemptRecord::fresh(start);
		record.backoff_until = Some(start + Duration::from_secs(120));
		let window = Duration::from_secs(60);

		// Act
		let at = start + Duration::from_secs(90);

		// Assert
		assert!(!record.is_expired(at, window));
		assert_eq!(record.backoff_remaining(at), Some(Duration::from_secs(30)));
	}

	#[rstest]
	fn test_window_remaining_counts_from_last_attempt() {
		// Arrange
		let start = Instant::now();
		let record = AttemptRecord::fresh(start);

		// Act
		let remaining = record.window_remaining(start + Duration::from_secs(20), Duration::from_secs(60));

		// Assert
		assert_eq!(remaining, Some(Duration::from_secs(40)));
	}

	#[rstest]
	fn test_evict_expired_drops_only_stale_records() {
		// Arrange
		let start = Instant::now();
		let window = Duration::from_secs(10);
		let mut backend = MemoryBackend::new();
		backend.insert("stale", AttemptRecord::fresh(start));
		backend.insert(
			"recent",
			AttemptRecord::fresh(start + Duration::from_secs(15)),
		);

		// Act
		let evicted = backend.evict_expired(start + Duration::from_secs(20), window);

		// Assert
		assert_eq!(evicted, 1);
		assert!(backend.get("stale").is_none());
		assert!(backend.get("recent").is_some());
	}

	#[rstest]
	fn test_maybe_evict_runs_on_interval() {
		// Arrange
		let start = Instant::now();
		let window = Duration::from_secs(1);
		let mut backend = MemoryBackend::new();
		// First call (counter 0) sweeps immediately
		backend.maybe_evict_expired(start, window);
		backend.insert("stale", AttemptRecord::fresh(start));
		let later = start + Duration::from_secs(5);

		// Act - calls 1..EVICTION_INTERVAL-1 do not sweep
		for _ in 1..EVICTION_INTERVAL {
			backend.maybe_evict_expired(later, window);
		}
		assert_eq!(backend.len(), 1);
		backend.maybe_evict_expired(later, window);

		// Assert
		assert_eq!(backend.len(), 0);
	}
}
