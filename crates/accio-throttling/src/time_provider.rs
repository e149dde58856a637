use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for providing time information to the rate limiter.
/// This allows for time mocking in tests.
pub trait TimeProvider: Send + Sync {
	fn now(&self) -> Instant;
}

/// System time provider that uses the actual monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
	pub fn new() -> Self {
		Self
	}
}

impl TimeProvider for SystemTimeProvider {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// Mock time provider for testing that allows manual time control.
///
/// Clones share the same clock, so a test can keep one handle and hand
/// another to the limiter.
#[derive(Debug, Clone)]
pub struct MockTimeProvider {
	current_time: Arc<RwLock<Instant>>,
}

impl MockTimeProvider {
	pub fn new(start_time: Instant) -> Self {
		Self {
			current_time: Arc::new(RwLock::new(start_time)),
		}
	}

	pub fn advance(&self, duration: Duration) {
		let mut time = self.current_time.write();
		*time += duration;
	}

	pub fn set_time(&self, time: Instant) {
		let mut current = self.current_time.write();
		*current = time;
	}
}

impl Default for MockTimeProvider {
	fn default() -> Self {
		Self::new(Instant::now())
	}
}

impl TimeProvider for MockTimeProvider {
	fn now(&self) -> Instant {
		*self.current_time.read()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_system_time_provider_is_monotonic() {
		// Arrange
		let provider = SystemTimeProvider::new();

		// Act
		let time1 = provider.now();
		std::thread::sleep(Duration::from_millis(5));
		let time2 = provider.now();

		// Assert
		assert!(time2 > time1);
	}

	#[rstest]
	fn test_mock_time_provider_allows_time_control() {
		// Arrange
		let start = Instant::now();
		let provider = MockTimeProvider::new(start);

		// Act & Assert
		assert_eq!(provider.now(), start);

		// Act
		provider.advance(Duration::from_secs(60));

		// Assert
		assert_eq!(provider.now(), start + Duration::from_secs(60));
	}

	#[rstest]
	fn test_mock_time_provider_clones_share_clock() {
		// Arrange
		let provider = MockTimeProvider::default();
		let handle = provider.clone();
		let start = provider.now();

		// Act
		handle.advance(Duration::from_secs(5));

		// Assert
		assert_eq!(provider.now(), start + Duration::from_secs(5));
	}

	#[rstest]
	fn test_mock_time_provider_set_time() {
		// Arrange
		let provider = MockTimeProvider::new(Instant::now());
		let new_time = Instant::now() + Duration::from_secs(100);

		// Act
		provider.set_time(new_time);

		// Assert
		assert_eq!(provider.now(), new_time);
	}
}
