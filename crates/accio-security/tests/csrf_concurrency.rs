//! CSRF token manager shared across threads.

use accio_security::{CsrfTokenManager, MemorySessionStorage};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[rstest]
fn test_token_is_consumed_exactly_once() {
	// Arrange
	let manager = Arc::new(CsrfTokenManager::new(MemorySessionStorage::new()));
	let token = manager.generate().unwrap();
	let successes = Arc::new(AtomicUsize::new(0));

	// Act
	let handles: Vec<_> = (0..16)
		.map(|_| {
			let manager = Arc::clone(&manager);
			let successes = Arc::clone(&successes);
			let token = token.clone();
			thread::spawn(move || {
				if manager.consume(token.as_str()) {
					successes.fetch_add(1, Ordering::SeqCst);
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}

	// Assert
	assert_eq!(successes.load(Ordering::SeqCst), 1);
	assert_eq!(manager.current().unwrap(), None);
}

#[rstest]
fn test_sessions_are_isolated() {
	// Arrange
	let alice = CsrfTokenManager::new(MemorySessionStorage::new());
	let bob = CsrfTokenManager::new(MemorySessionStorage::new());

	// Act
	let alice_token = alice.generate().unwrap();

	// Assert
	assert!(!bob.validate(alice_token.as_str()));
	assert!(alice.validate(alice_token.as_str()));
}
