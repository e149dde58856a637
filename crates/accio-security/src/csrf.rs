//! CSRF (Cross-Site Request Forgery) protection
//!
//! One token per session: [`CsrfTokenManager::generate`] issues it,
//! [`CsrfTokenManager::validate`] compares a submitted value in constant
//! time, and [`CsrfTokenManager::consume`] validates and clears it so the
//! token is single-use.

use crate::session::{MemorySessionStorage, SessionStorage};
use crate::{SecurityError, SecurityResult};
use parking_lot::Mutex;
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;

/// Number of random bytes in a token
pub const CSRF_TOKEN_BYTES: usize = 32;

/// CSRF token length (64 hex characters)
pub const CSRF_TOKEN_LENGTH: usize = CSRF_TOKEN_BYTES * 2;

/// CSRF session key
pub const CSRF_SESSION_KEY: &str = "csrf_token";

/// The header name used to send CSRF tokens in AJAX requests.
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// The form field name for CSRF tokens.
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";

pub const REASON_INCORRECT_LENGTH: &str = "CSRF token has incorrect length.";
pub const REASON_INVALID_CHARACTERS: &str = "CSRF token has invalid characters.";

/// Check that a submitted token has the shape of an issued one
/// (64 lowercase hex characters).
///
/// # Examples
///
/// ```
/// use accio_security::csrf::check_token_format;
///
/// assert!(check_token_format(&"ab".repeat(32)).is_ok());
/// assert!(check_token_format("short").is_err());
/// assert!(check_token_format(&"ZZ".repeat(32)).is_err());
/// ```
pub fn check_token_format(token: &str) -> SecurityResult<()> {
	if token.len() != CSRF_TOKEN_LENGTH {
		return Err(SecurityError::InvalidTokenFormat(
			REASON_INCORRECT_LENGTH.to_string(),
		));
	}

	if !token
		.bytes()
		.all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
	{
		return Err(SecurityError::InvalidTokenFormat(
			REASON_INVALID_CHARACTERS.to_string(),
		));
	}

	Ok(())
}

/// Source of token bytes.
pub trait TokenSource: Send + Sync {
	fn fill_bytes(&self, dest: &mut [u8]);
}

/// Thread-local CSPRNG seeded from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl TokenSource for ThreadRngSource {
	fn fill_bytes(&self, dest: &mut [u8]) {
		rand::rng().fill_bytes(dest);
	}
}

/// An issued CSRF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl AsRef<str> for CsrfToken {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CsrfToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Issues and checks the CSRF token of one session.
///
/// # Examples
///
/// ```
/// use accio_security::csrf::CsrfTokenManager;
/// use accio_security::session::MemorySessionStorage;
///
/// let manager = CsrfTokenManager::new(MemorySessionStorage::new());
/// let token = manager.generate().unwrap();
///
/// assert!(manager.validate(token.as_str()));
/// assert!(manager.consume(token.as_str()));
/// assert!(!manager.consume(token.as_str()));
/// ```
pub struct CsrfTokenManager<S: SessionStorage = MemorySessionStorage, R: TokenSource = ThreadRngSource> {
	storage: S,
	source: R,
	session_key: String,
	// Serializes generate/consume so a token is consumed at most once
	lock: Mutex<()>,
}

impl<S: SessionStorage> CsrfTokenManager<S, ThreadRngSource> {
	pub fn new(storage: S) -> Self {
		Self::with_source(storage, ThreadRngSource)
	}
}

impl<S: SessionStorage, R: TokenSource> CsrfTokenManager<S, R> {
	pub fn with_source(storage: S, source: R) -> Self {
		Self {
			storage,
			source,
			session_key: CSRF_SESSION_KEY.to_string(),
			lock: Mutex::new(()),
		}
	}

	/// Stores the token under `key` instead of [`CSRF_SESSION_KEY`].
	pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
		self.session_key = key.into();
		self
	}

	pub fn session_key(&self) -> &str {
		&self.session_key
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// Issues a fresh token, replacing any previous one.
	pub fn generate(&self) -> SecurityResult<CsrfToken> {
		let _guard = self.lock.lock();
		let mut bytes = [0u8; CSRF_TOKEN_BYTES];
		self.source.fill_bytes(&mut bytes);
		let token = hex::encode(bytes);
		self.storage.set(&self.session_key, token.clone())?;
		Ok(CsrfToken(token))
	}

	/// The currently issued token, if any.
	pub fn current(&self) -> SecurityResult<Option<CsrfToken>> {
		Ok(self.storage.get(&self.session_key)?.map(CsrfToken))
	}

	/// Does `candidate` equal the issued token? Storage failures count as a
	/// mismatch.
	pub fn validate(&self, candidate: &str) -> bool {
		match self.storage.get(&self.session_key) {
			Ok(Some(stored)) => stored.as_bytes().ct_eq(candidate.as_bytes()).into(),
			Ok(None) | Err(_) => false,
		}
	}

	/// Validates `candidate` and, on a match, clears the token.
	///
	/// Returns `false` when the token cannot be cleared, so a token that
	/// might still be stored is never reported as consumed.
	pub fn consume(&self, candidate: &str) -> bool {
		let _guard = self.lock.lock();
		self.validate(candidate) && self.storage.remove(&self.session_key).is_ok()
	}

	/// Forgets the issued token.
	pub fn clear(&self) -> SecurityResult<()> {
		let _guard = self.lock.lock();
		self.storage.remove(&self.session_key)
	}
}

impl<S: SessionStorage, R: TokenSource> fmt::Debug for CsrfTokenManager<S, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CsrfTokenManager")
			.field("session_key", &self.session_key)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::sync::atomic::{AtomicU8, Ordering};

	/// Fills every token with a counter byte that increments per call.
	#[derive(Debug, Default)]
	struct CountingSource(AtomicU8);

	impl TokenSource for CountingSource {
		fn fill_bytes(&self, dest: &mut [u8]) {
			let value = self.0.fetch_add(1, Ordering::SeqCst);
			dest.fill(value);
		}
	}

	struct FailingStorage;

	impl SessionStorage for FailingStorage {
		fn get(&self, _key: &str) -> SecurityResult<Option<String>> {
			Err(SecurityError::Storage("unavailable".to_string()))
		}

		fn set(&self, _key: &str, _value: String) -> SecurityResult<()> {
			Err(SecurityError::Storage("unavailable".to_string()))
		}

		fn remove(&self, _key: &str) -> SecurityResult<()> {
			Err(SecurityError::Storage("unavailable".to_string()))
		}
	}

	#[fixture]
	fn manager() -> CsrfTokenManager<MemorySessionStorage, CountingSource> {
		CsrfTokenManager::with_source(MemorySessionStorage::new(), CountingSource::default())
	}

	#[rstest]
	fn test_generate_stores_hex_token(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Act
		let token = manager.generate().unwrap();

		// Assert
		assert_eq!(token.as_str(), "00".repeat(CSRF_TOKEN_BYTES));
		assert!(check_token_format(token.as_str()).is_ok());
		assert_eq!(
			manager.storage().get(CSRF_SESSION_KEY).unwrap().as_deref(),
			Some(token.as_str())
		);
	}

	#[rstest]
	fn test_validate_without_token(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Assert
		assert!(!manager.validate(&"00".repeat(CSRF_TOKEN_BYTES)));
		assert!(!manager.validate(""));
	}

	#[rstest]
	fn test_validate_does_not_clear(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Arrange
		let token = manager.generate().unwrap();

		// Act & Assert
		assert!(manager.validate(token.as_str()));
		assert!(manager.validate(token.as_str()));
		assert_eq!(manager.current().unwrap(), Some(token));
	}

	#[rstest]
	fn test_validate_rejects_other_values(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Arrange
		let token = manager.generate().unwrap();
		let prefix = &token.as_str()[..CSRF_TOKEN_LENGTH - 1];

		// Assert
		assert!(!manager.validate(prefix));
		assert!(!manager.validate(&"11".repeat(CSRF_TOKEN_BYTES)));
		assert!(!manager.validate(&token.as_str().to_uppercase().replace('0', "A")));
	}

	#[rstest]
	fn test_consume_is_single_use(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Arrange
		let token = manager.generate().unwrap();

		// Act
		let first = manager.consume(token.as_str());
		let second = manager.consume(token.as_str());

		// Assert
		assert!(first);
		assert!(!second);
		assert_eq!(manager.current().unwrap(), None);
	}

	#[rstest]
	fn test_consume_mismatch_keeps_token(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Arrange
		let token = manager.generate().unwrap();

		// Act
		let consumed = manager.consume("wrong");

		// Assert
		assert!(!consumed);
		assert!(manager.validate(token.as_str()));
	}

	#[rstest]
	fn test_regenerate_replaces_token(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Arrange
		let old = manager.generate().unwrap();

		// Act
		let new = manager.generate().unwrap();

		// Assert
		assert_ne!(old, new);
		assert!(!manager.validate(old.as_str()));
		assert!(manager.validate(new.as_str()));
	}

	#[rstest]
	fn test_clear_forgets_token(manager: CsrfTokenManager<MemorySessionStorage, CountingSource>) {
		// Arrange
		let token = manager.generate().unwrap();

		// Act
		manager.clear().unwrap();

		// Assert
		assert!(!manager.validate(token.as_str()));
	}

	#[rstest]
	fn test_custom_session_key() {
		// Arrange
		let storage = MemorySessionStorage::new();
		let manager = CsrfTokenManager::new(storage.clone()).with_session_key("_csrf");

		// Act
		let token = manager.generate().unwrap();

		// Assert
		assert_eq!(storage.get("_csrf").unwrap(), Some(token.into_inner()));
		assert_eq!(storage.get(CSRF_SESSION_KEY).unwrap(), None);
	}

	#[rstest]
	fn test_storage_failures() {
		// Arrange
		let manager = CsrfTokenManager::new(FailingStorage);

		// Act & Assert
		assert!(matches!(manager.generate(), Err(SecurityError::Storage(_))));
		assert!(!manager.validate(&"00".repeat(CSRF_TOKEN_BYTES)));
		assert!(!manager.consume(&"00".repeat(CSRF_TOKEN_BYTES)));
	}

	#[rstest]
	fn test_thread_rng_tokens_differ() {
		// Arrange
		let manager = CsrfTokenManager::new(MemorySessionStorage::new());

		// Act
		let a = manager.generate().unwrap();
		let b = manager.generate().unwrap();

		// Assert
		assert_ne!(a, b);
		assert!(check_token_format(a.as_str()).is_ok());
	}

	#[rstest]
	#[case(&"a".repeat(63), REASON_INCORRECT_LENGTH)]
	#[case(&"A".repeat(64), REASON_INVALID_CHARACTERS)]
	#[case(&"g".repeat(64), REASON_INVALID_CHARACTERS)]
	fn test_check_token_format_reasons(#[case] token: &str, #[case] reason: &str) {
		// Assert
		assert_eq!(
			check_token_format(token),
			Err(SecurityError::InvalidTokenFormat(reason.to_string()))
		);
	}
}
