//! # Accio Security
//!
//! Output sanitization and CSRF protection for Accio forms.
//!
//! ## Features
//!
//! - Configurable sanitizer: escaping, script stripping, whitespace
//!   normalisation and length limits
//! - XSS pattern detection and log-injection safe formatting
//! - Single-use CSRF tokens stored in session storage
//!
//! ## Example
//!
//! ```
//! use accio_security::{CsrfTokenManager, MemorySessionStorage, SanitizeOptions, sanitize};
//!
//! let clean = sanitize("<script>x()</script>Hello", &SanitizeOptions::default());
//! assert_eq!(clean, "Hello");
//!
//! let csrf = CsrfTokenManager::new(MemorySessionStorage::new());
//! let token = csrf.generate().unwrap();
//! assert!(csrf.consume(token.as_str()));
//! ```

pub mod csrf;
pub mod session;
pub mod xss;

pub use csrf::{
	CSRF_FORM_FIELD, CSRF_HEADER_NAME, CSRF_SESSION_KEY, CSRF_TOKEN_LENGTH, CsrfToken,
	CsrfTokenManager, ThreadRngSource, TokenSource, check_token_format,
};
pub use session::{MemorySessionStorage, SessionStorage};
pub use xss::{
	SanitizeOptions, detect_xss_patterns, escape_html, sanitize, sanitize_default,
	sanitize_log_input, strip_dangerous,
};

use thiserror::Error;

/// Result type for security operations
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Security-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecurityError {
	/// The session store could not be read or written
	#[error("Session storage error: {0}")]
	Storage(String),

	/// A submitted CSRF token is malformed
	#[error("Invalid CSRF token format: {0}")]
	InvalidTokenFormat(String),
}
