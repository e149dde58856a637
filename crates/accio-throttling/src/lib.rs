//! # Accio Throttling
//!
//! In-memory rate limiting for repeated user actions (sign-in attempts,
//! contact form submissions, search queries), keyed by an opaque identifier.
//!
//! ## Features
//!
//! - Sliding window measured from the last attempt
//! - Optional exponential backoff after the limit is exceeded
//! - Atomic check-and-record, safe to share across threads
//! - Periodic eviction of expired records
//! - Injectable clock for deterministic tests
//!
//! ## Example
//!
//! ```
//! use accio_throttling::{RateLimiter, ThrottleConfig};
//!
//! let limiter = RateLimiter::new(ThrottleConfig::contact());
//! let decision = limiter.attempt("contact:visitor-1");
//! assert!(decision.allowed);
//! assert_eq!(decision.remaining, 2);
//! ```

pub mod backend;
pub mod key_validation;
pub mod limiter;
pub mod time_provider;

pub use backend::AttemptRecord;
pub use key_validation::{scoped_key, validate_key_component, validate_scope};
pub use limiter::{BACKOFF_CEILING, RateLimitDecision, RateLimiter, ThrottleConfig};
pub use time_provider::{MockTimeProvider, SystemTimeProvider, TimeProvider};

use thiserror::Error;

/// Result type for throttling operations
pub type ThrottleResult<T> = Result<T, ThrottleError>;

/// Throttling errors.
///
/// Being over the limit is not an error; it is reported through
/// [`RateLimitDecision`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThrottleError {
	/// A rate-limit key component was rejected
	#[error("Invalid rate limit key: {0}")]
	InvalidKey(String),
}
