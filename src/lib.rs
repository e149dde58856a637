//! # Accio
//!
//! Form security for Rust web applications.
//!
//! Accio bundles the checks every user-facing form needs before its data is
//! trusted: input validation with user-facing messages, HTML sanitization,
//! single-use CSRF tokens and per-key rate limiting with exponential backoff.
//! Each concern lives in its own crate and is re-exported here behind a
//! feature flag.
//!
//! ## Feature Flags
//!
//! ### Presets
//!
//! - `minimal` - Validators, sanitizer, CSRF and rate limiting
//! - `standard` (default) - `minimal` plus settings loading
//! - `full` - `standard` plus the guarded authentication flows
//!
//! ### Fine-grained Control
//!
//! - `validators` - Email, password, URL, file upload and text validation
//! - `security` - Sanitizer and CSRF token manager
//! - `throttling` - Sliding-window rate limiter
//! - `conf` - Settings from TOML/JSON files and `ACCIO_` environment variables
//! - `auth` - [`AuthGuard`](auth::AuthGuard) around an async auth service
//!
//! ## Quick Example
//!
//! ```rust
//! use accio::prelude::*;
//!
//! let verdict = validate_input("ada@example.com", InputKind::Email, &InputRules::required());
//! assert!(verdict.is_valid());
//!
//! let clean = sanitize("<script>alert(1)</script>Hello", &SanitizeOptions::default());
//! assert_eq!(clean, "Hello");
//!
//! let limiter = RateLimiter::new(ThrottleConfig::contact());
//! assert!(limiter.attempt("contact:ada@example.com").allowed);
//! ```

#[cfg(feature = "auth")]
pub mod auth;
#[cfg(feature = "conf")]
pub mod conf;
#[cfg(feature = "security")]
pub mod security;
#[cfg(feature = "throttling")]
pub mod throttling;
#[cfg(feature = "validators")]
pub mod validators;

#[cfg(feature = "conf")]
pub use accio_conf::{SecuritySettings, SettingsError};

/// Types most form handlers need, in one import.
pub mod prelude {
	#[cfg(feature = "auth")]
	pub use accio_auth::{AuthFlowError, AuthGuard, AuthService};
	#[cfg(feature = "conf")]
	pub use accio_conf::SecuritySettings;
	#[cfg(feature = "security")]
	pub use accio_security::{
		CsrfToken, CsrfTokenManager, MemorySessionStorage, SanitizeOptions, SessionStorage,
		sanitize,
	};
	#[cfg(feature = "throttling")]
	pub use accio_throttling::{RateLimitDecision, RateLimiter, ThrottleConfig};
	#[cfg(feature = "validators")]
	pub use accio_validators::{
		InputKind, InputRules, ValidationError, ValidationResult, Validator, validate_input,
	};
}
