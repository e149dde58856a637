//! # Accio Auth
//!
//! Authentication glue for Accio forms: an asynchronous [`AuthService`]
//! collaborator, an in-memory implementation with Argon2id password
//! hashes, and [`AuthGuard`], which runs CSRF, validation and throttling
//! checks before any credential reaches the service.
//!
//! ## Example
//!
//! ```
//! use accio_auth::{Argon2Hasher, AuthGuard, InMemoryAuthService, SignUpForm};
//! use accio_security::MemorySessionStorage;
//!
//! # tokio_test::block_on(async {
//! let service = InMemoryAuthService::with_hasher(Argon2Hasher::with_params(1024, 1, 1).unwrap());
//! let guard = AuthGuard::new(service, MemorySessionStorage::new());
//!
//! let token = guard.issue_csrf_token().unwrap();
//! let user = guard
//!     .sign_up(&SignUpForm {
//!         email: "ada@example.com".to_string(),
//!         password: "Str0ng!Pass".to_string(),
//!         csrf_token: token.into_inner(),
//!         metadata: None,
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(user.email, "ada@example.com");
//! # });
//! ```

pub mod guard;
pub mod hasher;
pub mod memory;
pub mod service;

pub use guard::{AuthGuard, PasswordResetForm, SignInForm, SignUpForm};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use memory::{InMemoryAuthService, MAX_RESET_REQUESTS};
pub use service::{AuthService, AuthSession, User, normalize_email};

use accio_validators::ValidationResult;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by an [`AuthService`]
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("Invalid email or password")]
	InvalidCredentials,

	#[error("An account with this email already exists")]
	UserAlreadyExists,

	#[error("Session not found")]
	SessionNotFound,

	#[error("Password hashing failed: {0}")]
	Hashing(String),

	#[error("Authentication backend error: {0}")]
	Backend(String),
}

/// Why a guarded form submission was refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFlowError {
	#[error("Invalid or expired form token, please reload the page")]
	Csrf,

	#[error("Validation failed: {}", .0.messages().join("; "))]
	Validation(ValidationResult),

	#[error("Too many attempts, please try again later")]
	RateLimited { retry_after: Option<Duration> },

	#[error(transparent)]
	Service(#[from] AuthError),
}
