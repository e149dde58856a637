//! The authentication collaborator behind the forms.

use crate::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	pub id: Uuid,
	pub email: String,
	pub created_at: DateTime<Utc>,
	/// Free-form profile data supplied at sign-up
	pub metadata: Option<serde_json::Value>,
}

/// A signed-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
	pub id: Uuid,
	pub user_id: Uuid,
	pub email: String,
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl AuthSession {
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}
}

/// Normalizes an email address for lookups and rate-limit keys.
///
/// # Examples
///
/// ```
/// use accio_auth::normalize_email;
///
/// assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Authentication service trait
///
/// All operations are asynchronous so implementations can call a remote
/// identity provider or a database.
#[async_trait]
pub trait AuthService: Send + Sync {
	/// Exchange credentials for a session
	async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

	/// Register a new account
	async fn sign_up(
		&self,
		email: &str,
		password: &str,
		metadata: Option<serde_json::Value>,
	) -> Result<User, AuthError>;

	/// End a session
	async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;

	/// Start the password reset flow for `email`.
	///
	/// Implementations should succeed for unknown addresses so the result
	/// does not reveal which accounts exist.
	async fn reset_password(&self, email: &str) -> Result<(), AuthError>;
}
