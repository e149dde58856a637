//! In-memory authentication service.

use crate::hasher::{Argon2Hasher, PasswordHasher};
use crate::service::{AuthService, AuthSession, User, normalize_email};
use crate::AuthError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;
use uuid::Uuid;

/// Default lifetime of a session
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Pending reset requests kept before the oldest are dropped
pub const MAX_RESET_REQUESTS: usize = 1024;

const DUMMY_PASSWORD: &str = "accio-unknown-account";

#[derive(Debug, Clone)]
struct StoredUser {
	user: User,
	password_hash: String,
}

/// Keeps accounts and sessions in process memory.
///
/// Suitable for tests and single-process deployments.
#[derive(Debug)]
pub struct InMemoryAuthService<H: PasswordHasher = Argon2Hasher> {
	hasher: H,
	session_ttl: Duration,
	users: RwLock<HashMap<String, StoredUser>>,
	sessions: RwLock<HashMap<Uuid, AuthSession>>,
	reset_requests: RwLock<VecDeque<String>>,
	dummy_hash: OnceLock<String>,
}

impl InMemoryAuthService<Argon2Hasher> {
	pub fn new() -> Self {
		Self::with_hasher(Argon2Hasher::new())
	}
}

impl Default for InMemoryAuthService<Argon2Hasher> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H: PasswordHasher> InMemoryAuthService<H> {
	pub fn with_hasher(hasher: H) -> Self {
		Self {
			hasher,
			session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
			users: RwLock::new(HashMap::new()),
			sessions: RwLock::new(HashMap::new()),
			reset_requests: RwLock::new(VecDeque::new()),
			dummy_hash: OnceLock::new(),
		}
	}

	pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
		self.session_ttl = ttl;
		self
	}

	pub fn user_count(&self) -> usize {
		self.users.read().len()
	}

	/// Sessions currently held, expired ones included until the next sign-in.
	pub fn session_count(&self) -> usize {
		self.sessions.read().len()
	}

	/// Is `session` known and not yet expired?
	pub fn is_session_active(&self, session_id: Uuid) -> bool {
		self.sessions
			.read()
			.get(&session_id)
			.is_some_and(|s| !s.is_expired_at(Utc::now()))
	}

	/// Normalized addresses of known accounts that asked for a reset, oldest first.
	///
	/// At most [`MAX_RESET_REQUESTS`] are kept.
	pub fn reset_requests(&self) -> Vec<String> {
		self.reset_requests.read().iter().cloned().collect()
	}

	/// Hash verified against when the account does not exist.
	fn dummy_hash(&self) -> Result<&str, AuthError> {
		if let Some(hash) = self.dummy_hash.get() {
			return Ok(hash);
		}
		let hash = self.hasher.hash(DUMMY_PASSWORD)?;
		Ok(self.dummy_hash.get_or_init(|| hash))
	}
}

#[async_trait]
impl<H: PasswordHasher> AuthService for InMemoryAuthService<H> {
	async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
		let stored = self.users.read().get(&normalize_email(email)).cloned();
		let Some(stored) = stored else {
			self.hasher.verify(password, self.dummy_hash()?)?;
			return Err(AuthError::InvalidCredentials);
		};

		if !self.hasher.verify(password, &stored.password_hash)? {
			return Err(AuthError::InvalidCredentials);
		}

		let now = Utc::now();
		let session = AuthSession {
			id: Uuid::new_v4(),
			user_id: stored.user.id,
			email: stored.user.email.clone(),
			created_at: now,
			expires_at: now + self.session_ttl,
		};
		let mut sessions = self.sessions.write();
		sessions.retain(|_, s| !s.is_expired_at(now));
		sessions.insert(session.id, session.clone());
		Ok(session)
	}

	async fn sign_up(
		&self,
		email: &str,
		password: &str,
		metadata: Option<serde_json::Value>,
	) -> Result<User, AuthError> {
		let email = normalize_email(email);
		if self.users.read().contains_key(&email) {
			return Err(AuthError::UserAlreadyExists);
		}

		let password_hash = self.hasher.hash(password)?;
		let user = User {
			id: Uuid::new_v4(),
			email: email.clone(),
			created_at: Utc::now(),
			metadata,
		};

		// Re-check under the write lock; hashing ran unlocked
		let mut users = self.users.write();
		if users.contains_key(&email) {
			return Err(AuthError::UserAlreadyExists);
		}
		users.insert(
			email,
			StoredUser {
				user: user.clone(),
				password_hash,
			},
		);
		Ok(user)
	}

	async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
		self.sessions
			.write()
			.remove(&session.id)
			.map(|_| ())
			.ok_or(AuthError::SessionNotFound)
	}

	async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
		let email = normalize_email(email);
		if self.users.read().contains_key(&email) {
			let mut requests = self.reset_requests.write();
			if requests.len() >= MAX_RESET_REQUESTS {
				requests.pop_front();
			}
			requests.push_back(email);
		}
		Ok(())
	}
}
