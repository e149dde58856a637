//! Password hashing.

use crate::AuthError;
use argon2::{Algorithm, Argon2, Params, Version};

/// Password hasher trait
pub trait PasswordHasher: Send + Sync {
	/// Hashes a password into a PHC string
	fn hash(&self, password: &str) -> Result<String, AuthError>;

	/// Verifies a password against a PHC string
	fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id password hasher
///
/// # Examples
///
/// ```
/// use accio_auth::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::with_params(1024, 1, 1).unwrap();
/// let hash = hasher.hash("secure_password123").unwrap();
///
/// assert!(hasher.verify("secure_password123", &hash).unwrap());
/// assert!(!hasher.verify("wrong_password", &hash).unwrap());
/// ```
#[derive(Clone)]
pub struct Argon2Hasher {
	argon2: Argon2<'static>,
}

impl Argon2Hasher {
	/// Argon2id with the crate's recommended default parameters
	pub fn new() -> Self {
		Self {
			argon2: Argon2::default(),
		}
	}

	/// Argon2id with explicit memory (KiB), iteration and parallelism costs
	pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
		let params = Params::new(m_cost, t_cost, p_cost, None)
			.map_err(|e| AuthError::Hashing(e.to_string()))?;
		Ok(Self {
			argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
		})
	}
}

impl Default for Argon2Hasher {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Argon2Hasher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Argon2Hasher").finish_non_exhaustive()
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> Result<String, AuthError> {
		use argon2::password_hash::{PasswordHasher as _, SaltString};
		use rand::RngCore;

		let mut salt_bytes = [0u8; 16];
		rand::rng().fill_bytes(&mut salt_bytes);
		let salt =
			SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;

		self.argon2
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| AuthError::Hashing(e.to_string()))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
		use argon2::password_hash::{PasswordHash, PasswordVerifier};

		let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

		Ok(self
			.argon2
			.verify_password(password.as_bytes(), &parsed_hash)
			.is_ok())
	}
}
