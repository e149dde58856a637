//! Session-scoped key/value storage used to hold the CSRF token.

use crate::SecurityResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Storage for one user session.
///
/// Implementations typically wrap a server-side session store or the
/// browser's session storage; failures are reported as
/// [`SecurityError::Storage`](crate::SecurityError::Storage).
pub trait SessionStorage: Send + Sync {
	fn get(&self, key: &str) -> SecurityResult<Option<String>>;

	fn set(&self, key: &str, value: String) -> SecurityResult<()>;

	fn remove(&self, key: &str) -> SecurityResult<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
	fn get(&self, key: &str) -> SecurityResult<Option<String>> {
		(**self).get(key)
	}

	fn set(&self, key: &str, value: String) -> SecurityResult<()> {
		(**self).set(key, value)
	}

	fn remove(&self, key: &str) -> SecurityResult<()> {
		(**self).remove(key)
	}
}

/// In-process session storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
	entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySessionStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl SessionStorage for MemorySessionStorage {
	fn get(&self, key: &str) -> SecurityResult<Option<String>> {
		Ok(self.entries.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: String) -> SecurityResult<()> {
		self.entries.write().insert(key.to_string(), value);
		Ok(())
	}

	fn remove(&self, key: &str) -> SecurityResult<()> {
		self.entries.write().remove(key);
		Ok(())
	}
}
