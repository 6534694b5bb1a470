//! Per-request session object returned by the session binder.
//!
//! Session storage backends (cookies, redis, ...) belong to the host
//! application; this type is only the in-request view that handlers receive.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// A per-request key/value store, cheap to clone and shareable with the
/// handler body.
///
/// # Examples
///
/// ```
/// use hyper_depends::Session;
///
/// let session = Session::new();
/// session.insert("user_id", serde_json::json!(42));
/// assert_eq!(session.get("user_id"), Some(serde_json::json!(42)));
/// ```
#[derive(Clone, Default)]
pub struct Session {
	values: Arc<RwLock<HashMap<String, Value>>>,
}

impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<Value> {
		let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
		values.get(key).cloned()
	}

	pub fn insert(&self, key: impl Into<String>, value: Value) {
		let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
		values.insert(key.into(), value);
	}

	pub fn remove(&self, key: &str) -> Option<Value> {
		let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
		values.remove(key)
	}

	pub fn clear(&self) {
		let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
		values.clear();
	}

	pub fn is_empty(&self) -> bool {
		let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
		values.is_empty()
	}
}
