//! Per-application dependency provider.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry owned by the [`Depends`](crate::Depends) extension: named globals
/// plus type-keyed dependency overrides.
///
/// One provider exists per extension instance, so overrides are scoped to an
/// application rather than to the process. The registry is read-mostly:
/// registration is expected to finish before traffic starts. Registering
/// concurrently with live requests is memory-safe but the ordering is
/// unspecified and unsupported.
#[derive(Default)]
pub struct Provider {
	globals: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
	overrides: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Provider {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a value under `key`, retrievable by `Binder::global(key)`
	/// and [`Provider::global`].
	///
	/// # Examples
	///
	/// ```
	/// use hyper_depends::Provider;
	///
	/// let provider = Provider::new();
	/// provider.register_global("answer", 42u32);
	/// assert_eq!(*provider.global::<u32>("answer").unwrap(), 42);
	/// ```
	pub fn register_global<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
		let mut globals = self.globals.write().unwrap_or_else(PoisonError::into_inner);
		globals.insert(key.into(), Arc::new(value));
	}

	/// Looks up a global by key and type. `None` when the key is unknown or
	/// registered with a different type.
	pub fn global<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
		let globals = self.globals.read().unwrap_or_else(PoisonError::into_inner);
		globals.get(key).and_then(|v| v.clone().downcast::<T>().ok())
	}

	/// Looks up a global without downcasting, for untyped binder resolution.
	pub(crate) fn global_any(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
		let globals = self.globals.read().unwrap_or_else(PoisonError::into_inner);
		globals.get(key).cloned()
	}

	/// Replaces every resolution of `T` with a fixed instance.
	///
	/// The FastAPI dependency-override pattern: tests install a stand-in and
	/// [`Depend::resolve`](crate::Depend::resolve) short-circuits to it
	/// without calling `T`'s own resolution logic.
	pub fn override_dependency<T: Any + Send + Sync>(&self, value: T) {
		let mut overrides = self
			.overrides
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		overrides.insert(TypeId::of::<T>(), Arc::new(value));
	}

	pub fn override_of<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		let overrides = self
			.overrides
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		overrides
			.get(&TypeId::of::<T>())
			.and_then(|v| v.clone().downcast::<T>().ok())
	}

	/// Removes the override for `T`, restoring normal resolution.
	pub fn clear_override<T: Any + Send + Sync>(&self) {
		let mut overrides = self
			.overrides
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		overrides.remove(&TypeId::of::<T>());
	}

	/// Removes all overrides.
	pub fn clear_overrides(&self) {
		let mut overrides = self
			.overrides
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		overrides.clear();
	}
}
