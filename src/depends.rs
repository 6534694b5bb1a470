//! FastAPI-style dependency resolution: the `Dependency` trait, the
//! `Depend<T>` wrapper with request-scoped caching, and the context both see.

use crate::error::Result;
use crate::provider::Provider;
use crate::request::Request;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

/// How a type is produced when a handler asks for `Depend<T>`.
///
/// Implementors receive the full request context and may read bound request
/// data, globals, or resolve further dependencies. Failures surface as
/// [`BindError::Dependency`] and render 500.
///
/// # Examples
///
/// ```
/// use hyper_depends::{Dependency, DependencyContext, Result};
///
/// #[derive(Clone)]
/// struct RequestId(String);
///
/// #[async_trait::async_trait]
/// impl Dependency for RequestId {
///     async fn resolve(ctx: &DependencyContext) -> Result<Self> {
///         let id = ctx
///             .request()
///             .header("x-request-id")
///             .unwrap_or("unknown")
///             .to_string();
///         Ok(RequestId(id))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Dependency: Sized + Send + Sync + 'static {
	async fn resolve(ctx: &DependencyContext) -> Result<Self>;
}

/// Cache of resolved dependencies, living exactly as long as one request.
///
/// Keyed by type, so two `Depend<T>` resolutions within one request observe
/// the same instance.
#[derive(Clone, Default)]
pub struct RequestScope {
	cache: Arc<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl RequestScope {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
		cache
			.get(&TypeId::of::<T>())
			.and_then(|arc| arc.clone().downcast::<T>().ok())
	}

	pub fn set<T: Any + Send + Sync>(&self, value: Arc<T>) {
		let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
		cache.insert(TypeId::of::<T>(), value);
	}
}

/// Everything a [`Dependency`] implementor may consult: the request, the
/// application's provider, and the request-scoped cache.
///
/// Built once per request by the wired handler.
#[derive(Clone)]
pub struct DependencyContext {
	request: Arc<Request>,
	provider: Arc<Provider>,
	scope: RequestScope,
}

impl DependencyContext {
	pub fn new(request: Arc<Request>, provider: Arc<Provider>) -> Self {
		Self {
			request,
			provider,
			scope: RequestScope::new(),
		}
	}

	pub fn request(&self) -> &Arc<Request> {
		&self.request
	}

	pub fn provider(&self) -> &Arc<Provider> {
		&self.provider
	}

	pub(crate) fn scope(&self) -> &RequestScope {
		&self.scope
	}

	/// Convenience passthrough to [`Provider::global`].
	pub fn global<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
		self.provider.global(key)
	}
}

/// A resolved dependency, `Deref`s to `T`.
pub struct Depend<T>(Arc<T>);

impl<T: Dependency> Depend<T> {
	/// Resolves `T` for the current request.
	///
	/// Resolution order: provider override first (so tests can substitute
	/// implementations), then the request-scoped cache, then
	/// [`Dependency::resolve`] with the result cached for the remainder of
	/// the request.
	pub async fn resolve(ctx: &DependencyContext) -> Result<Self> {
		if let Some(value) = ctx.provider.override_of::<T>() {
			tracing::debug!(dependency = std::any::type_name::<T>(), "using override");
			return Ok(Self(value));
		}
		if let Some(cached) = ctx.scope.get::<T>() {
			return Ok(Self(cached));
		}
		let value = Arc::new(T::resolve(ctx).await?);
		ctx.scope.set(value.clone());
		Ok(Self(value))
	}

	/// Wraps an existing value, bypassing resolution. Intended for tests.
	pub fn from_value(value: T) -> Self {
		Self(Arc::new(value))
	}

	pub fn as_arc(&self) -> &Arc<T> {
		&self.0
	}
}

impl<T> Deref for Depend<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<T> Clone for Depend<T> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T> AsRef<T> for Depend<T> {
	fn as_ref(&self) -> &T {
		&self.0
	}
}

impl<T: std::fmt::Debug> std::fmt::Debug for Depend<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Depend").field(&self.0).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::BindError;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn context() -> DependencyContext {
		let request = Arc::new(crate::Request::builder().uri("/").build().unwrap());
		DependencyContext::new(request, Arc::new(Provider::new()))
	}

	static RESOLUTIONS: AtomicUsize = AtomicUsize::new(0);

	#[derive(Clone, Debug)]
	struct Counted(usize);

	#[async_trait::async_trait]
	impl Dependency for Counted {
		async fn resolve(_ctx: &DependencyContext) -> Result<Self> {
			Ok(Counted(RESOLUTIONS.fetch_add(1, Ordering::SeqCst)))
		}
	}

	#[tokio::test]
	async fn test_resolution_cached_within_request() {
		let ctx = context();
		let first = Depend::<Counted>::resolve(&ctx).await.unwrap();
		let second = Depend::<Counted>::resolve(&ctx).await.unwrap();
		assert_eq!((*first).0, (*second).0);
		assert!(Arc::ptr_eq(first.as_arc(), second.as_arc()));
	}

	#[tokio::test]
	async fn test_fresh_request_resolves_again() {
		let a = Depend::<Counted>::resolve(&context()).await.unwrap();
		let b = Depend::<Counted>::resolve(&context()).await.unwrap();
		assert_ne!((*a).0, (*b).0);
	}

	#[derive(Clone, PartialEq, Debug)]
	struct Greeting(String);

	#[async_trait::async_trait]
	impl Dependency for Greeting {
		async fn resolve(_ctx: &DependencyContext) -> Result<Self> {
			Ok(Greeting("real".to_string()))
		}
	}

	#[test]
	fn test_from_value_bypasses_resolution() {
		fn render(greeting: &Depend<Greeting>) -> String {
			format!("{}!", (**greeting).0)
		}

		let greeting = Depend::from_value(Greeting("direct".to_string()));
		assert_eq!(render(&greeting), "direct!");
	}

	#[tokio::test]
	async fn test_override_short_circuits_resolution() {
		let ctx = context();
		ctx.provider().override_dependency(Greeting("fake".to_string()));
		let g = Depend::<Greeting>::resolve(&ctx).await.unwrap();
		assert_eq!(*g, Greeting("fake".to_string()));
	}

	#[derive(Clone, Debug)]
	struct FromHeader(String);

	#[async_trait::async_trait]
	impl Dependency for FromHeader {
		async fn resolve(ctx: &DependencyContext) -> Result<Self> {
			ctx.request()
				.header("x-tenant")
				.map(|v| FromHeader(v.to_string()))
				.ok_or_else(|| BindError::Dependency("x-tenant header required".to_string()))
		}
	}

	#[tokio::test]
	async fn test_dependency_reads_request() {
		let request = Arc::new(
			crate::Request::builder()
				.uri("/")
				.header("x-tenant", "acme")
				.build()
				.unwrap(),
		);
		let ctx = DependencyContext::new(request, Arc::new(Provider::new()));
		let tenant = Depend::<FromHeader>::resolve(&ctx).await.unwrap();
		assert_eq!((*tenant).0, "acme");
	}

	#[tokio::test]
	async fn test_dependency_failure_is_bind_error() {
		let err = Depend::<FromHeader>::resolve(&context()).await.unwrap_err();
		assert!(matches!(err, BindError::Dependency(_)));
	}
}
