//! Handler and endpoint seams.
//!
//! Two traits separate the framework side from the user side:
//! [`Handler`] consumes a raw [`Request`] (what dispatch and wiring speak),
//! while [`Endpoint`] consumes the already-resolved [`BoundArgs`] (what
//! application code writes). Wiring turns an endpoint plus its binder table
//! into a handler.

use crate::args::BoundArgs;
use crate::error::Result;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Framework-level request processor.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// User-level handler, invoked with resolved arguments.
///
/// Usually constructed from an async function through [`endpoint`].
#[async_trait]
pub trait Endpoint: Send + Sync {
	async fn call(&self, args: BoundArgs) -> Result<Response>;
}

struct FnEndpoint<F> {
	f: F,
}

#[async_trait]
impl<F> Endpoint for FnEndpoint<F>
where
	F: Fn(BoundArgs) -> BoxFuture<'static, Result<Response>> + Send + Sync,
{
	async fn call(&self, args: BoundArgs) -> Result<Response> {
		(self.f)(args).await
	}
}

/// Adapts an async function into an [`Endpoint`].
///
/// # Examples
///
/// ```
/// use hyper_depends::{BoundArgs, Response, endpoint};
///
/// let greet = endpoint(|args: BoundArgs| async move {
///     let name: String = args.get("name")?;
///     Ok(Response::ok().with_body(format!("hello {name}")))
/// });
/// # let _ = greet;
/// ```
pub fn endpoint<F, Fut>(f: F) -> Arc<dyn Endpoint>
where
	F: Fn(BoundArgs) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	Arc::new(FnEndpoint {
		f: move |args| Box::pin(f(args)) as BoxFuture<'static, Result<Response>>,
	})
}
