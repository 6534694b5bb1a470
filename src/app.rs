//! Application surface: route table, extensions registry, dispatch.

use crate::binders::Binder;
use crate::error::{BindError, WiringError};
use crate::handler::{Endpoint, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::routing::PathPattern;
use hyper::Method;
use serde_json::json;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// One registered route: a pattern, a method, the user endpoint with its
/// binder table, and (after wiring) the wrapped handler.
pub struct Route {
	pattern: PathPattern,
	method: Method,
	endpoint: Arc<dyn Endpoint>,
	binders: Vec<Binder>,
	wired: Option<Arc<dyn Handler>>,
}

impl Route {
	pub fn pattern(&self) -> &str {
		self.pattern.as_str()
	}

	pub fn method(&self) -> &Method {
		&self.method
	}

	pub fn binders(&self) -> &[Binder] {
		&self.binders
	}

	pub fn is_wired(&self) -> bool {
		self.wired.is_some()
	}

	pub(crate) fn endpoint(&self) -> &Arc<dyn Endpoint> {
		&self.endpoint
	}

	pub(crate) fn install(&mut self, handler: Arc<dyn Handler>) {
		self.wired = Some(handler);
	}
}

/// The host application the extension wires against: a route table plus an
/// extensions registry keyed by name.
///
/// # Examples
///
/// ```
/// use hyper::Method;
/// use hyper_depends::{App, Binder, BoundArgs, Response, endpoint};
///
/// let mut app = App::new();
/// app.route(
///     "/users/{id}",
///     Method::GET,
///     endpoint(|args: BoundArgs| async move {
///         let id: i64 = args.get("id")?;
///         Ok(Response::json(&serde_json::json!({"id": id})).unwrap())
///     }),
///     vec![Binder::path("id")],
/// )
/// .unwrap();
/// ```
#[derive(Default)]
pub struct App {
	routes: Vec<Route>,
	extensions: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl App {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a route. Pattern problems fail here, at definition time.
	pub fn route(
		&mut self,
		pattern: &str,
		method: Method,
		endpoint: Arc<dyn Endpoint>,
		binders: Vec<Binder>,
	) -> Result<&mut Self, WiringError> {
		let pattern = PathPattern::new(pattern)?;
		self.routes.push(Route {
			pattern,
			method,
			endpoint,
			binders,
			wired: None,
		});
		Ok(self)
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	pub(crate) fn routes_mut(&mut self) -> &mut [Route] {
		&mut self.routes
	}

	/// Stores an extension object under a fixed key.
	pub fn insert_extension<T: Any + Send + Sync>(&mut self, key: impl Into<String>, ext: Arc<T>) {
		self.extensions.insert(key.into(), ext);
	}

	/// Whether an extension is registered under `key`.
	pub fn has_extension(&self, key: &str) -> bool {
		self.extensions.contains_key(key)
	}

	/// Looks up a previously registered extension.
	pub fn extension<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
		self.extensions
			.get(key)
			.and_then(|ext| ext.clone().downcast::<T>().ok())
	}

	/// Routes a request to the matching handler and renders failures as JSON
	/// error responses of the form `{"error": "..."}`.
	///
	/// Unmatched paths give 404; a matched path with the wrong method gives
	/// 405; binder failures render with their own status (422 for client
	/// input, 500 otherwise).
	pub async fn dispatch(&self, mut request: Request) -> Response {
		let mut allowed: Vec<&str> = Vec::new();
		let mut matched: Option<(&Route, HashMap<String, String>)> = None;
		for route in &self.routes {
			if let Some(params) = route.pattern.match_path(request.path()) {
				allowed.push(route.method.as_str());
				if route.method == request.method {
					matched = Some((route, params));
					break;
				}
			}
		}

		let Some((route, params)) = matched else {
			return if allowed.is_empty() {
				error_response(Response::not_found(), "not found")
			} else {
				error_response(
					Response::method_not_allowed()
						.with_header(hyper::header::ALLOW, &allowed.join(", ")),
					"method not allowed",
				)
			};
		};

		let Some(handler) = &route.wired else {
			tracing::warn!(pattern = route.pattern.as_str(), "dispatch before wiring");
			let err = BindError::NotWired;
			return error_response(Response::new(err.status_code()), &err.to_string());
		};

		for (key, value) in params {
			request.set_path_param(key, value);
		}

		match handler.handle(request).await {
			Ok(response) => response,
			Err(err) => {
				tracing::debug!(error = %err, "binding failed");
				error_response(Response::new(err.status_code()), &err.to_string())
			}
		}
	}
}

fn error_response(base: Response, message: &str) -> Response {
	let status = base.status;
	base.with_json(&json!({"error": message}))
		.unwrap_or_else(|_| Response::new(status))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handler::endpoint;
	use hyper::StatusCode;

	fn ok_endpoint() -> Arc<dyn Endpoint> {
		endpoint(|_args| async { Ok(Response::ok()) })
	}

	#[tokio::test]
	async fn test_unknown_path_is_404() {
		let app = App::new();
		let request = Request::builder().uri("/nope").build().unwrap();
		assert_eq!(app.dispatch(request).await.status, StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_wrong_method_is_405() {
		let mut app = App::new();
		app.route("/things", Method::POST, ok_endpoint(), vec![])
			.unwrap();
		let request = Request::builder().uri("/things").build().unwrap();
		let response = app.dispatch(request).await;
		assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(
			response.headers.get(hyper::header::ALLOW).unwrap(),
			"POST"
		);
	}

	#[tokio::test]
	async fn test_unwired_route_is_500() {
		let mut app = App::new();
		app.route("/things", Method::GET, ok_endpoint(), vec![])
			.unwrap();
		let request = Request::builder().uri("/things").build().unwrap();
		let response = app.dispatch(request).await;
		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn test_bad_pattern_fails_at_registration() {
		let mut app = App::new();
		assert!(app.route("/bad/{", Method::GET, ok_endpoint(), vec![]).is_err());
	}

	#[test]
	fn test_extension_registry_round_trip() {
		let mut app = App::new();
		app.insert_extension("counter", Arc::new(7u32));
		assert_eq!(*app.extension::<u32>("counter").unwrap(), 7);
		assert!(app.extension::<String>("counter").is_none());
	}
}
