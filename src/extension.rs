//! The `Depends` extension: startup wiring of binder tables into handlers.

use crate::app::App;
use crate::args::BoundArgs;
use crate::binders::Binder;
use crate::depends::DependencyContext;
use crate::error::{Result, WiringError};
use crate::handler::{Endpoint, Handler};
use crate::provider::Provider;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Key under which the extension registers itself on the application.
pub const EXTENSION_KEY: &str = "hyper-depends";

/// The extension instance: owns the [`Provider`] and performs wiring.
///
/// Follows the host-framework extension convention: construct once, register
/// globals and overrides on the provider, then call
/// [`init_app`](Depends::init_app) before serving traffic.
///
/// # Examples
///
/// ```
/// use hyper::Method;
/// use hyper_depends::{App, Binder, BoundArgs, Depends, Response, endpoint};
///
/// let mut app = App::new();
/// app.route(
///     "/greet",
///     Method::GET,
///     endpoint(|args: BoundArgs| async move {
///         let name: String = args.get("name")?;
///         Ok(Response::ok().with_body(format!("hi {name}")))
///     }),
///     vec![Binder::query("name")],
/// )
/// .unwrap();
///
/// let depends = Depends::new();
/// depends.init_app(&mut app).unwrap();
/// ```
#[derive(Default)]
pub struct Depends {
	provider: Arc<Provider>,
}

impl Depends {
	pub fn new() -> Self {
		Self {
			provider: Arc::new(Provider::new()),
		}
	}

	/// The provider backing this extension, for global registration and
	/// dependency overrides.
	pub fn provider(&self) -> &Arc<Provider> {
		&self.provider
	}

	/// Wires every registered route: validates its binder table and installs
	/// the wrapper handler that performs resolution on each request.
	///
	/// Wiring is eager and idempotent. Routes that are already wired are
	/// left untouched, so calling this twice (or wiring one application with
	/// two passes) never double-wraps a handler. Configuration errors abort
	/// startup and leave the remaining routes unwired.
	///
	/// The first extension wired onto an application owns its registry slot:
	/// a later extension wires any still-unwired routes with its own
	/// provider but does not replace the registered one.
	pub fn init_app(&self, app: &mut App) -> Result<(), WiringError> {
		for route in app.routes_mut() {
			if route.is_wired() {
				continue;
			}
			validate_binders(route.binders())?;
			tracing::debug!(
				pattern = route.pattern(),
				method = %route.method(),
				binders = route.binders().len(),
				"wiring route"
			);
			let handler = BinderHandler {
				endpoint: route.endpoint().clone(),
				binders: route.binders().to_vec(),
				provider: self.provider.clone(),
			};
			route.install(Arc::new(handler));
		}
		if !app.has_extension(EXTENSION_KEY) {
			app.insert_extension(EXTENSION_KEY, self.provider.clone());
		}
		Ok(())
	}
}

/// Checks one route's binder table for configuration errors.
fn validate_binders(binders: &[Binder]) -> Result<(), WiringError> {
	let mut seen = HashSet::new();
	for binder in binders {
		binder.validate()?;
		if !seen.insert(binder.param_name().to_string()) {
			return Err(WiringError::DuplicateParam(binder.param_name().to_string()));
		}
	}
	Ok(())
}

/// The wrapper installed by wiring: resolves the binder table, builds the
/// dependency context, and invokes the endpoint.
struct BinderHandler {
	endpoint: Arc<dyn Endpoint>,
	binders: Vec<Binder>,
	provider: Arc<Provider>,
}

#[async_trait]
impl Handler for BinderHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		let request = Arc::new(request);
		let mut values = HashMap::with_capacity(self.binders.len());
		for binder in &self.binders {
			let value = binder.resolve(&request, &self.provider)?;
			values.insert(binder.param_name().to_string(), value);
		}
		let ctx = DependencyContext::new(request, self.provider.clone());
		self.endpoint.call(BoundArgs::new(values, ctx)).await
	}
}
