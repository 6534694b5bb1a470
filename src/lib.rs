//! # hyper-depends
//!
//! Declarative parameter binding and FastAPI-style dependency injection for
//! hyper-based async applications.
//!
//! Route handlers declare where each parameter comes from — path variables,
//! query fields, headers, cookies, JSON body fields, the raw body, the
//! session, the request or websocket object, or application-wide "globals" —
//! through a per-route table of [`Binder`]s. At startup the [`Depends`]
//! extension wires every route: it validates the table (configuration
//! mistakes fail the boot, not a request) and wraps the endpoint in a handler
//! that resolves each binder against the live request before invocation.
//! Dependency resolution ([`Depend<T>`]) is delegated to the extension's
//! [`Provider`], with request-scoped caching and per-application overrides.
//!
//! ## Example
//!
//! ```
//! use hyper::Method;
//! use hyper_depends::{App, Binder, BoundArgs, Depends, Request, Response, endpoint};
//!
//! # tokio_test::block_on(async {
//! let mut app = App::new();
//! app.route(
//!     "/users/{id}",
//!     Method::GET,
//!     endpoint(|args: BoundArgs| async move {
//!         let id: i64 = args.get("id")?;
//!         let page: i64 = args.get("page")?;
//!         Ok(Response::json(&serde_json::json!({"id": id, "page": page})).unwrap())
//!     }),
//!     vec![
//!         Binder::path("id"),
//!         Binder::query("page").with_default(serde_json::json!(1)),
//!     ],
//! )
//! .unwrap();
//!
//! let depends = Depends::new();
//! depends.init_app(&mut app).unwrap();
//!
//! let request = Request::builder().uri("/users/7").build().unwrap();
//! let response = app.dispatch(request).await;
//! assert_eq!(&response.body[..], br#"{"id":7,"page":1}"#);
//! # });
//! ```
//!
//! ## Error model
//!
//! Missing required parameters and malformed JSON bodies render as 422
//! responses; dependency failures and server-side misconfiguration render as
//! 500. Invalid binder tables and route patterns are [`WiringError`]s raised
//! at startup.

pub mod app;
pub mod args;
pub mod binders;
pub mod depends;
pub mod error;
pub mod extension;
pub mod handler;
pub mod provider;
pub mod request;
pub mod response;
pub mod routing;
pub mod server;
pub mod session;
pub mod websocket;

pub use app::{App, Route};
pub use args::BoundArgs;
pub use binders::{Binder, BoundValue, Source};
pub use depends::{Depend, Dependency, DependencyContext, RequestScope};
pub use error::{BindError, Result, WiringError};
pub use extension::{Depends, EXTENSION_KEY};
pub use handler::{Endpoint, Handler, endpoint};
pub use provider::Provider;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use server::serve;
pub use session::Session;
pub use websocket::{Message, Websocket, WebsocketPeer};
