//! Binder descriptors: where a handler parameter's value comes from.
//!
//! Each route registers one binder per handler parameter; wiring turns the
//! table into a wrapper that resolves every binder against the live request
//! before the endpoint runs.

use crate::error::{BindError, Result, WiringError};
use crate::provider::Provider;
use crate::request::Request;
use crate::session::Session;
use crate::websocket::Websocket;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// The request-data source a binder reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
	/// A path variable bound by the router (keyed).
	Path,
	/// A single query-string field (keyed).
	QueryField,
	/// The whole query string as a JSON object.
	QueryData,
	/// A request header (keyed).
	Header,
	/// A cookie (keyed).
	Cookie,
	/// One field of the JSON request body (keyed).
	JsonField,
	/// The whole parsed JSON body.
	RawJson,
	/// The raw request body bytes, unparsed.
	Body,
	/// The per-request session object.
	Session,
	/// The request object itself.
	Request,
	/// The websocket handle of a websocket request.
	Websocket,
	/// A value registered on the application's provider (keyed).
	Global,
}

impl Source {
	/// Whether this source looks up a key inside a request table.
	pub fn requires_key(self) -> bool {
		matches!(
			self,
			Self::Path
				| Self::QueryField
				| Self::Header
				| Self::Cookie
				| Self::JsonField
				| Self::Global
		)
	}

	/// Short name used in error messages.
	pub fn name(self) -> &'static str {
		match self {
			Self::Path => "path",
			Self::QueryField => "query",
			Self::QueryData => "query data",
			Self::Header => "header",
			Self::Cookie => "cookie",
			Self::JsonField => "body field",
			Self::RawJson => "raw JSON body",
			Self::Body => "body",
			Self::Session => "session",
			Self::Request => "request",
			Self::Websocket => "websocket",
			Self::Global => "global",
		}
	}
}

/// Immutable descriptor tying one handler parameter to a [`Source`].
///
/// Created at route-definition time and never mutated afterwards. Keyed
/// sources read `key` from the corresponding request table and fall back to
/// `default`; whole-object sources return the context object itself.
///
/// # Examples
///
/// ```
/// use hyper_depends::Binder;
///
/// let binders = vec![
///     Binder::path("id"),
///     Binder::query("page").with_default(serde_json::json!(1)),
///     Binder::header("x-api-key").param("api_key"),
///     Binder::json_field("name"),
/// ];
/// assert_eq!(binders[2].param_name(), "api_key");
/// ```
#[derive(Debug, Clone)]
pub struct Binder {
	param: String,
	source: Source,
	key: Option<String>,
	default: Option<Value>,
}

impl Binder {
	fn keyed(source: Source, key: impl Into<String>) -> Self {
		let key = key.into();
		Self {
			param: key.clone(),
			source,
			key: Some(key),
			default: None,
		}
	}

	fn whole(source: Source, param: impl Into<String>) -> Self {
		Self {
			param: param.into(),
			source,
			key: None,
			default: None,
		}
	}

	/// A path variable; the parameter name defaults to the key.
	pub fn path(key: impl Into<String>) -> Self {
		Self::keyed(Source::Path, key)
	}

	/// A single query-string field.
	pub fn query(key: impl Into<String>) -> Self {
		Self::keyed(Source::QueryField, key)
	}

	/// The whole query string as a JSON object.
	pub fn query_data(param: impl Into<String>) -> Self {
		Self::whole(Source::QueryData, param)
	}

	/// A request header.
	pub fn header(key: impl Into<String>) -> Self {
		Self::keyed(Source::Header, key)
	}

	/// A cookie.
	pub fn cookie(key: impl Into<String>) -> Self {
		Self::keyed(Source::Cookie, key)
	}

	/// One field of the JSON body.
	pub fn json_field(key: impl Into<String>) -> Self {
		Self::keyed(Source::JsonField, key)
	}

	/// The whole parsed JSON body.
	pub fn raw_json(param: impl Into<String>) -> Self {
		Self::whole(Source::RawJson, param)
	}

	/// The raw body bytes, without any JSON parsing.
	pub fn body(param: impl Into<String>) -> Self {
		Self::whole(Source::Body, param)
	}

	/// The per-request session object.
	pub fn session(param: impl Into<String>) -> Self {
		Self::whole(Source::Session, param)
	}

	/// The request object itself.
	pub fn request(param: impl Into<String>) -> Self {
		Self::whole(Source::Request, param)
	}

	/// The websocket handle.
	pub fn websocket(param: impl Into<String>) -> Self {
		Self::whole(Source::Websocket, param)
	}

	/// A provider-registered global, ignoring the request entirely.
	pub fn global(key: impl Into<String>) -> Self {
		Self::keyed(Source::Global, key)
	}

	/// Renames the target parameter (defaults to the key for keyed sources).
	pub fn param(mut self, name: impl Into<String>) -> Self {
		self.param = name.into();
		self
	}

	/// Value used when the keyed lookup finds nothing.
	pub fn with_default(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}

	pub fn param_name(&self) -> &str {
		&self.param
	}

	pub fn source(&self) -> Source {
		self.source
	}

	pub fn key(&self) -> Option<&str> {
		self.key.as_deref()
	}

	/// Wiring-time validation; violations are fatal at startup, never at
	/// request time.
	pub(crate) fn validate(&self) -> Result<(), WiringError> {
		match (self.source.requires_key(), &self.key) {
			(true, None) => Err(WiringError::MissingKey {
				param: self.param.clone(),
				source_name: self.source.name(),
			}),
			(false, Some(_)) => Err(WiringError::UnexpectedKey {
				param: self.param.clone(),
				source_name: self.source.name(),
			}),
			_ => Ok(()),
		}
	}

	/// Resolves this binder against the live request context.
	pub(crate) fn resolve(
		&self,
		request: &Arc<Request>,
		provider: &Provider,
	) -> Result<BoundValue> {
		match self.source {
			Source::Path => self.keyed_string(|k| request.path_params.get(k).cloned()),
			Source::QueryField => {
				self.keyed_string(|k| request.query_param(k).map(str::to_string))
			}
			Source::Header => self.keyed_string(|k| request.header(k).map(str::to_string)),
			Source::Cookie => self.keyed_string(|k| request.cookie(k).map(str::to_string)),
			Source::JsonField => {
				let body = request.json()?;
				let key = self.key.as_deref().unwrap_or_default();
				match body.get(key) {
					Some(value) => Ok(BoundValue::Json(value.clone())),
					None => self.fallback(),
				}
			}
			Source::RawJson => Ok(BoundValue::Json((*request.json()?).clone())),
			Source::Body => Ok(BoundValue::Bytes(request.body.clone())),
			Source::QueryData => Ok(BoundValue::Json(request.query_object())),
			Source::Session => Ok(BoundValue::Session(request.session())),
			Source::Request => Ok(BoundValue::Request(request.clone())),
			Source::Websocket => request
				.websocket()
				.map(BoundValue::Websocket)
				.ok_or(BindError::NotWebsocket),
			Source::Global => {
				let key = self.key.as_deref().unwrap_or_default();
				provider
					.global_any(key)
					.map(BoundValue::Global)
					.ok_or_else(|| BindError::MissingGlobal(key.to_string()))
			}
		}
	}

	/// Keyed string lookup with the shared absence policy: value, else
	/// default, else missing-parameter error.
	fn keyed_string(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<BoundValue> {
		let key = self.key.as_deref().unwrap_or_default();
		match lookup(key) {
			Some(value) => Ok(BoundValue::Json(Value::String(value))),
			None => self.fallback(),
		}
	}

	fn fallback(&self) -> Result<BoundValue> {
		match &self.default {
			Some(default) => Ok(BoundValue::Json(default.clone())),
			None => Err(BindError::MissingParameter {
				source_name: self.source.name(),
				key: self.key.clone().unwrap_or_default(),
			}),
		}
	}
}

/// A value produced by binder resolution, before typed extraction.
#[derive(Clone)]
pub enum BoundValue {
	/// Request data (path/query/header/cookie/body values and defaults).
	Json(Value),
	/// The raw, unparsed request body.
	Bytes(bytes::Bytes),
	/// The request object.
	Request(Arc<Request>),
	/// The per-request session.
	Session(Session),
	/// The websocket handle.
	Websocket(Arc<Websocket>),
	/// A provider global, still type-erased.
	Global(Arc<dyn Any + Send + Sync>),
}

impl std::fmt::Debug for BoundValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
			Self::Bytes(body) => f.debug_tuple("Bytes").field(&body.len()).finish(),
			Self::Request(request) => {
				f.debug_tuple("Request").field(&request.uri.to_string()).finish()
			}
			Self::Session(_) => f.write_str("Session"),
			Self::Websocket(_) => f.write_str("Websocket"),
			Self::Global(_) => f.write_str("Global"),
		}
	}
}
