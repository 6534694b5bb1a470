//! Resolved handler arguments.

use crate::binders::BoundValue;
use crate::depends::{Depend, Dependency, DependencyContext};
use crate::error::{BindError, Result};
use crate::request::Request;
use crate::session::Session;
use crate::websocket::Websocket;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// The values a wired handler passes to its endpoint: one entry per binder,
/// addressed by parameter name, plus the dependency-resolution context.
pub struct BoundArgs {
	values: HashMap<String, BoundValue>,
	ctx: DependencyContext,
}

impl BoundArgs {
	pub(crate) fn new(values: HashMap<String, BoundValue>, ctx: DependencyContext) -> Self {
		Self { values, ctx }
	}

	/// Deserializes the bound value for `param` into `T`.
	///
	/// Path, query, header and cookie values arrive as strings; when direct
	/// deserialization fails for a string value, the string content is
	/// re-parsed so `"123"` binds to an `i64`.
	///
	/// # Errors
	///
	/// [`BindError::UnknownParameter`] when no binder targeted `param`,
	/// [`BindError::InvalidParameter`] when the value does not fit `T`.
	pub fn get<T: DeserializeOwned>(&self, param: &str) -> Result<T> {
		let value = self.json(param)?;
		match serde_json::from_value::<T>(value.clone()) {
			Ok(parsed) => Ok(parsed),
			Err(direct_err) => {
				if let Value::String(raw) = value
					&& let Ok(reparsed) = serde_json::from_str::<Value>(raw)
					&& let Ok(parsed) = serde_json::from_value::<T>(reparsed)
				{
					return Ok(parsed);
				}
				Err(BindError::InvalidParameter {
					param: param.to_string(),
					reason: direct_err.to_string(),
				})
			}
		}
	}

	/// The raw bound JSON value for `param`.
	pub fn json(&self, param: &str) -> Result<&Value> {
		match self.value(param)? {
			BoundValue::Json(value) => Ok(value),
			other => Err(BindError::InvalidParameter {
				param: param.to_string(),
				reason: format!("bound to a {} object, not request data", kind_name(other)),
			}),
		}
	}

	/// The raw body bytes bound under `param`.
	pub fn body(&self, param: &str) -> Result<Bytes> {
		match self.value(param)? {
			BoundValue::Bytes(body) => Ok(body.clone()),
			other => Err(self.wrong_kind(param, "raw body", other)),
		}
	}

	/// The request object bound under `param`.
	pub fn request(&self, param: &str) -> Result<Arc<Request>> {
		match self.value(param)? {
			BoundValue::Request(request) => Ok(request.clone()),
			other => Err(self.wrong_kind(param, "request", other)),
		}
	}

	/// The session bound under `param`.
	pub fn session(&self, param: &str) -> Result<Session> {
		match self.value(param)? {
			BoundValue::Session(session) => Ok(session.clone()),
			other => Err(self.wrong_kind(param, "session", other)),
		}
	}

	/// The websocket handle bound under `param`.
	pub fn websocket(&self, param: &str) -> Result<Arc<Websocket>> {
		match self.value(param)? {
			BoundValue::Websocket(ws) => Ok(ws.clone()),
			other => Err(self.wrong_kind(param, "websocket", other)),
		}
	}

	/// Downcasts the global bound under `param` to `T`.
	pub fn global<T: Any + Send + Sync>(&self, param: &str) -> Result<Arc<T>> {
		match self.value(param)? {
			BoundValue::Global(any) => {
				any.clone()
					.downcast::<T>()
					.map_err(|_| BindError::InvalidParameter {
						param: param.to_string(),
						reason: format!(
							"global is not a {}",
							std::any::type_name::<T>()
						),
					})
			}
			other => Err(self.wrong_kind(param, "global", other)),
		}
	}

	/// Resolves a dependency through the request's context; the delegation
	/// seam to the DI layer.
	pub async fn depend<T: Dependency>(&self) -> Result<Depend<T>> {
		Depend::resolve(&self.ctx).await
	}

	/// The dependency-resolution context for this request.
	pub fn context(&self) -> &DependencyContext {
		&self.ctx
	}

	fn value(&self, param: &str) -> Result<&BoundValue> {
		self.values
			.get(param)
			.ok_or_else(|| BindError::UnknownParameter(param.to_string()))
	}

	fn wrong_kind(&self, param: &str, wanted: &str, got: &BoundValue) -> BindError {
		BindError::InvalidParameter {
			param: param.to_string(),
			reason: format!("bound to a {} value, expected {wanted}", kind_name(got)),
		}
	}
}

fn kind_name(value: &BoundValue) -> &'static str {
	match value {
		BoundValue::Json(_) => "request data",
		BoundValue::Bytes(_) => "raw body",
		BoundValue::Request(_) => "request",
		BoundValue::Session(_) => "session",
		BoundValue::Websocket(_) => "websocket",
		BoundValue::Global(_) => "global",
	}
}
