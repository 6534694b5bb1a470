//! HTTP response representation

use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

/// HTTP response produced by endpoints and the dispatcher.
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Creates an empty response with the given status.
	///
	/// # Examples
	///
	/// ```
	/// use hyper::StatusCode;
	/// use hyper_depends::Response;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// HTTP 200 OK.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// HTTP 404 Not Found.
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// HTTP 405 Method Not Allowed.
	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
	}

	/// Sets the body, leaving headers untouched.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Serializes `value` as the JSON body and sets the content type.
	///
	/// # Examples
	///
	/// ```
	/// use hyper_depends::Response;
	/// use serde_json::json;
	///
	/// let response = Response::ok().with_json(&json!({"ok": true})).unwrap();
	/// assert_eq!(&response.body[..], br#"{"ok":true}"#);
	/// ```
	pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
		self.body = Bytes::from(serde_json::to_vec(value)?);
		self.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		Ok(self)
	}

	/// JSON response in one step; status defaults to 200.
	pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
		Self::ok().with_json(value)
	}

	/// Adds a header, ignoring invalid values.
	pub fn with_header(mut self, name: hyper::header::HeaderName, value: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(value) {
			self.headers.insert(name, value);
		}
		self
	}
}
