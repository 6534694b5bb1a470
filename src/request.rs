//! HTTP request representation with the lookup tables binders resolve against.

use crate::error::{BindError, Result};
use crate::session::Session;
use crate::websocket::Websocket;
use bytes::Bytes;
use hyper::http::uri::InvalidUri;
use hyper::{HeaderMap, Method, Uri, Version};
use once_cell::sync::OnceCell;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// An incoming request, decomposed into the tables binder resolution reads:
/// path parameters (filled in by the router), query parameters, headers and
/// cookies, plus the raw body.
///
/// The JSON body is parsed at most once per request; every body-field binder
/// on the same request sees the same parsed document.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Path variables bound by the router from the matched pattern.
	pub path_params: HashMap<String, String>,
	query_params: HashMap<String, String>,
	cookies: HashMap<String, String>,
	session: Session,
	websocket: Option<Arc<Websocket>>,
	json: OnceCell<Arc<Value>>,
}

impl Request {
	/// Starts building a request.
	///
	/// # Examples
	///
	/// ```
	/// use hyper::Method;
	/// use hyper_depends::Request;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/users/7?page=2")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/users/7");
	/// assert_eq!(request.query_param("page"), Some("2"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::new()
	}

	/// The request path, without the query string.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Looks up a single query parameter, percent-decoded.
	pub fn query_param(&self, key: &str) -> Option<&str> {
		self.query_params.get(key).map(String::as_str)
	}

	/// All query parameters as a JSON object, for whole-query binders.
	pub fn query_object(&self) -> Value {
		Value::Object(
			self.query_params
				.iter()
				.map(|(k, v)| (k.clone(), Value::String(v.clone())))
				.collect(),
		)
	}

	/// Looks up a header value as a string, if it is valid UTF-8.
	pub fn header(&self, key: &str) -> Option<&str> {
		self.headers.get(key).and_then(|v| v.to_str().ok())
	}

	/// Looks up a cookie parsed from the `Cookie` header.
	pub fn cookie(&self, key: &str) -> Option<&str> {
		self.cookies.get(key).map(String::as_str)
	}

	/// Binds a path variable; called by the router after pattern matching.
	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.path_params.insert(key.into(), value.into());
	}

	/// The per-request session object.
	pub fn session(&self) -> Session {
		self.session.clone()
	}

	/// The websocket handle, when this request carries one.
	pub fn websocket(&self) -> Option<Arc<Websocket>> {
		self.websocket.clone()
	}

	/// Parses the body as JSON, memoized for the lifetime of the request.
	///
	/// Repeated calls return the same parsed document without touching the
	/// body again.
	///
	/// # Errors
	///
	/// [`BindError::MalformedJson`] if the body is not valid JSON; renders
	/// as 422.
	pub fn json(&self) -> Result<Arc<Value>> {
		self.json
			.get_or_try_init(|| {
				serde_json::from_slice::<Value>(&self.body)
					.map(Arc::new)
					.map_err(BindError::MalformedJson)
			})
			.cloned()
	}

	/// Splits a query string into decoded key/value pairs.
	///
	/// Splits each pair on the first `=` only, so values containing `=`
	/// (Base64 payloads and the like) survive intact.
	fn parse_query(uri: &Uri) -> HashMap<String, String> {
		let Some(query) = uri.query() else {
			return HashMap::new();
		};
		query
			.split('&')
			.filter(|pair| !pair.is_empty())
			.filter_map(|pair| {
				let mut parts = pair.splitn(2, '=');
				let key = parts.next()?;
				let value = parts.next().unwrap_or("");
				Some((Self::decode(key), Self::decode(value)))
			})
			.collect()
	}

	fn decode(raw: &str) -> String {
		percent_decode_str(raw).decode_utf8_lossy().into_owned()
	}

	/// Parses the `Cookie` header, skipping malformed entries.
	///
	/// A cookie without `=`, with an empty name, or with a name containing
	/// separators or control characters (RFC 6265) is dropped rather than
	/// failing the whole request.
	fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
		let Some(header) = headers
			.get(hyper::header::COOKIE)
			.and_then(|v| v.to_str().ok())
		else {
			return HashMap::new();
		};
		let mut cookies = HashMap::new();
		for entry in header.split(';') {
			let entry = entry.trim();
			if entry.is_empty() {
				continue;
			}
			let mut parts = entry.splitn(2, '=');
			let name = parts.next().unwrap_or("").trim();
			let Some(value) = parts.next() else {
				continue;
			};
			if name.is_empty() || !Self::is_valid_cookie_name(name) {
				continue;
			}
			cookies.insert(name.to_string(), value.trim().to_string());
		}
		cookies
	}

	/// RFC 6265 token check: visible ASCII excluding separators.
	fn is_valid_cookie_name(name: &str) -> bool {
		name.chars().all(|c| {
			c.is_ascii_graphic()
				&& !matches!(
					c,
					'(' | ')'
						| '<' | '>' | '@' | ','
						| ';' | ':' | '\\' | '"'
						| '/' | '[' | ']' | '?'
						| '=' | '{' | '}'
				)
		})
	}
}

/// Builder for [`Request`].
pub struct RequestBuilder {
	method: Method,
	uri: String,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	session: Option<Session>,
	websocket: Option<Arc<Websocket>>,
}

impl RequestBuilder {
	fn new() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			session: None,
			websocket: None,
		}
	}

	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Adds a single header, panicking on invalid names or values.
	/// Intended for tests and examples; use [`headers`](Self::headers) for
	/// values produced at runtime.
	pub fn header(mut self, name: &'static str, value: &str) -> Self {
		self.headers.insert(
			name,
			value.parse().unwrap_or_else(|_| {
				panic!("invalid header value for '{name}'");
			}),
		);
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Seeds the request with an existing session (e.g. restored by the host).
	pub fn session(mut self, session: Session) -> Self {
		self.session = Some(session);
		self
	}

	/// Marks the request as a websocket connection carrying this handle.
	pub fn websocket(mut self, websocket: Arc<Websocket>) -> Self {
		self.websocket = Some(websocket);
		self
	}

	/// Builds the request, parsing the URI, query string and cookies.
	pub fn build(self) -> Result<Request, InvalidUri> {
		let uri: Uri = self.uri.parse()?;
		let query_params = Request::parse_query(&uri);
		let cookies = Request::parse_cookies(&self.headers);
		Ok(Request {
			method: self.method,
			uri,
			version: self.version,
			headers: self.headers,
			body: self.body,
			path_params: HashMap::new(),
			query_params,
			cookies,
			session: self.session.unwrap_or_default(),
			websocket: self.websocket,
			json: OnceCell::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn request(uri: &str) -> Request {
		Request::builder().uri(uri).build().unwrap()
	}

	#[rstest]
	#[case("/t?token=abc==", "token", "abc==")]
	#[case("/t?data=dGVzdA==", "data", "dGVzdA==")]
	#[case("/t?formula=a=b=c", "formula", "a=b=c")]
	#[case("/t?key=value", "key", "value")]
	#[case("/t?key=", "key", "")]
	fn test_query_param_preserves_equals_in_value(
		#[case] uri: &str,
		#[case] key: &str,
		#[case] expected: &str,
	) {
		assert_eq!(request(uri).query_param(key), Some(expected));
	}

	#[rstest]
	fn test_query_param_percent_decoded() {
		let req = request("/t?name=John%20Doe");
		assert_eq!(req.query_param("name"), Some("John Doe"));
	}

	#[rstest]
	fn test_no_query_string() {
		let req = request("/t");
		assert_eq!(req.query_param("anything"), None);
		assert_eq!(req.query_object(), serde_json::json!({}));
	}

	#[rstest]
	fn test_query_object_collects_all_params() {
		let req = request("/t?a=1&b=2");
		let obj = req.query_object();
		assert_eq!(obj["a"], "1");
		assert_eq!(obj["b"], "2");
	}

	#[rstest]
	fn test_cookie_parsing() {
		let req = Request::builder()
			.uri("/")
			.header("cookie", "session_id=abc123; theme=dark")
			.build()
			.unwrap();
		assert_eq!(req.cookie("session_id"), Some("abc123"));
		assert_eq!(req.cookie("theme"), Some("dark"));
		assert_eq!(req.cookie("missing"), None);
	}

	#[rstest]
	#[case("noequals")]
	#[case("=value")]
	#[case("bad name=v")]
	#[case("bad;name=v")]
	fn test_malformed_cookies_are_skipped(#[case] entry: &str) {
		let header = format!("{entry}; good=1");
		let req = Request::builder()
			.uri("/")
			.header("cookie", &header)
			.build()
			.unwrap();
		assert_eq!(req.cookie("good"), Some("1"));
		assert_eq!(req.cookies.len(), 1);
	}

	#[rstest]
	fn test_json_is_parsed_once() {
		let req = Request::builder()
			.uri("/")
			.body(&b"{\"a\": 5}"[..])
			.build()
			.unwrap();
		let first = req.json().unwrap();
		let second = req.json().unwrap();
		assert_eq!(first["a"], 5);
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[rstest]
	fn test_malformed_json_reports_bind_error() {
		let req = Request::builder()
			.uri("/")
			.body(&b"{not json"[..])
			.build()
			.unwrap();
		let err = req.json().unwrap_err();
		assert!(matches!(err, BindError::MalformedJson(_)));
	}

	#[rstest]
	fn test_path_params_set_by_router() {
		let mut req = request("/users/123");
		req.set_path_param("id", "123");
		assert_eq!(req.path_params.get("id"), Some(&"123".to_string()));
	}
}
