//! Error types for binding and wiring

use hyper::StatusCode;

/// Request-time binding failure.
///
/// Every variant maps to an HTTP status code via [`BindError::status_code`];
/// the dispatcher renders it as a JSON error response. Client-input problems
/// (missing parameter, malformed body) are 422, everything else is a
/// server-side 500.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
	/// A keyed binder found neither a value nor a default.
	#[error("missing required {source_name} parameter '{key}'")]
	MissingParameter {
		source_name: &'static str,
		key: String,
	},

	/// Request body could not be parsed as JSON while a body binder is present.
	#[error("malformed JSON body: {0}")]
	MalformedJson(#[source] serde_json::Error),

	/// A bound value exists but does not deserialize into the requested type.
	#[error("parameter '{param}' has invalid value: {reason}")]
	InvalidParameter { param: String, reason: String },

	/// No value was bound under the requested parameter name.
	#[error("no bound parameter named '{0}'")]
	UnknownParameter(String),

	/// A websocket binder was resolved against a plain HTTP request.
	#[error("request is not a websocket connection")]
	NotWebsocket,

	/// A global binder references a key never registered on the provider.
	#[error("no global registered under key '{0}'")]
	MissingGlobal(String),

	/// Dependency resolution failed inside a [`Dependency`](crate::Dependency) impl.
	#[error("dependency resolution failed: {0}")]
	Dependency(String),

	/// The route was dispatched before the application was wired.
	#[error("application is not wired; call Depends::init_app before serving")]
	NotWired,
}

impl BindError {
	/// Status code this error renders as.
	///
	/// # Examples
	///
	/// ```
	/// use hyper::StatusCode;
	/// use hyper_depends::BindError;
	///
	/// let err = BindError::MissingParameter {
	///     source_name: "query",
	///     key: "page".to_string(),
	/// };
	/// assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
	/// ```
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::MissingParameter { .. }
			| Self::MalformedJson(_)
			| Self::InvalidParameter { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			Self::UnknownParameter(_)
			| Self::NotWebsocket
			| Self::MissingGlobal(_)
			| Self::Dependency(_)
			| Self::NotWired => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// Startup-time configuration failure.
///
/// Raised by [`Depends::init_app`](crate::Depends::init_app) or route
/// registration. Fatal to application boot; never surfaces at request time.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
	/// A whole-object binder (request, session, raw JSON, ...) carries a key.
	#[error("binder for parameter '{param}' ({source_name}) must not carry a key")]
	UnexpectedKey {
		param: String,
		source_name: &'static str,
	},

	/// A keyed source (path, query field, header, ...) is missing its key.
	#[error("binder for parameter '{param}' ({source_name}) requires a key")]
	MissingKey {
		param: String,
		source_name: &'static str,
	},

	/// Two binders on one route target the same parameter name.
	#[error("duplicate binder for parameter '{0}'")]
	DuplicateParam(String),

	/// Route pattern failed to compile.
	#[error("invalid route pattern '{pattern}': {reason}")]
	InvalidPattern { pattern: String, reason: String },
}

pub type Result<T, E = BindError> = std::result::Result<T, E>;
