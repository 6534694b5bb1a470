//! Route pattern matching.

use crate::error::WiringError;
use std::collections::HashMap;

/// Maximum pattern length in bytes; longer patterns are rejected at
/// registration to keep the compiled regex bounded.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum compiled regex size.
const MAX_REGEX_SIZE: usize = 1 << 20;

/// A compiled route pattern.
///
/// Supports `{name}` segments (match up to the next `/`) and `{name:*}`
/// wildcards (match the rest of the path, including `/`). Literal text
/// matches exactly.
///
/// # Examples
///
/// ```
/// use hyper_depends::routing::PathPattern;
///
/// let pattern = PathPattern::new("/users/{id}/posts/{post_id}").unwrap();
/// let params = pattern.match_path("/users/7/posts/42").unwrap();
/// assert_eq!(params["id"], "7");
/// assert_eq!(params["post_id"], "42");
/// assert!(pattern.match_path("/users/7").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
	pattern: String,
	regex: regex::Regex,
	param_names: Vec<String>,
}

impl PathPattern {
	/// Compiles a pattern; invalid patterns are a wiring error, fatal at
	/// registration time.
	pub fn new(pattern: &str) -> Result<Self, WiringError> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(WiringError::InvalidPattern {
				pattern: pattern.to_string(),
				reason: format!("pattern exceeds {MAX_PATTERN_LENGTH} bytes"),
			});
		}
		let (regex_str, param_names) = Self::compile(pattern).map_err(|reason| {
			WiringError::InvalidPattern {
				pattern: pattern.to_string(),
				reason,
			}
		})?;
		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| WiringError::InvalidPattern {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			})?;
		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			param_names,
		})
	}

	/// The original pattern string.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Matches a path, returning the captured path variables on success.
	pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
		let captures = self.regex.captures(path)?;
		Some(
			self.param_names
				.iter()
				.enumerate()
				.filter_map(|(i, name)| {
					captures
						.get(i + 1)
						.map(|m| (name.clone(), m.as_str().to_string()))
				})
				.collect(),
		)
	}

	fn compile(pattern: &str) -> Result<(String, Vec<String>), String> {
		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		let mut chars = pattern.chars().peekable();

		while let Some(c) = chars.next() {
			match c {
				'{' => {
					let mut name = String::new();
					let mut wildcard = false;
					loop {
						match chars.next() {
							Some('}') => break,
							Some(':') => {
								match chars.next() {
									Some('*') => wildcard = true,
									_ => return Err("only ':*' is supported after ':'".into()),
								}
								match chars.next() {
									Some('}') => break,
									_ => return Err("expected '}' after ':*'".into()),
								}
							}
							Some(c) if c.is_alphanumeric() || c == '_' => name.push(c),
							Some(c) => {
								return Err(format!("invalid character '{c}' in parameter name"));
							}
							None => return Err("unterminated '{' in pattern".into()),
						}
					}
					if name.is_empty() {
						return Err("empty parameter name".into());
					}
					param_names.push(name);
					regex_str.push_str(if wildcard { "(.*)" } else { "([^/]+)" });
				}
				'}' => return Err("unmatched '}' in pattern".into()),
				c => regex_str.push_str(&regex::escape(&c.to_string())),
			}
		}
		regex_str.push('$');
		Ok((regex_str, param_names))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_exact_match() {
		let pattern = PathPattern::new("/health").unwrap();
		assert!(pattern.match_path("/health").unwrap().is_empty());
		assert!(pattern.match_path("/health/x").is_none());
		assert!(pattern.match_path("/healthz").is_none());
	}

	#[rstest]
	fn test_single_param() {
		let pattern = PathPattern::new("/users/{id}").unwrap();
		let params = pattern.match_path("/users/abc").unwrap();
		assert_eq!(params["id"], "abc");
		assert!(pattern.match_path("/users/a/b").is_none());
	}

	#[rstest]
	fn test_wildcard_spans_segments() {
		let pattern = PathPattern::new("/static/{path:*}").unwrap();
		let params = pattern.match_path("/static/css/site.css").unwrap();
		assert_eq!(params["path"], "css/site.css");
	}

	#[rstest]
	fn test_literal_dots_are_escaped() {
		let pattern = PathPattern::new("/v1.0/ping").unwrap();
		assert!(pattern.match_path("/v1.0/ping").is_some());
		assert!(pattern.match_path("/v1x0/ping").is_none());
	}

	#[rstest]
	#[case("/users/{")]
	#[case("/users/{}")]
	#[case("/users/{id:bad}")]
	#[case("/users/}")]
	fn test_invalid_patterns_fail_registration(#[case] pattern: &str) {
		assert!(matches!(
			PathPattern::new(pattern),
			Err(WiringError::InvalidPattern { .. })
		));
	}
}
