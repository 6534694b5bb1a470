//! Dependency override behavior, FastAPI style.
//!
//! Verifies that:
//! 1. Dependencies can be overridden for testing purposes
//! 2. Overrides work with sub-dependencies
//! 3. Overrides can be set and cleared dynamically
//! 4. Overrides apply through full request dispatch

use hyper::Method;
use hyper_depends::{
	App, BoundArgs, Depend, Dependency, DependencyContext, Depends, Request, Response, Result,
	endpoint,
};
use serde_json::json;

// Common parameters dependency, reading real query data off the request.
#[derive(Clone, Debug, PartialEq)]
struct CommonParameters {
	q: Option<String>,
	skip: i64,
	limit: i64,
}

#[async_trait::async_trait]
impl Dependency for CommonParameters {
	async fn resolve(ctx: &DependencyContext) -> Result<Self> {
		let request = ctx.request();
		let parse = |key: &str, fallback: i64| {
			request
				.query_param(key)
				.and_then(|v| v.parse().ok())
				.unwrap_or(fallback)
		};
		Ok(Self {
			q: request.query_param("q").map(str::to_string),
			skip: parse("skip", 0),
			limit: parse("limit", 100),
		})
	}
}

// A dependency that itself depends on CommonParameters.
#[derive(Clone, Debug, PartialEq)]
struct PageDescription(String);

#[async_trait::async_trait]
impl Dependency for PageDescription {
	async fn resolve(ctx: &DependencyContext) -> Result<Self> {
		let common = Depend::<CommonParameters>::resolve(ctx).await?;
		Ok(Self(format!(
			"q={} skip={} limit={}",
			common.q.clone().unwrap_or_default(),
			common.skip,
			common.limit
		)))
	}
}

fn common_app() -> App {
	let mut app = App::new();
	app.route(
		"/items",
		Method::GET,
		endpoint(|args: BoundArgs| async move {
			let common = args.depend::<CommonParameters>().await?;
			Ok(Response::json(&json!({
				"q": common.q.clone(),
				"skip": common.skip,
				"limit": common.limit,
			}))
			.unwrap())
		}),
		vec![],
	)
	.unwrap();
	app
}

fn get(uri: &str) -> Request {
	Request::builder().uri(uri).build().unwrap()
}

fn body_json(response: &Response) -> serde_json::Value {
	serde_json::from_slice(&response.body).unwrap()
}

#[tokio::test]
async fn test_without_override_reads_request() {
	let mut app = common_app();
	Depends::new().init_app(&mut app).unwrap();

	let response = app.dispatch(get("/items?q=foo&skip=5")).await;
	assert_eq!(
		body_json(&response),
		json!({"q": "foo", "skip": 5, "limit": 100})
	);
}

#[tokio::test]
async fn test_override_replaces_resolution() {
	let mut app = common_app();
	let depends = Depends::new();
	depends.provider().override_dependency(CommonParameters {
		q: Some("forced".to_string()),
		skip: 5,
		limit: 10,
	});
	depends.init_app(&mut app).unwrap();

	// Request data is ignored entirely once the override is installed.
	let response = app.dispatch(get("/items?q=real&skip=0&limit=1")).await;
	assert_eq!(
		body_json(&response),
		json!({"q": "forced", "skip": 5, "limit": 10})
	);
}

#[tokio::test]
async fn test_override_cleared_restores_normal_resolution() {
	let mut app = common_app();
	let depends = Depends::new();
	depends.provider().override_dependency(CommonParameters {
		q: None,
		skip: 1,
		limit: 1,
	});
	depends.init_app(&mut app).unwrap();

	let response = app.dispatch(get("/items?q=x")).await;
	assert_eq!(body_json(&response)["skip"], 1);

	depends.provider().clear_override::<CommonParameters>();
	let response = app.dispatch(get("/items?q=x")).await;
	assert_eq!(
		body_json(&response),
		json!({"q": "x", "skip": 0, "limit": 100})
	);
}

#[tokio::test]
async fn test_override_applies_to_sub_dependency() {
	let mut app = App::new();
	app.route(
		"/describe",
		Method::GET,
		endpoint(|args: BoundArgs| async move {
			let description = args.depend::<PageDescription>().await?;
			Ok(Response::ok().with_body(description.0.clone()))
		}),
		vec![],
	)
	.unwrap();

	let depends = Depends::new();
	depends.provider().override_dependency(CommonParameters {
		q: Some("sub".to_string()),
		skip: 2,
		limit: 3,
	});
	depends.init_app(&mut app).unwrap();

	let response = app.dispatch(get("/describe")).await;
	assert_eq!(&response.body[..], b"q=sub skip=2 limit=3");
}

#[tokio::test]
async fn test_sub_dependency_shares_request_scoped_instance() {
	#[derive(Clone)]
	struct Pair {
		first: CommonParameters,
		second: CommonParameters,
	}

	#[async_trait::async_trait]
	impl Dependency for Pair {
		async fn resolve(ctx: &DependencyContext) -> Result<Self> {
			let first = Depend::<CommonParameters>::resolve(ctx).await?;
			let second = Depend::<CommonParameters>::resolve(ctx).await?;
			Ok(Self {
				first: (*first.as_arc().clone()).clone(),
				second: (*second.as_arc().clone()).clone(),
			})
		}
	}

	let mut app = App::new();
	app.route(
		"/pair",
		Method::GET,
		endpoint(|args: BoundArgs| async move {
			let pair = args.depend::<Pair>().await?;
			assert_eq!(pair.first, pair.second);
			Ok(Response::ok())
		}),
		vec![],
	)
	.unwrap();
	Depends::new().init_app(&mut app).unwrap();

	let response = app.dispatch(get("/pair?q=same")).await;
	assert_eq!(response.status, hyper::StatusCode::OK);
}
