//! Minimal HTTP/1 server entry point for a wired application.

use crate::app::App;
use crate::request::Request;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Accepts connections on `addr` and dispatches every request through the
/// application. Runs until the listener fails.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hyper_depends::{App, Depends, serve};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut app = App::new();
/// // ... register routes ...
/// Depends::new().init_app(&mut app)?;
///
/// serve(Arc::new(app), "127.0.0.1:8080".parse()?).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(app: Arc<App>, addr: SocketAddr) -> std::io::Result<()> {
	let listener = TcpListener::bind(addr).await?;
	tracing::info!(%addr, "listening");

	loop {
		let (stream, peer) = listener.accept().await?;
		let service = AppService { app: app.clone() };
		tokio::task::spawn(async move {
			let io = TokioIo::new(stream);
			if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
				tracing::warn!(%peer, error = %err, "connection error");
			}
		});
	}
}

struct AppService {
	app: Arc<App>,
}

impl Service<hyper::Request<Incoming>> for AppService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let app = self.app.clone();
		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body = body.collect().await?.to_bytes();

			let request = Request::builder()
				.method(parts.method)
				.uri(parts.uri.to_string())
				.version(parts.version)
				.headers(parts.headers)
				.body(body)
				.build()?;

			let response = app.dispatch(request).await;

			let mut builder = hyper::Response::builder().status(response.status);
			for (key, value) in response.headers.iter() {
				builder = builder.header(key, value);
			}
			Ok(builder.body(Full::new(response.body))?)
		})
	}
}
