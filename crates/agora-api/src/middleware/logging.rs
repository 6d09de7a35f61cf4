//! Request logging middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, span, warn, Instrument, Level};
use uuid::Uuid;

/// Header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Logging layer function.
pub async fn logging_layer(req: Request, next: Next) -> Response {
    let request_id = extract_or_generate_request_id(&req);
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let span = span!(
        Level::INFO,
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("Request started");

        let response = next.run(req).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        if status >= 500 {
            warn!(status, duration_ms, "Request completed with server error");
        } else if status >= 400 {
            info!(status, duration_ms, "Request completed with client error");
        } else {
            info!(status, duration_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}

fn extract_or_generate_request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
