use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        "access-control-allow-origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// Browsers call the payment endpoints cross-origin. Preflights are answered
/// here without touching the handler or the body.
pub async fn cors(req: Request, next: Next) -> Response {
    if *req.method() == Method::OPTIONS {
        let mut resp = StatusCode::OK.into_response();
        apply_cors_headers(resp.headers_mut());
        return resp;
    }

    let mut resp = next.run(req).await;
    apply_cors_headers(resp.headers_mut());
    resp
}

/// Tags every request with an id (the caller's, if it sent a sane one) and
/// logs its outcome inside a span carrying that id.
pub async fn request_context(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128 && v.chars().all(|c| c.is_ascii_graphic()))
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id
    );

    async move {
        let started = Instant::now();
        let mut resp = next.run(req).await;
        info!(
            status = resp.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            resp.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        resp
    }
    .instrument(span)
    .await
}
