use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, Limited};
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ServerError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Form bodies declaring at most this many bytes are buffered and echoed to
/// the debug log.  Every other body is streamed through untouched.
const MAX_LOGGED_BODY: usize = 1024;

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    // Reuse a caller-supplied trace id when it is a UUID.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("→ request started");
        let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let mut response = match buffer_and_log(&parts.headers, body).await {
            Ok(body) => {
                let mut req = Request::from_parts(parts, body);
                if let Some(value) = &trace_header {
                    req.headers_mut().insert(X_TRACE_ID, value.clone());
                }
                next.run(req).await
            }
            Err(e) => e.into_response(),
        };
        if let Some(value) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Buffer small form submissions so they can be logged at debug level.
///
/// Only `application/x-www-form-urlencoded` bodies with a `Content-Length` of
/// at most [`MAX_LOGGED_BODY`] are read, and the read is capped at that size
/// even if the header understates the body.
async fn buffer_and_log(headers: &header::HeaderMap, body: Body) -> Result<Body, ServerError> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    let declared_len = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if !is_form || !declared_len.is_some_and(|len| len <= MAX_LOGGED_BODY) {
        return Ok(body);
    }

    let bytes = Limited::new(body, MAX_LOGGED_BODY)
        .collect()
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to buffer request body");
            ServerError::BadRequest("unreadable request body".to_owned())
        })?
        .to_bytes();

    if let Ok(text) = std::str::from_utf8(&bytes) {
        debug!(body = %text, "request form body");
    }
    Ok(Body::from(bytes))
}
