use axum::{
    body::{to_bytes, Body, Bytes},
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 1024;

/// Logs every 4xx/5xx response with its `{error}` body. Client errors are
/// warnings, server errors are errors. The buffered body is forwarded
/// unchanged.
pub async fn log_error_responses(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    let (mut parts, body) = response.into_parts();
    let (body, preview) = match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
        Ok(bytes) => {
            let preview = body_preview(&bytes);
            (Body::from(bytes), preview)
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            (Body::empty(), format!("<unreadable body: {err}>"))
        }
    };

    let status = status.as_u16();
    if status >= 500 {
        tracing::error!(
            status,
            method = %method,
            uri = %uri,
            request_id = %request_id,
            latency_ms,
            body = %preview,
            "Request completed with error status"
        );
    } else {
        tracing::warn!(
            status,
            method = %method,
            uri = %uri,
            request_id = %request_id,
            latency_ms,
            body = %preview,
            "Request completed with error status"
        );
    }

    Response::from_parts(parts, body)
}

fn body_preview(bytes: &Bytes) -> String {
    if bytes.len() > MAX_LOGGED_BODY_BYTES {
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&bytes[..MAX_LOGGED_BODY_BYTES]),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_logged_verbatim() {
        let bytes = Bytes::from_static(br#"{"error":"Title required"}"#);
        assert_eq!(body_preview(&bytes), r#"{"error":"Title required"}"#);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let bytes = Bytes::from(vec![b'x'; MAX_LOGGED_BODY_BYTES + 10]);
        let preview = body_preview(&bytes);
        assert!(preview.ends_with(&format!("(truncated, {} bytes total)", MAX_LOGGED_BODY_BYTES + 10)));
    }
}
