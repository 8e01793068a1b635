use crate::metrics::consts::*;
use std::time::Instant;

use axum::{
    extract::Request,
    http::{self, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};

pub(crate) async fn metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();

    // The body is left for the handler to read, so an unauthenticated caller
    // is always answered by the credential check rather than a size limit.
    if let Some(request_size) = request
        .headers()
        .get(http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
    {
        histogram!(HTTP_REQUEST_SIZE_BYTES).record(request_size as f64);
    }

    let response = next.run(request).await;

    let (response_parts, response_body) = response.into_parts();
    // Already buffered by the handler; upstream bodies aren't size limited.
    let response_body_bytes = match axum::body::to_bytes(response_body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!(%error, "Couldn't read response body.");
            counter!(PROXY_HTTP_SERVER_ERROR).increment(1);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    histogram!(HTTP_RESPONSE_SIZE_BYTES).record(response_body_bytes.len() as f64);

    // This could be the upstream or the proxy itself.
    if response_parts.status.is_server_error() {
        counter!(PROXY_HTTP_SERVER_ERROR).increment(1)
    }

    if response_parts.status.is_success() {
        counter!(HTTP_RESPONSE_SUCCESS).increment(1)
    } else {
        counter!(HTTP_RESPONSE_FAILURE).increment(1)
    }

    histogram!(HTTP_REQUEST_DURATION_SECS).record(start.elapsed().as_secs_f64());

    Response::from_parts(response_parts, response_body_bytes.into())
}
