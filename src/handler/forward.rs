use super::basic_auth;
use super::errors::ProxyError;
use super::state::ProxyState;
use super::target::{is_valid_submission_id, Target, ACKNOWLEDGE_ROUTE};
use crate::metrics::consts as crate_metrics;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::PathRejection, FromRequest, Path, Request, State},
    http::{self, HeaderMap},
    response::{IntoResponse, Response},
};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Instant;
use tracing::instrument;

const APPLICATION_JSON: &str = "application/json";

fn uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `POST /Next`
#[instrument(skip_all, level = tracing::Level::DEBUG, fields(request_id=uuid()))]
pub(crate) async fn next(
    State(state): State<ProxyState>,
    client_request: Request<Body>,
) -> Result<Response, ProxyError> {
    let target = Target::Next;
    authenticate(&state, target.route_name(), client_request.headers())?;
    forward(&state, target, client_request).await
}

/// `POST /{submission_id}/Acknowledge`
///
/// The path is taken as a `Result` so a malformed segment is only reported
/// once the caller has authenticated.
#[instrument(skip_all, level = tracing::Level::DEBUG, fields(request_id=uuid(), submission_id = tracing::field::Empty))]
pub(crate) async fn acknowledge(
    State(state): State<ProxyState>,
    submission_id: Result<Path<String>, PathRejection>,
    client_request: Request<Body>,
) -> Result<Response, ProxyError> {
    let route = ACKNOWLEDGE_ROUTE;
    authenticate(&state, route, client_request.headers())?;

    let Ok(Path(submission_id)) = submission_id else {
        tracing::warn!(route, "Rejected undecodable submission id.");
        return Err(ProxyError::InvalidSubmissionId);
    };
    tracing::Span::current().record("submission_id", submission_id.as_str());
    if !is_valid_submission_id(&submission_id) {
        tracing::warn!(route, "Rejected submission id that would corrupt the upstream query.");
        return Err(ProxyError::InvalidSubmissionId);
    }

    forward(
        &state,
        Target::Acknowledge {
            submission_id: &submission_id,
        },
        client_request,
    )
    .await
}

fn authenticate(
    state: &ProxyState,
    route: &'static str,
    client_request_headers: &HeaderMap,
) -> Result<(), ProxyError> {
    let client_authorization_header = client_request_headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if !basic_auth::validate(client_authorization_header, &state.credential) {
        tracing::warn!(route, "Rejected request with missing or invalid credentials.");
        metrics::counter!(crate_metrics::PROXY_AUTHENTICATION_FAILURE, crate_metrics::ROUTE_LABEL => route)
            .increment(1);
        return Err(ProxyError::Unauthorized);
    }
    Ok(())
}

/// Makes exactly one POST to the upstream for an authenticated request and
/// hands back its status and body untouched, whatever the status is.
async fn forward(
    state: &ProxyState,
    target: Target<'_>,
    client_request: Request<Body>,
) -> Result<Response, ProxyError> {
    let route = target.route_name();

    let proxy_request_body_bytes = Bytes::from_request(client_request, state)
        .await
        .map_err(|rejection| {
            tracing::warn!(route, status = %rejection.status(), "Couldn't read request body.");
            if rejection.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
                ProxyError::PayloadTooLarge
            } else {
                ProxyError::Internal(anyhow::Error::msg(rejection.body_text()))
            }
        })?;
    tracing::debug!(route, body_bytes = proxy_request_body_bytes.len());

    let reqwest_start = Instant::now();
    let server_response = state
        .http_client
        .post(target.url(&state.config))
        .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
        .body(proxy_request_body_bytes)
        .send()
        .await
        .map_err(|error| upstream_transport_failure(route, error))?;

    let server_response_status = server_response.status();
    let server_response_content_type = server_response.headers().get(CONTENT_TYPE).cloned();
    let server_response_body = server_response
        .bytes()
        .await
        .map_err(|error| upstream_transport_failure(route, error))?;

    metrics::histogram!(crate_metrics::UPSTREAM_REQUEST_DURATION_SECS, crate_metrics::ROUTE_LABEL => route)
        .record(reqwest_start.elapsed().as_secs_f64());

    tracing::info!(
        route,
        %server_response_status,
        body_bytes = server_response_body.len()
    );

    let mut proxy_response = (server_response_status, server_response_body).into_response();
    match server_response_content_type {
        Some(content_type) => proxy_response.headers_mut().insert(CONTENT_TYPE, content_type),
        None => proxy_response.headers_mut().remove(CONTENT_TYPE),
    };
    Ok(proxy_response)
}

fn upstream_transport_failure(route: &'static str, error: reqwest::Error) -> ProxyError {
    let error = ProxyError::from(error);
    tracing::error!(route, %error, "Upstream call failed.");
    metrics::counter!(crate_metrics::UPSTREAM_TRANSPORT_FAILURE, crate_metrics::ROUTE_LABEL => route)
        .increment(1);
    error
}
