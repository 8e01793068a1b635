use axum::{
    http,
    response::{IntoResponse, Response},
};

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::Unauthorized => write!(f, "Unauthorized"),
            ProxyError::InvalidSubmissionId => write!(f, "Invalid submission id"),
            ProxyError::PayloadTooLarge => write!(f, "Request body too large"),
            ProxyError::UpstreamTransport(error) => write!(f, "Upstream transport failure: {}", error),
            ProxyError::Internal(error) => write!(f, "{}", error),
        }
    }
}

pub(crate) enum ProxyError {
    Unauthorized,
    InvalidSubmissionId,
    PayloadTooLarge,
    /// The upstream call failed before a response arrived. The URL has
    /// already been stripped from the error.
    UpstreamTransport(reqwest::Error),
    Internal(anyhow::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Unauthorized => http::StatusCode::UNAUTHORIZED.into_response(),
            ProxyError::InvalidSubmissionId => http::StatusCode::BAD_REQUEST.into_response(),
            ProxyError::PayloadTooLarge => http::StatusCode::PAYLOAD_TOO_LARGE.into_response(),
            ProxyError::UpstreamTransport(_) => http::StatusCode::BAD_GATEWAY.into_response(),
            ProxyError::Internal(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            )
                .into_response(),
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamTransport(err.without_url())
    }
}
