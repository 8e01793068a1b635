pub(crate) mod basic_auth;
pub(crate) mod errors;
pub(crate) mod forward;
pub(crate) mod middleware;
pub(crate) mod state;
pub(crate) mod stub;
pub(crate) mod target;

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, routing::post, Router};

use state::ProxyState;

pub(crate) fn router(state: ProxyState) -> Router {
    let mut router = Router::new()
        .route("/Next", post(forward::next))
        .route("/{submission_id}/Acknowledge", post(forward::acknowledge));

    if state.config.local_testers {
        router = router
            .route("/LocalNextTester", post(stub::local_next_tester))
            .route("/LocalAcknowledgeTester", post(stub::local_acknowledge_tester));
    }

    // Only enforced where a handler buffers the body, which the gateway
    // does after the credential check.
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    router
        .layer(axum_middleware::from_fn(middleware::metrics))
        .layer(body_limit)
        .with_state(state)
}
