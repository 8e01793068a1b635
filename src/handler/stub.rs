//! Fixed-response stand-ins for the real upstream functions, handy as
//! targets when running the proxy against itself locally.

use axum::extract::Query;
use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct LocalAcknowledgeQuery {
    #[serde(rename = "formSubmissionId")]
    form_submission_id: Option<String>,
}

/// `POST /LocalNextTester`
pub(crate) async fn local_next_tester() -> &'static str {
    "I go next next next"
}

/// `POST /LocalAcknowledgeTester?formSubmissionId=...`
pub(crate) async fn local_acknowledge_tester(Query(query): Query<LocalAcknowledgeQuery>) -> String {
    format!(
        "I acknowledge that you sent:{}",
        query.form_submission_id.unwrap_or_default()
    )
}
