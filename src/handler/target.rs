use crate::config::ProxyConfig;

pub(crate) const NEXT_ROUTE: &str = "next";
pub(crate) const ACKNOWLEDGE_ROUTE: &str = "acknowledge";

/// Upstream function a request is forwarded to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Target<'a> {
    Next,
    Acknowledge { submission_id: &'a str },
}

impl Target<'_> {
    pub(crate) fn route_name(&self) -> &'static str {
        match self {
            Target::Next => NEXT_ROUTE,
            Target::Acknowledge { .. } => ACKNOWLEDGE_ROUTE,
        }
    }

    /// Full outbound URL, secret query fragment included. Never log this.
    ///
    /// Neither the secret nor the submission id is escaped: the secret is
    /// pre-formatted and the id has already been checked with
    /// [`is_valid_submission_id`].
    pub(crate) fn url(&self, config: &ProxyConfig) -> String {
        match self {
            Target::Next => format!(
                "{}?{}",
                config.next_target_base, config.next_target_secret
            ),
            Target::Acknowledge { submission_id } => format!(
                "{}{}&{}",
                config.acknowledge_target_base, submission_id, config.acknowledge_target_secret
            ),
        }
    }
}

/// Submission ids are spliced into the query string unescaped, so anything
/// that would end the value, open a new parameter, or be decoded a second
/// time by the upstream (`%`, `+`) is refused.
pub(crate) fn is_valid_submission_id(submission_id: &str) -> bool {
    !submission_id.is_empty()
        && !submission_id.chars().any(|c| {
            matches!(c, '&' | '?' | '#' | '=' | '%' | '+') || c.is_whitespace() || c.is_control()
        })
}
