use std::sync::Arc;

use super::basic_auth::Credential;
use crate::config::ProxyConfig;

#[derive(Clone)]
pub(crate) struct ProxyState {
    pub(crate) config: Arc<ProxyConfig>,
    pub(crate) credential: Arc<Credential>,
    pub(crate) http_client: reqwest::Client,
}

impl ProxyState {
    pub(crate) fn new(config: ProxyConfig, http_client: reqwest::Client) -> Self {
        let credential = Credential {
            username: config.expected_username.clone(),
            password: config.expected_password.clone(),
        };
        ProxyState {
            config: Arc::new(config),
            credential: Arc::new(credential),
            http_client,
        }
    }
}
