use anyhow::{Context, Error, Result};
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

const fn _default_proxy_port() -> u16 { 60061 }
const fn _default_metrics_port() -> u16 { 60062 }
const fn _default_bind_address() -> IpAddr { IpAddr::V4(Ipv4Addr::LOCALHOST) }
// Same as the default HttpClient timeout the functions were originally deployed with.
const fn _default_upstream_timeout_secs() -> u64 { 100 }
// Inbound payloads are small JSON documents; anything this size is a mistake.
const fn _default_max_body_bytes() -> usize { 10 * 1024 * 1024 }

pub(crate) const NEXT_PATH_KEY: &str = "Proxy:ActualNextFunctionPath";
pub(crate) const NEXT_SECRET_KEY: &str = "Proxy:ActualNextFunctionSecret";
pub(crate) const ACKNOWLEDGE_PATH_KEY: &str = "Proxy:ActualAcknowledgeFunctionPath";
pub(crate) const ACKNOWLEDGE_SECRET_KEY: &str = "Proxy:ActualAcknowledgeFunctionSecret";
pub(crate) const USERNAME_KEY: &str = "Proxy:OLIUserName";
pub(crate) const PASSWORD_KEY: &str = "Proxy:OLIPassword";

const REDACTED: &str = "<redacted>";

#[derive(Deserialize, Clone)]
pub(crate) struct ProxyConfig {
    #[serde(default = "_default_proxy_port")]
    pub(crate) proxy_port: u16,
    #[serde(default = "_default_metrics_port")]
    pub(crate) metrics_port: u16,
    #[serde(default = "_default_bind_address")]
    pub(crate) bind_address: IpAddr,
    #[serde(default = "_default_upstream_timeout_secs")]
    pub(crate) upstream_timeout_secs: u64,
    #[serde(default = "_default_max_body_bytes")]
    pub(crate) max_body_bytes: usize,
    #[serde(default)]
    pub(crate) https_only: bool,
    #[serde(default)]
    pub(crate) local_testers: bool,
    /// Complete URI of the "next" function, without any query string.
    #[serde(default)]
    pub(crate) next_target_base: String,
    /// `name=value` query fragment, e.g. `code=...` or `sig=...`.
    #[serde(default)]
    pub(crate) next_target_secret: String,
    /// URI of the "acknowledge" function up to and including the
    /// submission id parameter, e.g. `https://host/api/acknowledge?submissionid=`.
    #[serde(default)]
    pub(crate) acknowledge_target_base: String,
    #[serde(default)]
    pub(crate) acknowledge_target_secret: String,
    #[serde(default)]
    pub(crate) expected_username: String,
    #[serde(default)]
    pub(crate) expected_password: String,
}

// Hand-written so the secrets and the password never end up in logs.
impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("proxy_port", &self.proxy_port)
            .field("metrics_port", &self.metrics_port)
            .field("bind_address", &self.bind_address)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("https_only", &self.https_only)
            .field("local_testers", &self.local_testers)
            .field("next_target_base", &self.next_target_base)
            .field("next_target_secret", &REDACTED)
            .field("acknowledge_target_base", &self.acknowledge_target_base)
            .field("acknowledge_target_secret", &REDACTED)
            .field("expected_username", &self.expected_username)
            .field("expected_password", &REDACTED)
            .finish()
    }
}

impl ProxyConfig {
    /// Reads the optional TOML file, overlays the `Proxy:*` environment
    /// variables and validates the result.
    pub(crate) fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config: ProxyConfig = match config_file {
            Some(path) => toml::from_str(
                &std::fs::read_to_string(path)
                    .with_context(|| format!("Couldn't read config file {}", path.display()))?,
            )?,
            None => toml::from_str("")?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields with values found by `lookup`. Each key is tried as
    /// written and then with `__` in place of `:`, since Linux app hosts
    /// can't carry colons in variable names.
    pub(crate) fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 6] = [
            (NEXT_PATH_KEY, &mut self.next_target_base),
            (NEXT_SECRET_KEY, &mut self.next_target_secret),
            (ACKNOWLEDGE_PATH_KEY, &mut self.acknowledge_target_base),
            (ACKNOWLEDGE_SECRET_KEY, &mut self.acknowledge_target_secret),
            (USERNAME_KEY, &mut self.expected_username),
            (PASSWORD_KEY, &mut self.expected_password),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).or_else(|| lookup(&key.replace(':', "__"))) {
                *field = value;
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let required = [
            (NEXT_PATH_KEY, &self.next_target_base),
            (NEXT_SECRET_KEY, &self.next_target_secret),
            (ACKNOWLEDGE_PATH_KEY, &self.acknowledge_target_base),
            (ACKNOWLEDGE_SECRET_KEY, &self.acknowledge_target_secret),
            (USERNAME_KEY, &self.expected_username),
            (PASSWORD_KEY, &self.expected_password),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(Error::msg(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )));
        }

        anyhow::ensure!(
            self.upstream_timeout_secs > 0,
            "upstream_timeout_secs must be greater than zero"
        );
        anyhow::ensure!(
            self.max_body_bytes > 0,
            "max_body_bytes must be greater than zero"
        );
        anyhow::ensure!(
            !self.next_target_base.contains('?'),
            "{NEXT_PATH_KEY} must not carry a query string"
        );
        anyhow::ensure!(
            self.acknowledge_target_base.contains('?'),
            "{ACKNOWLEDGE_PATH_KEY} must end with the submission id query parameter"
        );

        if self.https_only {
            for (key, base) in [
                (NEXT_PATH_KEY, &self.next_target_base),
                (ACKNOWLEDGE_PATH_KEY, &self.acknowledge_target_base),
            ] {
                anyhow::ensure!(
                    base.starts_with("https://"),
                    "{key} must be an https URI when https_only is set"
                );
            }
        }
        Ok(())
    }
}
