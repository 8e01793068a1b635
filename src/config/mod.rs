#[allow(clippy::module_inception)]
mod config;

pub(crate) use config::ProxyConfig;

#[cfg(test)]
pub(crate) use config::tests::test_config;
