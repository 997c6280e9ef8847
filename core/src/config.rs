//! Client configuration.
//!
//! Layered from built-in defaults and `HRMS_*` environment variables, e.g.
//! `HRMS_API_URL=https://hr.example.com/api`.

use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

use crate::client::HrmsClient;

/// Local development backend.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

const ENV_PREFIX: &str = "HRMS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid client configuration: {0}")]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is joined to.
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Read the configuration from an explicit set of variables, as if they
    /// were the environment. Keys carry the `HRMS_` prefix.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::from_environment(Environment::with_prefix(ENV_PREFIX).source(Some(source)))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .add_source(environment)
            .build()?
            .try_deserialize::<Self>()?;
        tracing::debug!(api_url = %config.api_url, "client configuration loaded");
        Ok(config)
    }

    pub fn client(&self) -> HrmsClient {
        HrmsClient::new(&self.api_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_backend() {
        let config = ClientConfig::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://127.0.0.1:8000/api");
    }

    #[test]
    fn prefixed_variable_overrides_default() {
        let config = ClientConfig::from_vars([("HRMS_API_URL", "https://hr.example.com/api/")]).unwrap();
        assert_eq!(config.api_url, "https://hr.example.com/api/");
        assert_eq!(config.client().base_url(), "https://hr.example.com/api");
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = ClientConfig::from_vars([("API_URL", "http://elsewhere")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
