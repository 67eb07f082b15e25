//! Client settings.
//!
//! Values come from built-in defaults, then an optional config file, then
//! `BITWARDEN_*` environment variables. The result is validated into a
//! `ClientConfig` before anything is wired.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::auth::AuthStyle;

/// Default organization API base URL.
pub const DEFAULT_API_URL: &str = "https://api.bitwarden.com/public";
/// Default identity token endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://identity.bitwarden.com/connect/token";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_PREFIX: &str = "BITWARDEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value is absent or blank.
    #[error("missing configuration value `{field}` (set {env_var})")]
    Missing {
        /// Configuration key.
        field: &'static str,
        /// Environment variable that supplies it.
        env_var: &'static str,
    },

    /// A value is present but unusable.
    #[error("invalid configuration value `{field}`: {message}")]
    Invalid {
        /// Configuration key.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The config file or environment could not be read.
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// Raw, unvalidated values as deserialized from all sources.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<SecretString>,
    api_url: String,
    #[serde(default)]
    auth_url: Option<String>,
    #[serde(default)]
    authentication_url: Option<String>,
    timeout_secs: u64,
    #[serde(default)]
    user_agent: Option<String>,
    retry_on_unauthorized: bool,
    #[serde(default)]
    auth_style: Option<String>,
}

/// Validated settings for talking to the organization API.
#[derive(Debug)]
pub struct ClientConfig {
    /// OAuth2 client id (`organization.<uuid>`).
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Base URL of the resource endpoints.
    pub api_url: Url,
    /// Token endpoint.
    pub auth_url: Url,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether a 401 triggers one refresh-and-retry.
    pub retry_on_unauthorized: bool,
    /// How client credentials are sent to the token endpoint.
    pub auth_style: AuthStyle,
}

impl ClientConfig {
    /// Settings with the given credentials and every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if either credential is blank.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, ConfigError> {
        let client_id = required(Some(client_id.into()), "client_id", "BITWARDEN_CLIENT_ID")?;
        if client_secret.expose_secret().trim().is_empty() {
            return Err(missing_secret());
        }
        Ok(Self {
            client_id,
            client_secret,
            api_url: parse_url("api_url", DEFAULT_API_URL)?,
            auth_url: parse_url("auth_url", DEFAULT_AUTH_URL)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            retry_on_unauthorized: true,
            auth_style: AuthStyle::default(),
        })
    }

    /// Overrides the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `url` does not parse.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_url("api_url", url)?;
        Ok(self)
    }

    /// Overrides the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `url` does not parse.
    pub fn with_auth_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.auth_url = parse_url("auth_url", url)?;
        Ok(self)
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables the refresh-and-retry after a 401.
    #[must_use]
    pub const fn with_retry_on_unauthorized(mut self, retry: bool) -> Self {
        self.retry_on_unauthorized = retry;
        self
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let client_id = required(raw.client_id, "client_id", "BITWARDEN_CLIENT_ID")?;
        let client_secret = raw
            .client_secret
            .filter(|secret| !secret.expose_secret().trim().is_empty())
            .ok_or_else(missing_secret)?;
        let api_url = required(Some(raw.api_url), "api_url", "BITWARDEN_API_URL")?;
        let auth_url = raw
            .auth_url
            .or(raw.authentication_url)
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let auth_url = required(Some(auth_url), "auth_url", "BITWARDEN_AUTH_URL")?;
        if raw.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            client_id,
            client_secret,
            api_url: parse_url("api_url", &api_url)?,
            auth_url: parse_url("auth_url", &auth_url)?,
            timeout: Duration::from_secs(raw.timeout_secs),
            user_agent: raw
                .user_agent
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or_else(default_user_agent),
            retry_on_unauthorized: raw.retry_on_unauthorized,
            auth_style: parse_auth_style(raw.auth_style.as_deref())?,
        })
    }
}

/// Builds a `ClientConfig` from defaults, a file and the environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    /// A loader reading only defaults and the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a config file (TOML, YAML or JSON by extension).
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads environment variables from `vars` instead of the process
    /// environment.
    #[must_use]
    pub fn with_env(mut self, vars: config::Map<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Source` if a source cannot be read,
    /// `ConfigError::Missing` or `ConfigError::Invalid` if validation fails.
    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("retry_on_unauthorized", true)?;

        if let Some(path) = &self.file {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true)
                .source(self.env.clone()),
        );

        let raw: RawConfig = builder.build()?.try_deserialize()?;
        ClientConfig::from_raw(raw)
    }
}

fn required(
    value: Option<String>,
    field: &'static str,
    env_var: &'static str,
) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { field, env_var })
}

const fn missing_secret() -> ConfigError {
    ConfigError::Missing {
        field: "client_secret",
        env_var: "BITWARDEN_CLIENT_SECRET",
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim_end_matches('/')).map_err(|e| ConfigError::Invalid {
        field,
        message: format!("{e}: {value}"),
    })
}

fn parse_auth_style(value: Option<&str>) -> Result<AuthStyle, ConfigError> {
    match value.map(str::to_lowercase).as_deref() {
        None | Some("params" | "in_params") => Ok(AuthStyle::InParams),
        Some("basic" | "header") => Ok(AuthStyle::BasicHeader),
        Some(other) => Err(ConfigError::Invalid {
            field: "auth_style",
            message: format!("expected `params` or `basic`, got `{other}`"),
        }),
    }
}

fn default_user_agent() -> String {
    format!("orgsync/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> config::Map<String, String> {
        vars.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![
            ("BITWARDEN_CLIENT_ID", "organization.1234"),
            ("BITWARDEN_CLIENT_SECRET", "hunter2"),
        ]
    }

    #[test]
    fn test_defaults_apply() {
        let config = ConfigLoader::new().with_env(env(&credentials())).load().unwrap();

        assert_eq!(config.client_id, "organization.1234");
        assert_eq!(config.client_secret.expose_secret(), "hunter2");
        assert_eq!(config.api_url.as_str(), "https://api.bitwarden.com/public");
        assert_eq!(
            config.auth_url.as_str(),
            "https://identity.bitwarden.com/connect/token"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.retry_on_unauthorized);
        assert_eq!(config.auth_style, AuthStyle::InParams);
    }

    #[test]
    fn test_missing_secret_names_env_var() {
        let error = ConfigLoader::new()
            .with_env(env(&[("BITWARDEN_CLIENT_ID", "organization.1234")]))
            .load()
            .unwrap_err();

        assert!(matches!(
            error,
            ConfigError::Missing {
                field: "client_secret",
                ..
            }
        ));
        assert!(error.to_string().contains("BITWARDEN_CLIENT_SECRET"));
    }

    #[test]
    fn test_blank_client_id_is_missing() {
        let error = ConfigLoader::new()
            .with_env(env(&[
                ("BITWARDEN_CLIENT_ID", "  "),
                ("BITWARDEN_CLIENT_SECRET", "hunter2"),
            ]))
            .load()
            .unwrap_err();
        assert!(matches!(error, ConfigError::Missing { field: "client_id", .. }));
    }

    #[test]
    fn test_env_overrides_and_authentication_url_alias() {
        let mut vars = credentials();
        vars.push(("BITWARDEN_API_URL", "https://vault.example.com/api/public/"));
        vars.push(("BITWARDEN_AUTHENTICATION_URL", "https://vault.example.com/identity/connect/token"));
        vars.push(("BITWARDEN_TIMEOUT_SECS", "5"));

        let config = ConfigLoader::new().with_env(env(&vars)).load().unwrap();

        assert_eq!(config.api_url.as_str(), "https://vault.example.com/api/public");
        assert_eq!(
            config.auth_url.as_str(),
            "https://vault.example.com/identity/connect/token"
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_file_then_env_precedence() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "client_id = \"organization.file\"\nclient_secret = \"from-file\"\n\
             api_url = \"https://file.example.com/public\"\nauth_style = \"basic\""
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .with_env(env(&[("BITWARDEN_CLIENT_ID", "organization.env")]))
            .load()
            .unwrap();

        assert_eq!(config.client_id, "organization.env");
        assert_eq!(config.client_secret.expose_secret(), "from-file");
        assert_eq!(config.api_url.as_str(), "https://file.example.com/public");
        assert_eq!(config.auth_style, AuthStyle::BasicHeader);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut vars = credentials();
        vars.push(("BITWARDEN_API_URL", "not a url"));
        let error = ConfigLoader::new().with_env(env(&vars)).load().unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { field: "api_url", .. }));

        let mut vars = credentials();
        vars.push(("BITWARDEN_AUTH_STYLE", "cookie"));
        let error = ConfigLoader::new().with_env(env(&vars)).load().unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { field: "auth_style", .. }));
    }

    #[test]
    fn test_programmatic_config() {
        let config = ClientConfig::new("organization.1", SecretString::from("s".to_string()))
            .unwrap()
            .with_api_url("http://127.0.0.1:8080")
            .unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8080/");

        assert!(ClientConfig::new("", SecretString::from("s".to_string())).is_err());
    }
}
