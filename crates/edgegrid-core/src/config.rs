//! Configuration structures for EdgeGrid clients.
//!
//! An [`EdgeGridConfig`] names the API host, the EdgeGrid credentials used to
//! sign requests and a handful of transport settings. It can be built in code,
//! deserialized, or read from `AKAMAI_*` environment variables.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default maximum number of body bytes included in the request signature.
pub const DEFAULT_MAX_BODY: usize = 131_072;

/// EdgeGrid API client credentials.
#[derive(Serialize, Deserialize, Validate)]
pub struct Credentials {
    /// Client token
    #[validate(custom(function = "crate::validation::required"))]
    pub client_token: String,

    /// Client secret, used as the HMAC key
    #[serde(skip_serializing, deserialize_with = "deserialize_secret")]
    pub client_secret: SecretString,

    /// Access token
    #[validate(custom(function = "crate::validation::required"))]
    pub access_token: String,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Credentials {
    /// Create credentials from the three EdgeGrid tokens.
    #[must_use]
    pub fn new(
        client_token: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client_token: client_token.into(),
            client_secret: SecretString::from(client_secret.into()),
            access_token: access_token.into(),
        }
    }

    /// Returns true when a non-empty secret is set.
    #[must_use]
    pub fn has_secret(&self) -> bool {
        !self.client_secret.expose_secret().is_empty()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            client_token: self.client_token.clone(),
            client_secret: SecretString::from(self.client_secret.expose_secret().to_owned()),
            access_token: self.access_token.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_token", &self.client_token)
            .field("client_secret", &"[REDACTED]")
            .field("access_token", &self.access_token)
            .finish()
    }
}

/// Configuration for an EdgeGrid client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EdgeGridConfig {
    /// API host, e.g. `akab-xxxx.luna.akamaiapis.net`
    #[validate(custom(function = "crate::validation::required"))]
    pub host: String,

    /// Signing credentials
    #[validate(nested)]
    pub credentials: Credentials,

    /// Account switch key for multi-account access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_switch_key: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum body bytes covered by the signature
    #[validate(range(min = 1))]
    #[serde(default = "default_max_body")]
    pub max_body: usize,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_body() -> usize {
    DEFAULT_MAX_BODY
}

const fn default_tls_verify() -> bool {
    true
}

impl EdgeGridConfig {
    /// Create a new configuration for a host and credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Result<Self, Error> {
        let config = Self {
            host: host.into(),
            credentials,
            account_switch_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_body: default_max_body(),
            tls_verify: default_tls_verify(),
        };

        config.ensure_valid()?;
        Ok(config)
    }

    /// Check the host, tokens, timeout range and body limit.
    ///
    /// The `with_*` setters do not validate; call this after changing them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing every invalid field.
    pub fn ensure_valid(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))
    }

    /// Read the configuration from `AKAMAI_*` environment variables.
    ///
    /// The `default` section reads `AKAMAI_HOST`, `AKAMAI_CLIENT_TOKEN`, ...;
    /// any other section reads `AKAMAI_{SECTION}_HOST` and so on.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or invalid.
    pub fn from_env(section: &str) -> Result<Self, Error> {
        Self::from_lookup(section, |key| std::env::var(key).ok())
    }

    /// Same as [`EdgeGridConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or invalid.
    pub fn from_lookup<F>(section: &str, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = if section.is_empty() || section.eq_ignore_ascii_case("default") {
            "AKAMAI".to_string()
        } else {
            format!("AKAMAI_{}", section.to_uppercase())
        };

        let required = |name: &str| {
            let key = format!("{prefix}_{name}");
            lookup(&key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Config(format!("Missing environment variable {key}")))
        };

        let credentials = Credentials::new(
            required("CLIENT_TOKEN")?,
            required("CLIENT_SECRET")?,
            required("ACCESS_TOKEN")?,
        );
        let mut config = Self::new(required("HOST")?, credentials)?;

        if let Some(key) = lookup(&format!("{prefix}_ACCOUNT_KEY")).filter(|v| !v.is_empty()) {
            config = config.with_account_switch_key(key);
        }

        if let Some(raw) = lookup(&format!("{prefix}_MAX_BODY")) {
            let max_body = raw
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("Invalid {prefix}_MAX_BODY `{raw}`: {e}")))?;
            config = config.with_max_body(max_body);
        }

        config.ensure_valid()?;
        Ok(config)
    }

    /// Set the account switch key.
    #[must_use]
    pub fn with_account_switch_key(mut self, key: impl Into<String>) -> Self {
        self.account_switch_key = Some(key.into());
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the signed body size limit.
    #[must_use]
    pub const fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL derived from the host; `https` unless a scheme is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn base_url(&self) -> Result<Url, Error> {
        let raw = if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.clone()
        } else {
            format!("https://{}", self.host)
        };
        Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid host `{}`: {e}", self.host)))
    }
}
