//! HTTP transport shared by the service clients.
//!
//! A [`ServiceClient`] joins URI templates to the API host, signs and sends
//! requests through a pooled [`reqwest::Client`], and decodes either the
//! success body or the problem-detail error body. It never retries: every
//! failure is returned to the caller as-is.

use crate::auth::Signer;
use crate::config::{Credentials, EdgeGridConfig, DEFAULT_MAX_BODY};
use crate::error::{ApiError, Error, Result};
use reqwest::{header::HeaderValue, Client, ClientBuilder, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

// Service-specific timeout configurations (in seconds)

/// Default timeout for Property Manager requests
pub const PAPI_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for Application Security requests
pub const APPSEC_DEFAULT_TIMEOUT: u64 = 60;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Query parameter carrying the account switch key.
pub const ACCOUNT_SWITCH_KEY_PARAM: &str = "accountSwitchKey";

/// HTTP client configuration.
///
/// Configures timeouts and connection pooling of the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable request/response logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    service: &'static str,
    base_url: Url,
    http_config: ClientConfig,
    user_agent: String,
    credentials: Option<Credentials>,
    max_body: usize,
    account_switch_key: Option<String>,
    tls_verify: bool,
}

impl ServiceClientBuilder {
    /// Create a builder for a service reachable at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed.
    pub fn new(service: &'static str, base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref()).map_err(|err| {
            Error::InvalidEndpoint(format!(
                "Invalid {service} base URL `{}`: {err}",
                base_url.as_ref()
            ))
        })?;

        Ok(Self {
            service,
            base_url,
            http_config: ClientConfig::new().with_timeout(timeout),
            user_agent: format!("edgegrid-core/{}", env!("CARGO_PKG_VERSION")),
            credentials: None,
            max_body: DEFAULT_MAX_BODY,
            account_switch_key: None,
            tls_verify: true,
        })
    }

    /// Create a builder from an [`EdgeGridConfig`]: host, credentials,
    /// account switch key, timeout and TLS settings are all taken from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, or an
    /// error if the configured host is not a valid URL.
    pub fn from_config(service: &'static str, config: &EdgeGridConfig) -> Result<Self> {
        config.ensure_valid()?;
        let base_url = config.base_url()?;
        let mut builder = Self::new(service, base_url.as_str(), config.timeout())?
            .with_credentials(config.credentials.clone())
            .with_max_body(config.max_body)
            .with_tls_verify(config.tls_verify);
        if let Some(key) = &config.account_switch_key {
            builder = builder.with_account_switch_key(key.clone());
        }
        Ok(builder)
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Sign every request with EdgeGrid credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Limit the number of body bytes covered by the signature.
    #[must_use]
    pub const fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    /// Act on behalf of another account.
    #[must_use]
    pub fn with_account_switch_key(mut self, key: impl Into<String>) -> Self {
        self.account_switch_key = Some(key.into());
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ServiceClient> {
        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent)
            .timeout(self.http_config.timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT))
            .gzip(self.http_config.enable_compression);

        if !self.tls_verify {
            warn!(service = self.service, "TLS verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|err| {
            Error::Config(format!("Failed to build {} HTTP client: {err}", self.service))
        })?;

        Ok(ServiceClient {
            http,
            base_url: self.base_url,
            service: self.service,
            signer: self
                .credentials
                .map(|credentials| Signer::new(credentials).with_max_body(self.max_body)),
            account_switch_key: self.account_switch_key,
            logging: self.http_config.enable_logging,
        })
    }
}

/// Build an absolute request path from its segments, percent-encoding each
/// one so caller-supplied ids cannot add segments, a query or a fragment.
///
/// # Errors
///
/// Returns [`Error::Request`] for `.` or `..` segments, which URL parsing
/// would resolve whatever their encoding.
pub fn encode_path(segments: &[&str]) -> Result<String> {
    if let Some(segment) = segments.iter().find(|s| matches!(**s, "." | "..")) {
        return Err(Error::Request(format!("invalid path segment `{segment}`")));
    }

    let mut url = Url::parse("http://localhost/")?;
    url.path_segments_mut()
        .map_err(|()| Error::Request("cannot build request path".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Signed JSON transport for one EdgeGrid API.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    service: &'static str,
    signer: Option<Signer>,
    account_switch_key: Option<String>,
    logging: bool,
}

impl ServiceClient {
    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the service name used in logs and errors.
    #[must_use]
    pub const fn service(&self) -> &'static str {
        self.service
    }

    /// Resolve a URI template path against the base URL and add query pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined to the base URL.
    pub fn url(&self, path: &str, params: &[(&'static str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid {} path `{path}`: {err}", self.service))
        })?;

        if !params.is_empty() || self.account_switch_key.is_some() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(key) = &self.account_switch_key {
                query.append_pair(ACCOUNT_SWITCH_KEY_PARAM, key);
            }
        }

        Ok(url)
    }

    /// Send a request and return the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the transport fails.
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        headers: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path, params)?;
        let payload = match body {
            Some(body) => serde_json::to_vec(body)
                .map_err(|err| Error::Request(format!("failed to encode request body: {err}")))?,
            None => Vec::new(),
        };

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header("Accept", "application/json");

        for (name, value) in headers {
            let value = HeaderValue::from_str(value)
                .map_err(|err| Error::Request(format!("invalid header {name}: {err}")))?;
            request = request.header(*name, value);
        }

        if let Some(signer) = &self.signer {
            request = request.header("Authorization", signer.authorization(&method, &url, &payload));
        }

        if body.is_some() {
            request = request
                .header("Content-Type", "application/json")
                .body(payload);
        }

        if self.logging {
            debug!(service = self.service, %method, path = url.path(), "sending request");
        }

        let response = request.send().await.map_err(Error::from)?;

        if self.logging {
            debug!(
                service = self.service,
                status = response.status().as_u16(),
                "received response"
            );
        }

        Ok(response)
    }

    /// Decode a JSON success body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body does not match `R`.
    pub async fn decode<R>(&self, response: Response) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let bytes = response.bytes().await.map_err(Error::from)?;
        serde_json::from_slice(&bytes).map_err(|err| {
            Error::Decode(format!("failed to decode {} response: {err}", self.service))
        })
    }

    /// Turn a non-success response into [`Error::Api`].
    pub async fn api_error(&self, response: Response) -> Error {
        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => ApiError::from_body(status, &body).into(),
            Err(err) => {
                error!(service = self.service, "reading error response body: {err}");
                ApiError::unreadable(status, err).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn builder(server: &MockServer) -> ServiceClientBuilder {
        ServiceClientBuilder::new("papi", server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(60))
            .with_pool_idle_timeout(Duration::from_secs(120))
            .with_pool_max_idle(20)
            .with_logging(false)
            .with_compression(false);

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert!(!config.enable_logging);
        assert!(!config.enable_compression);
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.pool_max_idle_per_host, DEFAULT_POOL_MAX_IDLE_PER_HOST);
    }

    #[test]
    fn builder_rejects_bad_base_url() {
        let err = ServiceClientBuilder::new("papi", "not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn url_joins_absolute_paths_and_query() {
        let client = ServiceClientBuilder::new(
            "papi",
            "https://akab-host.luna.akamaiapis.net",
            Duration::from_secs(5),
        )
        .unwrap()
        .with_account_switch_key("1-ABC")
        .build()
        .unwrap();

        let url = client
            .url(
                "/papi/v1/includes/inc_1/versions",
                &[("contractId", "ctr_1".into()), ("groupId", "grp_2".into())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://akab-host.luna.akamaiapis.net/papi/v1/includes/inc_1/versions?contractId=ctr_1&groupId=grp_2&accountSwitchKey=1-ABC"
        );
    }

    #[test]
    fn from_config_uses_host() {
        let config = EdgeGridConfig::new(
            "akab-host.luna.akamaiapis.net",
            Credentials::new("client", "secret", "access"),
        )
        .unwrap();
        let client = ServiceClientBuilder::from_config("appsec", &config)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://akab-host.luna.akamaiapis.net/");
        assert_eq!(client.service(), "appsec");
    }

    #[test]
    fn encode_path_escapes_segments() {
        assert_eq!(
            encode_path(&["papi", "v1", "includes", "inc_12345", "versions"]).unwrap(),
            "/papi/v1/includes/inc_12345/versions"
        );
        assert_eq!(
            encode_path(&["papi", "v1", "includes", "inc/1?x=y#z", "versions"]).unwrap(),
            "/papi/v1/includes/inc%2F1%3Fx=y%23z/versions"
        );
        assert_eq!(
            encode_path(&["papi", "v1", "includes", "%2e%2e"]).unwrap(),
            "/papi/v1/includes/%252e%252e"
        );
        assert!(matches!(
            encode_path(&["papi", "v1", "includes", ".."]),
            Err(Error::Request(_))
        ));
    }

    #[test]
    fn encoded_path_stays_under_base() {
        let client = ServiceClientBuilder::new(
            "papi",
            "https://akab-host.luna.akamaiapis.net",
            Duration::from_secs(5),
        )
        .unwrap()
        .build()
        .unwrap();

        let path = encode_path(&["papi", "v1", "includes", "../../x?y", "versions"]).unwrap();
        let url = client.url(&path, &[]).unwrap();
        assert_eq!(url.path(), "/papi/v1/includes/..%2F..%2Fx%3Fy/versions");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn max_body_applies_in_any_setter_order() {
        let url = Url::parse("https://akab-host.luna.akamaiapis.net/papi/v1/x").unwrap();
        let credentials = Credentials::new("client", "secret", "access");
        let base = ServiceClientBuilder::new("papi", url.as_str(), Duration::from_secs(5)).unwrap();

        let before = base
            .clone()
            .with_max_body(4)
            .with_credentials(credentials.clone())
            .build()
            .unwrap();
        let after = base
            .with_credentials(credentials)
            .with_max_body(4)
            .build()
            .unwrap();

        for client in [before, after] {
            let signer = client.signer.as_ref().unwrap();
            let a = signer.sign(&Method::POST, &url, b"abcdXXXX", "20221027T12:27:54+0000", "n");
            let b = signer.sign(&Method::POST, &url, b"abcdYYYY", "20221027T12:27:54+0000", "n");
            assert_eq!(a, b);
        }
    }

    #[test]
    fn from_config_rejects_invalid_settings() {
        let config = EdgeGridConfig::new(
            "akab-host.luna.akamaiapis.net",
            Credentials::new("client", "secret", "access"),
        )
        .unwrap();

        let err = ServiceClientBuilder::from_config("papi", &config.clone().with_timeout(0))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ServiceClientBuilder::from_config("papi", &config.with_max_body(0)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn execute_signs_and_sends_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/papi/v1/search/find-by-value"))
            .and(header("Content-Type", "application/json"))
            .and(header("PAPI-Use-Prefixes", "false"))
            .and(header_exists("Authorization"))
            .and(body_json(json!({"hostname": "www.example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = builder(&server)
            .with_credentials(Credentials::new("client", "secret", "access"))
            .build()
            .unwrap();

        let response = client
            .execute(
                Method::POST,
                "/papi/v1/search/find-by-value",
                &[],
                &[("PAPI-Use-Prefixes", "false".to_string())],
                Some(&json!({"hostname": "www.example.com"})),
            )
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let value: serde_json::Value = client.decode(response).await.unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn execute_appends_account_switch_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appsec/v1/configs/1/versions/2"))
            .and(query_param("accountSwitchKey", "1-ABC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = builder(&server)
            .with_account_switch_key("1-ABC")
            .build()
            .unwrap();
        let response = client
            .execute::<()>(Method::GET, "/appsec/v1/configs/1/versions/2", &[], &[], None)
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn api_error_decodes_problem_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/papi/v1/includes/inc_1/versions/1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "type": "internal_error",
                "title": "Internal Server Error",
                "detail": "Error getting include",
                "status": 500
            })))
            .mount(&server)
            .await;

        let client = builder(&server).build().unwrap();
        let response = client
            .execute::<()>(Method::GET, "/papi/v1/includes/inc_1/versions/1", &[], &[], None)
            .await
            .unwrap();
        let err = client.api_error(response).await;

        let expected = ApiError {
            error_type: "internal_error".into(),
            title: "Internal Server Error".into(),
            detail: "Error getting include".into(),
            status: 500,
            ..ApiError::default()
        };
        assert_eq!(err, Error::from(expected));
    }

    #[tokio::test]
    async fn decode_reports_mismatched_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/papi/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = builder(&server).build().unwrap();
        let response = client
            .execute::<()>(Method::GET, "/papi/v1/search", &[], &[], None)
            .await
            .unwrap();
        let err = client
            .decode::<serde_json::Value>(response)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
