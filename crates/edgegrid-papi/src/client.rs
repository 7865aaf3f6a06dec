//! Asynchronous Property Manager client implementation.

use crate::models::{
    ActivateIncludeRequest, ActivationBody, ActivationIncludeResponse, ActivationLink,
    ActivationType, AvailableBehaviorsResponse, AvailableCriteriaResponse,
    CreateIncludeVersionRequest, CreateIncludeVersionResponse, DeactivateIncludeRequest,
    DeactivationIncludeResponse, GetIncludeActivationRequest, GetIncludeVersionRequest,
    IncludeActivationResponse, IncludeActivationsResponse, IncludeVersionResponse,
    ListAvailableBehaviorsRequest, ListAvailableCriteriaRequest, ListIncludeActivationsRequest,
    ListIncludeVersionsRequest, SearchRequest, SearchResponse,
};
use crate::Result;
use edgegrid_core::client::{
    encode_path, ClientConfig, ServiceClient, ServiceClientBuilder, PAPI_DEFAULT_TIMEOUT,
};
use edgegrid_core::config::{Credentials, EdgeGridConfig};
use edgegrid_core::validation::validate;
use edgegrid_core::Error;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("edgegrid-papi/", env!("CARGO_PKG_VERSION"));
const SERVICE: &str = "papi";

const SEARCH_PATH: &str = "/papi/v1/search/find-by-value";
const USE_PREFIXES_HEADER: &str = "PAPI-Use-Prefixes";

const OP_CREATE_INCLUDE_VERSION: &str = "create an include version";
const OP_GET_INCLUDE_VERSION: &str = "get an include version";
const OP_LIST_INCLUDE_VERSIONS: &str = "list include versions";
const OP_LIST_AVAILABLE_CRITERIA: &str = "list include version available criteria";
const OP_LIST_AVAILABLE_BEHAVIORS: &str = "list include version available behaviors";
const OP_ACTIVATE_INCLUDE: &str = "activate an include";
const OP_DEACTIVATE_INCLUDE: &str = "deactivate an include";
const OP_GET_INCLUDE_ACTIVATION: &str = "get an include activation";
const OP_LIST_INCLUDE_ACTIVATIONS: &str = "list include activations";
const OP_SEARCH_PROPERTIES: &str = "search properties";

/// Builder for [`PapiClient`].
#[derive(Debug, Clone)]
pub struct PapiClientBuilder {
    inner: ServiceClientBuilder,
    use_prefixes: bool,
}

impl PapiClientBuilder {
    /// Create a builder for the specified base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SERVICE,
            base_url,
            Duration::from_secs(PAPI_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self {
            inner: builder,
            use_prefixes: false,
        })
    }

    /// Create a builder from host, credentials and transport settings.
    pub fn from_config(config: &EdgeGridConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SERVICE, config)?.with_user_agent(USER_AGENT);
        Ok(Self {
            inner: builder,
            use_prefixes: false,
        })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Sign requests with EdgeGrid credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.inner = self.inner.with_credentials(credentials);
        self
    }

    /// Act on behalf of another account.
    #[must_use]
    pub fn with_account_switch_key(mut self, key: impl Into<String>) -> Self {
        self.inner = self.inner.with_account_switch_key(key);
        self
    }

    /// Ask the API for prefixed identifiers (`prp_`, `ctr_`, ...) in search results.
    #[must_use]
    pub const fn with_use_prefixes(mut self, use_prefixes: bool) -> Self {
        self.use_prefixes = use_prefixes;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PapiClient> {
        let inner = self.inner.build()?;
        Ok(PapiClient {
            inner,
            use_prefixes: self.use_prefixes,
        })
    }
}

/// Asynchronous Property Manager client.
#[derive(Debug, Clone)]
pub struct PapiClient {
    inner: ServiceClient,
    use_prefixes: bool,
}

impl PapiClient {
    /// Construct an unauthenticated client directly from the base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        PapiClientBuilder::new(base_url)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Create a new include version based on an existing one.
    pub async fn create_include_version(
        &self,
        request: &CreateIncludeVersionRequest,
    ) -> Result<CreateIncludeVersionResponse> {
        self.send_json(
            OP_CREATE_INCLUDE_VERSION,
            request,
            Method::POST,
            &["papi", "v1", "includes", &request.include_id, "versions"],
            &[],
            Some(request),
            &[StatusCode::CREATED],
        )
        .await
    }

    /// Fetch one include version.
    pub async fn get_include_version(
        &self,
        request: &GetIncludeVersionRequest,
    ) -> Result<IncludeVersionResponse> {
        let version = request.version.to_string();
        self.send_json::<(), _, _>(
            OP_GET_INCLUDE_VERSION,
            request,
            Method::GET,
            &["papi", "v1", "includes", &request.include_id, "versions", &version],
            &request.to_pairs(),
            None,
            &[StatusCode::OK],
        )
        .await
    }

    /// List the versions of an include.
    pub async fn list_include_versions(
        &self,
        request: &ListIncludeVersionsRequest,
    ) -> Result<IncludeVersionResponse> {
        self.send_json::<(), _, _>(
            OP_LIST_INCLUDE_VERSIONS,
            request,
            Method::GET,
            &["papi", "v1", "includes", &request.include_id, "versions"],
            &request.to_pairs(),
            None,
            &[StatusCode::OK],
        )
        .await
    }

    /// List the criteria usable in an include version's rule tree.
    pub async fn list_include_version_available_criteria(
        &self,
        request: &ListAvailableCriteriaRequest,
    ) -> Result<AvailableCriteriaResponse> {
        let version = request.version.to_string();
        self.send_json::<(), _, _>(
            OP_LIST_AVAILABLE_CRITERIA,
            request,
            Method::GET,
            &[
                "papi",
                "v1",
                "includes",
                &request.include_id,
                "versions",
                &version,
                "available-criteria",
            ],
            &[],
            None,
            &[StatusCode::OK],
        )
        .await
    }

    /// List the behaviors usable in an include version's rule tree.
    pub async fn list_include_version_available_behaviors(
        &self,
        request: &ListAvailableBehaviorsRequest,
    ) -> Result<AvailableBehaviorsResponse> {
        let version = request.version.to_string();
        self.send_json::<(), _, _>(
            OP_LIST_AVAILABLE_BEHAVIORS,
            request,
            Method::GET,
            &[
                "papi",
                "v1",
                "includes",
                &request.include_id,
                "versions",
                &version,
                "available-behaviors",
            ],
            &[],
            None,
            &[StatusCode::OK],
        )
        .await
    }

    /// Activate an include version on a network.
    pub async fn activate_include(
        &self,
        request: &ActivateIncludeRequest,
    ) -> Result<ActivationIncludeResponse> {
        self.submit_activation(OP_ACTIVATE_INCLUDE, request, ActivationType::Activate)
            .await
    }

    /// Deactivate an include version on a network.
    pub async fn deactivate_include(
        &self,
        request: &DeactivateIncludeRequest,
    ) -> Result<DeactivationIncludeResponse> {
        self.submit_activation(OP_DEACTIVATE_INCLUDE, request, ActivationType::Deactivate)
            .await
    }

    /// Fetch one activation of an include.
    pub async fn get_include_activation(
        &self,
        request: &GetIncludeActivationRequest,
    ) -> Result<IncludeActivationResponse> {
        self.send_json::<(), _, _>(
            OP_GET_INCLUDE_ACTIVATION,
            request,
            Method::GET,
            &[
                "papi",
                "v1",
                "includes",
                &request.include_id,
                "activations",
                &request.activation_id,
            ],
            &[],
            None,
            &[StatusCode::OK],
        )
        .await
    }

    /// List the activations of an include.
    pub async fn list_include_activations(
        &self,
        request: &ListIncludeActivationsRequest,
    ) -> Result<IncludeActivationsResponse> {
        self.send_json::<(), _, _>(
            OP_LIST_INCLUDE_ACTIVATIONS,
            request,
            Method::GET,
            &["papi", "v1", "includes", &request.include_id, "activations"],
            &request.to_pairs(),
            None,
            &[StatusCode::OK],
        )
        .await
    }

    /// Find property versions by hostname, edge hostname or property name.
    ///
    /// A 404 answer is reported as [`Error::NotFound`] carrying the search path.
    pub async fn search_properties(&self, request: &SearchRequest) -> Result<SearchResponse> {
        validate(request).map_err(|err| err.within(OP_SEARCH_PROPERTIES))?;
        debug!(operation = OP_SEARCH_PROPERTIES, key = %request.key, "searching properties");

        let body = BTreeMap::from([(request.key.as_str(), request.value.as_str())]);
        let headers = [(USE_PREFIXES_HEADER, self.use_prefixes.to_string())];

        let result: Result<SearchResponse> = async {
            let response = self
                .inner
                .execute(Method::POST, SEARCH_PATH, &[], &headers, Some(&body))
                .await?;
            match response.status() {
                StatusCode::OK => self.inner.decode(response).await,
                StatusCode::NOT_FOUND => Err(Error::NotFound(SEARCH_PATH.to_string())),
                _ => Err(self.inner.api_error(response).await),
            }
        }
        .await;

        result.map_err(|err| err.within(OP_SEARCH_PROPERTIES))
    }

    async fn submit_activation(
        &self,
        operation: &'static str,
        request: &ActivateIncludeRequest,
        activation_type: ActivationType,
    ) -> Result<ActivationIncludeResponse> {
        let body = ActivationBody {
            request,
            activation_type,
            ignore_http_errors: true,
        };
        let link: ActivationLink = self
            .send_json(
                operation,
                request,
                Method::POST,
                &["papi", "v1", "includes", &request.include_id, "activations"],
                &[],
                Some(&body),
                &[StatusCode::CREATED],
            )
            .await?;
        Ok(link.into())
    }

    /// Validate, send, check the status and decode, tagging any failure
    /// with the operation name. Path segments are percent-encoded.
    #[allow(clippy::too_many_arguments)]
    async fn send_json<B, V, R>(
        &self,
        operation: &'static str,
        request: &V,
        method: Method,
        segments: &[&str],
        params: &[(&'static str, String)],
        body: Option<&B>,
        expected: &[StatusCode],
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        V: Validate,
        R: DeserializeOwned,
    {
        validate(request).map_err(|err| err.within(operation))?;
        debug!(operation, %method, "{SERVICE} request");

        let result: Result<R> = async {
            let path = encode_path(segments)?;
            let response = self.inner.execute(method, &path, params, &[], body).await?;
            if expected.contains(&response.status()) {
                self.inner.decode(response).await
            } else {
                Err(self.inner.api_error(response).await)
            }
        }
        .await;

        result.map_err(|err| err.within(operation))
    }
}
