//! Asynchronous Application Security client implementation.

use crate::models::{
    CreateConfigurationVersionCloneRequest, CreateConfigurationVersionCloneResponse,
    GetConfigurationVersionCloneRequest, GetConfigurationVersionCloneResponse,
    RemoveConfigurationVersionCloneRequest,
};
use crate::Result;
use edgegrid_core::client::{
    ClientConfig, ServiceClient, ServiceClientBuilder, APPSEC_DEFAULT_TIMEOUT,
};
use edgegrid_core::config::{Credentials, EdgeGridConfig};
use edgegrid_core::validation::validate;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("edgegrid-appsec/", env!("CARGO_PKG_VERSION"));
const SERVICE: &str = "appsec";

const OP_GET_VERSION_CLONE: &str = "get configuration version clone";
const OP_CREATE_VERSION_CLONE: &str = "create configuration version clone";
const OP_REMOVE_VERSION_CLONE: &str = "remove configuration version clone";

/// Builder for [`AppsecClient`].
#[derive(Debug, Clone)]
pub struct AppsecClientBuilder {
    inner: ServiceClientBuilder,
}

impl AppsecClientBuilder {
    /// Create a builder for the specified base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder = ServiceClientBuilder::new(
            SERVICE,
            base_url,
            Duration::from_secs(APPSEC_DEFAULT_TIMEOUT),
        )?
        .with_user_agent(USER_AGENT);

        Ok(Self { inner: builder })
    }

    /// Create a builder from host, credentials and transport settings.
    pub fn from_config(config: &EdgeGridConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(SERVICE, config)?.with_user_agent(USER_AGENT);
        Ok(Self { inner: builder })
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

    /// Build the client.
    pub fn build(self) -> Result<AppsecClient> {
        let inner = self.inner.build()?;
        Ok(AppsecClient { inner })
    }
}

/// Asynchronous Application Security client.
#[derive(Debug, Clone)]
pub struct AppsecClient {
    inner: ServiceClient,
}

impl AppsecClient {
    /// Construct an unauthenticated client directly from the base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        AppsecClientBuilder::new(base_url)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Fetch a configuration version.
    pub async fn get_configuration_version_clone(
        &self,
        request: &GetConfigurationVersionCloneRequest,
    ) -> Result<GetConfigurationVersionCloneResponse> {
        let path = format!(
            "/appsec/v1/configs/{}/versions/{}",
            request.config_id, request.version
        );
        let response = self
            .send::<(), _>(
                OP_GET_VERSION_CLONE,
                request,
                Method::GET,
                &path,
                None,
                &[StatusCode::OK],
            )
            .await?;
        self.inner
            .decode(response)
            .await
            .map_err(|err| err.within(OP_GET_VERSION_CLONE))
    }

    /// Clone a configuration version into a new editable version.
    pub async fn create_configuration_version_clone(
        &self,
        request: &CreateConfigurationVersionCloneRequest,
    ) -> Result<CreateConfigurationVersionCloneResponse> {
        let path = format!("/appsec/v1/configs/{}/versions", request.config_id);
        let response = self
            .send(
                OP_CREATE_VERSION_CLONE,
                request,
                Method::POST,
                &path,
                Some(request),
                &[StatusCode::OK, StatusCode::CREATED],
            )
            .await?;
        self.inner
            .decode(response)
            .await
            .map_err(|err| err.within(OP_CREATE_VERSION_CLONE))
    }

    /// Delete a configuration version.
    pub async fn remove_configuration_version_clone(
        &self,
        request: &RemoveConfigurationVersionCloneRequest,
    ) -> Result<()> {
        let path = format!(
            "/appsec/v1/configs/{}/versions/{}",
            request.config_id, request.version
        );
        self.send::<(), _>(
            OP_REMOVE_VERSION_CLONE,
            request,
            Method::DELETE,
            &path,
            None,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
        .map(|_| ())
    }

    /// Validate, send and check the status, tagging any failure with the
    /// operation name. The body of an accepted response is left unread.
    async fn send<B, V>(
        &self,
        operation: &'static str,
        request: &V,
        method: Method,
        path: &str,
        body: Option<&B>,
        expected: &[StatusCode],
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
        V: Validate,
    {
        validate(request).map_err(|err| err.within(operation))?;
        debug!(operation, %method, "{SERVICE} request");

        let response = self
            .inner
            .execute(method, path, &[], &[], body)
            .await
            .map_err(|err| err.within(operation))?;

        if expected.contains(&response.status()) {
            Ok(response)
        } else {
            Err(self.inner.api_error(response).await.within(operation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use edgegrid_core::{ApiCondition, ApiError};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> AppsecClient {
        AppsecClient::new(server.uri()).unwrap()
    }

    fn version_body(version: i64) -> serde_json::Value {
        json!({
            "configId": 43253,
            "configName": "WAF Security File",
            "version": version,
            "versionNotes": "Cloned from version 15",
            "createDate": "2021-03-01T16:28:08Z",
            "createdBy": "user1",
            "basedOn": 15,
            "production": {"status": "Inactive"},
            "staging": {"status": "Inactive"}
        })
    }

    #[tokio::test]
    async fn get_configuration_version_clone_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appsec/v1/configs/43253/versions/15"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "configId": 43253,
                "configName": "WAF Security File",
                "version": 15,
                "versionNotes": "",
                "createDate": "2013-10-07T17:58:52Z",
                "createdBy": "user1",
                "basedOn": 14,
                "production": {"status": "Active", "time": "2014-07-08T07:40:00Z"},
                "staging": {"status": "Inactive"}
            })))
            .mount(&server)
            .await;

        let version = test_client(&server)
            .get_configuration_version_clone(&GetConfigurationVersionCloneRequest {
                config_id: 43253,
                version: 15,
            })
            .await
            .unwrap();

        assert_eq!(version.config_id, 43253);
        assert_eq!(version.based_on, Some(14));
        assert!(version.production.is_active());
        assert_eq!(
            version.production.time,
            Some(Utc.with_ymd_and_hms(2014, 7, 8, 7, 40, 0).unwrap())
        );
        assert_eq!(
            version.create_date,
            Utc.with_ymd_and_hms(2013, 10, 7, 17, 58, 52).unwrap()
        );
    }

    #[tokio::test]
    async fn get_configuration_version_clone_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appsec/v1/configs/43253/versions/15"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "type": "internal_error",
                "title": "Internal Server Error",
                "detail": "Error fetching data",
                "status": 500
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get_configuration_version_clone(&GetConfigurationVersionCloneRequest {
                config_id: 43253,
                version: 15,
            })
            .await
            .unwrap_err();

        let expected = ApiError {
            error_type: "internal_error".into(),
            title: "Internal Server Error".into(),
            detail: "Error fetching data".into(),
            status: 500,
            ..ApiError::default()
        };
        assert!(err.is(&expected));
        assert_eq!(err.operation(), Some(OP_GET_VERSION_CLONE));
    }

    #[tokio::test]
    async fn get_configuration_version_clone_validation() {
        let server = MockServer::start().await;
        let err = test_client(&server)
            .get_configuration_version_clone(&GetConfigurationVersionCloneRequest {
                config_id: 43253,
                version: 0,
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.status().is_none());
        assert!(err.to_string().contains("version: cannot be blank"));
    }

    #[tokio::test]
    async fn create_configuration_version_clone_accepts_ok_and_created() {
        for status in [200, 201] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/appsec/v1/configs/43253/versions"))
                .and(body_json(json!({"createFromVersion": 15, "ruleUpdate": false})))
                .respond_with(ResponseTemplate::new(status).set_body_json(version_body(16)))
                .mount(&server)
                .await;

            let version = test_client(&server)
                .create_configuration_version_clone(&CreateConfigurationVersionCloneRequest {
                    config_id: 43253,
                    create_from_version: 15,
                    rule_update: false,
                })
                .await
                .unwrap();
            assert_eq!(version.version, 16);
            assert_eq!(version.based_on, Some(15));
        }
    }

    #[tokio::test]
    async fn create_configuration_version_clone_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = test_client(&server)
            .create_configuration_version_clone(&CreateConfigurationVersionCloneRequest {
                config_id: 0,
                create_from_version: 0,
                rule_update: true,
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.operation(), Some(OP_CREATE_VERSION_CLONE));
        assert!(err.to_string().contains("config_id: cannot be blank"));
        assert!(err.to_string().contains("create_from_version: cannot be blank"));
    }

    #[tokio::test]
    async fn remove_configuration_version_clone_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/appsec/v1/configs/43253/versions/16"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .remove_configuration_version_clone(&RemoveConfigurationVersionCloneRequest {
                config_id: 43253,
                version: 16,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_configuration_version_clone_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/appsec/v1/configs/43253/versions/99"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "type": "https://problems.luna.akamaiapis.net/appsec/error-types/NOT-FOUND",
                "title": "Not Found",
                "detail": "Version 99 not found",
                "status": 404
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .remove_configuration_version_clone(&RemoveConfigurationVersionCloneRequest {
                config_id: 43253,
                version: 99,
            })
            .await
            .unwrap_err();
        assert!(err.is(&ApiCondition::NotFound));
        assert_eq!(err.operation(), Some(OP_REMOVE_VERSION_CLONE));
    }
}
