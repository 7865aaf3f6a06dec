//! EdgeGrid (`EG1-HMAC-SHA256`) request signing.

use crate::config::{Credentials, DEFAULT_MAX_BODY};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm name.
pub const ALGORITHM: &str = "EG1-HMAC-SHA256";

/// Produces `Authorization` headers for EdgeGrid requests.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    max_body: usize,
}

impl Signer {
    /// Create a signer for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            max_body: DEFAULT_MAX_BODY,
        }
    }

    /// Limit the number of body bytes covered by the content hash.
    #[must_use]
    pub const fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    /// Authorization header value for a request, stamped now with a fresh nonce.
    #[must_use]
    pub fn authorization(&self, method: &Method, url: &Url, body: &[u8]) -> String {
        let timestamp = format_timestamp(Utc::now());
        let nonce = Uuid::new_v4().to_string();
        self.sign(method, url, body, &timestamp, &nonce)
    }

    /// Deterministic signing for a given timestamp and nonce.
    #[must_use]
    pub fn sign(
        &self,
        method: &Method,
        url: &Url,
        body: &[u8],
        timestamp: &str,
        nonce: &str,
    ) -> String {
        let auth_header = format!(
            "{ALGORITHM} client_token={};access_token={};timestamp={timestamp};nonce={nonce};",
            self.credentials.client_token, self.credentials.access_token
        );

        let signing_key = hmac_base64(
            self.credentials.client_secret.expose_secret().as_bytes(),
            timestamp.as_bytes(),
        );

        let data_to_sign = [
            method.as_str().to_uppercase(),
            url.scheme().to_string(),
            host_with_port(url),
            request_uri(url),
            String::new(),
            self.content_hash(method, body),
            auth_header.clone(),
        ]
        .join("\t");

        let signature = hmac_base64(signing_key.as_bytes(), data_to_sign.as_bytes());
        format!("{auth_header}signature={signature}")
    }

    fn content_hash(&self, method: &Method, body: &[u8]) -> String {
        if *method != Method::POST || body.is_empty() {
            return String::new();
        }
        let signed = &body[..body.len().min(self.max_body)];
        STANDARD.encode(Sha256::digest(signed))
    }
}

/// EdgeGrid timestamp, e.g. `20240102T15:04:05+0000`.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H:%M:%S+0000").to_string()
}

fn hmac_base64(key: &[u8], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    STANDARD.encode(mac.finalize().into_bytes())
}

fn host_with_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}
