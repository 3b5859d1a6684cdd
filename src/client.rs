//! HTTP client for the DMPonline API.
//!
//! Both API generations live under the same base URL but authenticate
//! differently:
//! - `v0/...` requests carry `Authorization: Token token={token}`
//! - `v1/...` requests carry `Authorization: Bearer {access_token}`, where the
//!   access token is exchanged once, at connect time, for the API token and the
//!   account email.

use std::future::Future;
use std::path::PathBuf;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Certificate, Client};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::{ClientConfig, TlsVerification};
use crate::models::ApiGeneration;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, timeout, broken body).
    #[error("{url} does not give valid response: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to read certificate {}: {}", .path.display(), .source)]
    Certificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Read access to the DMPonline API.
///
/// `fetch` keeps transport failures apart from "no data" so callers can decide
/// whether another endpoint is worth trying. `get` folds every failure into
/// `None`; the failure has already been logged by then.
pub trait DmpApi: Sync {
    /// GET `path` (relative to the base URL) with the given query parameters.
    ///
    /// - `Ok(Some(json))` on a 2xx response with a JSON body
    /// - `Ok(None)` on an error status or an undecodable body
    /// - `Err(ClientError::Transport)` when no response was received
    fn fetch(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> impl Future<Output = Result<Option<Value>, ClientError>> + Send;

    fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> impl Future<Output = Option<Value>> + Send {
        async move { self.fetch(path, params).await.ok().flatten() }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authenticated client for one DMPonline instance.
#[derive(Debug, Clone)]
pub struct DmpClient {
    base_url: String,
    token: String,
    bearer_token: Option<String>,
    client: Client,
}

impl DmpClient {
    /// Build the HTTP client and, when a user email is configured, obtain the
    /// v1 bearer token.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = build_http_client(&config.tls).await?;
        let mut dmp = Self {
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            bearer_token: None,
            client,
        };

        let bearer_token = match config.user_email.as_deref() {
            Some(email) => Some(dmp.authenticate(email).await?),
            None => {
                warn!("api v1 not available, because no user email is provided");
                None
            }
        };
        dmp.bearer_token = bearer_token;

        Ok(dmp)
    }

    /// Whether v1 requests will carry a bearer token.
    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange the API token for a v1 access token.
    async fn authenticate(&self, email: &str) -> Result<String, ClientError> {
        let url = self.url("v1/authenticate");
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({
                "grant_type": "authorization_code",
                "email": email,
                "code": self.token,
            }))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Authentication(e.to_string()))?;
        debug!("obtained bearer token for {}", email);
        Ok(token.access_token)
    }

    fn authorization(&self, path: &str) -> String {
        match (ApiGeneration::of_path(path), &self.bearer_token) {
            (ApiGeneration::V1, Some(bearer)) => format!("Bearer {}", bearer),
            _ => format!("Token token={}", self.token),
        }
    }
}

impl DmpApi for DmpClient {
    async fn fetch(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<Value>, ClientError> {
        let url = self.url(path);
        let response = match self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.authorization(path))
            .header(CONTENT_TYPE, "application/json")
            .query(params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(source) => {
                error!("{} does not give valid response", url);
                return Err(ClientError::Transport { url, source });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} gives status code {}\n{}", url, status, body);
            return Ok(None);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(source) => {
                error!("{} does not give valid response", url);
                return Err(ClientError::Transport { url, source });
            }
        };

        match serde_json::from_str(&text) {
            Ok(json) => Ok(Some(json)),
            Err(e) => {
                error!("{} returned a body that is not JSON: {}", url, e);
                Ok(None)
            }
        }
    }
}

async fn build_http_client(tls: &TlsVerification) -> Result<Client, ClientError> {
    let builder = Client::builder();
    let builder = match tls {
        TlsVerification::Enabled => builder,
        TlsVerification::Disabled => builder.danger_accept_invalid_certs(true),
        TlsVerification::CaCertificate(path) => {
            let pem = tokio::fs::read(path)
                .await
                .map_err(|source| ClientError::Certificate {
                    path: path.clone(),
                    source,
                })?;
            let cert = Certificate::from_pem(&pem).map_err(ClientError::Build)?;
            builder.add_root_certificate(cert)
        }
    };
    builder.build().map_err(ClientError::Build)
}
