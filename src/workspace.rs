//! Minimal client for the Databricks workspace REST API.
//!
//! Only the two calls the apps need are implemented: minting temporary
//! service credentials through Unity Catalog and downloading a file through
//! the Files API.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

use crate::config::AuthMode;

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

/// AWS section of a temporary credential. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsTempCredentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub access_point: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryCredentials {
    pub aws_temp_credentials: Option<AwsTempCredentials>,
    /// Epoch milliseconds.
    pub expiration_time: Option<i64>,
}

#[derive(Debug, Serialize)]
struct GenerateTemporaryServiceCredentialRequest<'a> {
    credential_name: &'a str,
}

/// Files API download. The HTTP body is the file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResponse {
    pub contents: Vec<u8>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Invalid workspace host: {0}")]
    InvalidHost(String),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Api {
        status: u16,
        error_code: Option<String>,
        message: String,
    },
    #[error("Authentication failed: {0}")]
    Auth(String),
}

// -----------------------------------------------------------------------------
// Trait
// -----------------------------------------------------------------------------

#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    async fn generate_temporary_service_credential(
        &self,
        credential_name: &str,
    ) -> Result<TemporaryCredentials, WorkspaceError>;

    async fn download_file(&self, path: &str) -> Result<DownloadResponse, WorkspaceError>;
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

/// Refresh OAuth tokens this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

pub struct WorkspaceClient {
    http: reqwest::Client,
    host: Url,
    auth: AuthMode,
    token: Mutex<Option<CachedToken>>,
}

impl WorkspaceClient {
    pub fn new(auth: AuthMode) -> Result<Self, WorkspaceError> {
        let host = Url::parse(auth.host())
            .map_err(|_| WorkspaceError::InvalidHost(auth.host().to_string()))?;
        if host.cannot_be_a_base() {
            return Err(WorkspaceError::InvalidHost(auth.host().to_string()));
        }

        info!("Workspace client for {} using {} auth", host, auth.as_str());

        Ok(Self {
            http: reqwest::Client::new(),
            host,
            auth,
            token: Mutex::new(None),
        })
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    fn endpoint<'a, I>(&self, segments: I) -> Result<Url, WorkspaceError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|_| WorkspaceError::InvalidHost(self.host.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn bearer_token(&self) -> Result<String, WorkspaceError> {
        let (client_id, client_secret) = match &self.auth {
            AuthMode::Token { token, .. } => return Ok(token.clone()),
            AuthMode::Ambient {
                client_id,
                client_secret,
                ..
            } => (client_id, client_secret),
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let url = self.endpoint(["oidc", "v1", "token"])?;
        debug!("Requesting OAuth token from {}", url);
        let response = self
            .http
            .post(url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "all-apis")])
            .send()
            .await?;
        let response = check_response(response)
            .await
            .map_err(|err| WorkspaceError::Auth(err.to_string()))?;
        let token: TokenResponse = response.json().await?;

        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let refresh_at = Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN);

        let access_token = token.access_token;
        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            refresh_at,
        });

        Ok(access_token)
    }
}

#[async_trait]
impl WorkspaceApi for WorkspaceClient {
    async fn generate_temporary_service_credential(
        &self,
        credential_name: &str,
    ) -> Result<TemporaryCredentials, WorkspaceError> {
        let url = self.endpoint(["api", "2.1", "unity-catalog", "temporary-service-credentials"])?;
        let token = self.bearer_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&GenerateTemporaryServiceCredentialRequest { credential_name })
            .send()
            .await?;
        let response = check_response(response).await?;

        Ok(response.json::<TemporaryCredentials>().await?)
    }

    async fn download_file(&self, path: &str) -> Result<DownloadResponse, WorkspaceError> {
        let segments = ["api", "2.0", "fs", "files"]
            .into_iter()
            .chain(path.split('/').filter(|segment| !segment.is_empty()));
        let url = self.endpoint(segments)?;
        let token = self.bearer_token().await?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let response = check_response(response).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();
        let contents = response.bytes().await?.to_vec();

        Ok(DownloadResponse {
            contents,
            content_length,
            content_type,
        })
    }
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Turns a non-2xx response into `WorkspaceError::Api`.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, WorkspaceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (error_code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => (parsed.error_code, parsed.message.unwrap_or_else(|| body.clone())),
        Err(_) if body.trim().is_empty() => (
            None,
            status.canonical_reason().unwrap_or("request failed").to_string(),
        ),
        Err(_) => (None, body),
    };

    Err(WorkspaceError::Api {
        status: status.as_u16(),
        error_code,
        message,
    })
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
