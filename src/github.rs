//! GitHub contents API mirror.
//!
//! Implements [`Mirror`] for a single file in a GitHub repository
//! (normally the README) using the REST contents endpoint:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | fetch | `GET /repos/{owner}/{repo}/contents/{path}[?ref={branch}]` |
//! | put | `PUT /repos/{owner}/{repo}/contents/{path}` with `{message, content, sha?, branch?}` |
//! | verify | `GET /user` |
//!
//! File content travels base64-encoded; GitHub wraps it at 60 columns on
//! the way out, so line breaks are stripped before decoding.
//!
//! # Authentication
//!
//! A bearer token is read from the environment variable named by
//! `github.token_env` (default `GITHUB_TOKEN`). Every call requires it.
//!
//! # Failure mapping
//!
//! | Status | [`RemoteFailure`] |
//! |--------|-------------------|
//! | no token | `MissingToken` |
//! | 401 | `Unauthorized` |
//! | 403 + `x-ratelimit-remaining: 0`, or 429 | `RateLimited` |
//! | other 403 | `Forbidden` |
//! | 404 | `NotFound` |
//! | other non-2xx | `Status` |

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use clipper_core::mirror::{Mirror, RemoteFile};
use clipper_core::RemoteFailure;

use crate::config::GithubConfig;

const USER_AGENT: &str = concat!("clipper/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

pub struct GithubMirror {
    client: reqwest::Client,
    config: GithubConfig,
    token: Option<String>,
}

impl GithubMirror {
    /// Build a mirror using the token from the configured environment
    /// variable.
    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        Self::with_token(config, config.token())
    }

    pub fn with_token(config: &GithubConfig, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
            token,
        })
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base(),
            self.config.owner,
            self.config.repo,
            self.config.path.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteFailure> {
        let token = self.token.as_deref().ok_or(RemoteFailure::MissingToken)?;
        Ok(request
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteFailure> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| RemoteFailure::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify(response).await)
        }
    }

    /// Check the token and return the authenticated login.
    pub async fn verify_token(&self) -> Result<String, RemoteFailure> {
        let url = format!("{}/user", self.api_base());
        let response = self.send(self.client.get(url)).await?;
        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| RemoteFailure::Decode(e.to_string()))?;
        Ok(user.login)
    }
}

/// Map a non-success response to a [`RemoteFailure`].
async fn classify(response: Response) -> RemoteFailure {
    let status = response.status();
    let rate_limit_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    debug!(%status, %message, "github request failed");
    match status {
        StatusCode::UNAUTHORIZED => RemoteFailure::Unauthorized,
        StatusCode::NOT_FOUND => RemoteFailure::NotFound,
        StatusCode::TOO_MANY_REQUESTS => RemoteFailure::RateLimited,
        StatusCode::FORBIDDEN if rate_limit_exhausted => RemoteFailure::RateLimited,
        StatusCode::FORBIDDEN => RemoteFailure::Forbidden(message),
        other => RemoteFailure::Status {
            status: other.as_u16(),
            message,
        },
    }
}

/// Decode GitHub's line-wrapped base64 into UTF-8 text.
pub fn decode_content(encoded: &str) -> Result<String, RemoteFailure> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| RemoteFailure::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| RemoteFailure::Decode(e.to_string()))
}

pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

#[async_trait]
impl Mirror for GithubMirror {
    fn owner(&self) -> &str {
        &self.config.owner
    }

    fn repo(&self) -> &str {
        &self.config.repo
    }

    async fn fetch(&self) -> Result<RemoteFile, RemoteFailure> {
        let mut request = self.client.get(self.contents_url());
        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }

        let response = self.send(request).await?;
        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|e| RemoteFailure::Decode(e.to_string()))?;

        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(RemoteFailure::Decode(format!(
                    "unsupported encoding '{}'",
                    encoding
                )));
            }
        }

        Ok(RemoteFile {
            content: decode_content(&body.content)?,
            sha: body.sha,
        })
    }

    async fn put(
        &self,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<String, RemoteFailure> {
        let mut payload = serde_json::json!({
            "message": message,
            "content": encode_content(content),
        });
        if let Some(sha) = sha {
            payload["sha"] = serde_json::Value::from(sha);
        }
        if let Some(branch) = &self.config.branch {
            payload["branch"] = serde_json::Value::from(branch.as_str());
        }

        let response = self
            .send(self.client.put(self.contents_url()).json(&payload))
            .await?;
        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| RemoteFailure::Decode(e.to_string()))?;
        Ok(body.content.sha)
    }
}
