//! Remote image hosting.
//!
//! Uploaded photos can be pushed to a GitHub repository through the contents
//! API so the stored `url` is a hosted address instead of an inline data URI.
//! Coordinates (`owner/repo`, token, folder, branch) are kept in the store
//! under the remote key and edited with `folio remote set|show|clear`.
//!
//! Object names are `<first 12 hex chars of SHA-256>-<sanitized name>`, so the
//! same bytes always land at the same path. GitHub answers 422 when a path
//! already exists; that case resolves to the existing raw URL.

use crate::naming::sanitize_file_name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";
const HASH_PREFIX_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Repository must look like 'owner/name', got '{0}'")]
    InvalidRepo(String),
    #[error("No token for the remote host. Set one with `folio remote set --token` or $GITHUB_TOKEN")]
    MissingToken,
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
}

fn default_path() -> String {
    "images".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

/// Where uploads go.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub repo: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

impl RemoteConfig {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            token: String::new(),
            path: default_path(),
            branch: default_branch(),
        }
    }

    pub fn validate(&self) -> Result<(), RemoteError> {
        let mut parts = self.repo.split('/');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if valid {
            Ok(())
        } else {
            Err(RemoteError::InvalidRepo(self.repo.clone()))
        }
    }

    /// Stored token, if any. Blank counts as unset.
    pub fn stored_token(&self) -> Option<String> {
        Some(self.token.clone()).filter(|t| !t.trim().is_empty())
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "***" };
        f.debug_struct("RemoteConfig")
            .field("repo", &self.repo)
            .field("token", &token)
            .field("path", &self.path)
            .field("branch", &self.branch)
            .finish()
    }
}

/// Content-addressed object name for an upload. The original name is
/// sanitized but keeps its case.
pub fn object_name(sha256: &str, original: &str) -> String {
    let prefix = &sha256[..sha256.len().min(HASH_PREFIX_LEN)];
    format!("{prefix}-{}", sanitize_file_name(original))
}

pub trait RemoteHost {
    /// Store `bytes` under `name` and return the public URL.
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<String, RemoteError>;
}

pub struct GitHubHost {
    agent: ureq::Agent,
    repo: String,
    path: String,
    branch: String,
    token: String,
}

impl GitHubHost {
    pub fn new(config: &RemoteConfig, token: Option<String>, timeout_secs: u64) -> Result<Self, RemoteError> {
        config.validate()?;
        let token = token.ok_or(RemoteError::MissingToken)?;
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build()
            .into();
        Ok(Self {
            agent,
            repo: config.repo.clone(),
            path: config.path.trim_matches('/').to_string(),
            branch: config.branch.clone(),
            token,
        })
    }

    fn object_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.path)
        }
    }

    fn contents_url(&self, name: &str) -> String {
        format!("{API_BASE}/repos/{}/contents/{}", self.repo, self.object_path(name))
    }

    fn raw_url(&self, name: &str) -> String {
        format!("{RAW_BASE}/{}/{}/{}", self.repo, self.branch, self.object_path(name))
    }

    fn request_body(&self, name: &str, bytes: &[u8]) -> serde_json::Value {
        use base64::Engine;
        serde_json::json!({
            "message": format!("Add {name}"),
            "content": base64::engine::general_purpose::STANDARD.encode(bytes),
            "branch": self.branch,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: Option<PutContent>,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    download_url: Option<String>,
}

impl PutResponse {
    fn download_url(self) -> Option<String> {
        self.content.and_then(|c| c.download_url)
    }
}

impl RemoteHost for GitHubHost {
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<String, RemoteError> {
        let url = self.contents_url(name);
        log::debug!("PUT {url} ({} bytes)", bytes.len());
        let result = self
            .agent
            .put(&url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", concat!("folio/", env!("CARGO_PKG_VERSION")))
            .send_json(self.request_body(name, bytes));
        match result {
            Ok(mut response) => {
                let body: PutResponse = response.body_mut().read_json()?;
                Ok(body.download_url().unwrap_or_else(|| self.raw_url(name)))
            }
            Err(ureq::Error::StatusCode(422)) => {
                log::debug!("{name} already present on {}", self.repo);
                Ok(self.raw_url(name))
            }
            Err(e) => Err(e.into()),
        }
    }
}
