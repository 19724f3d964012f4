//! # GitHub Contents Backend
//!
//! Stores each dataset as a file in a GitHub repository through the REST
//! "contents" API. The blob `sha` is the version token: GitHub refuses a
//! `PUT` whose `sha` is not the file's current one, which gives us
//! compare-and-swap for free.
//!
//! Objects live at `<folder>/<owner>/<file>` on the configured branch.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::backend::{Backend, ObjectKey, StoredObject, VersionToken};
use super::error::StoreError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Connection settings for the contents API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: String,
    /// `owner/name`
    pub repo: String,
    pub branch: String,
    pub folder: String,
}

pub struct GitHubContentsBackend {
    client: reqwest::Client,
    settings: GitHubSettings,
}

#[derive(Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
}

impl GitHubContentsBackend {
    pub fn new(settings: GitHubSettings, request_timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent("airdrop-keeper/1.0")
            .build()?;
        Ok(Self { client, settings })
    }

    fn object_path(&self, key: &ObjectKey) -> String {
        format!(
            "{}/{}/{}",
            self.settings.folder.trim_matches('/'),
            key.owner,
            key.file
        )
    }

    fn contents_url(&self, key: &ObjectKey) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.repo,
            self.object_path(key)
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.settings.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }
}

#[async_trait]
impl Backend for GitHubContentsBackend {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn read(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError> {
        let url = self.contents_url(key);
        let response = self
            .authorized(self.client.get(&url))
            .query(&[("ref", self.settings.branch.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{} absent on {}", self.object_path(key), self.settings.branch);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "GitHub returned HTTP {status} reading {}",
                self.object_path(key)
            )));
        }

        let body: ContentResponse = response.json().await?;
        // The API wraps base64 at 60 columns
        let packed: String = body.content.split_whitespace().collect();
        let bytes = BASE64.decode(packed).map_err(|e| StoreError::Decode {
            object: self.object_path(key),
            reason: e.to_string(),
        })?;

        debug!("Read {} at sha {}", self.object_path(key), body.sha);
        Ok(Some(StoredObject {
            bytes,
            version: VersionToken::new(body.sha),
        }))
    }

    async fn write(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let path = self.object_path(key);
        let request = PutRequest {
            message: format!("Update {path}"),
            content: BASE64.encode(&bytes),
            branch: &self.settings.branch,
            sha: expected.map(|v| v.as_str()),
        };

        let response = self
            .authorized(self.client.put(self.contents_url(key)))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        // 409: sha mismatch. 422 on create: the file appeared after our read.
        if status == StatusCode::CONFLICT
            || (status == StatusCode::UNPROCESSABLE_ENTITY && expected.is_none())
        {
            return Err(StoreError::Conflict { object: path });
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "GitHub returned HTTP {status} writing {path}"
            )));
        }

        let body: PutResponse = response.json().await?;
        debug!("Wrote {path} -> sha {}", body.content.sha);
        Ok(VersionToken::new(body.content.sha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(folder: &str) -> GitHubContentsBackend {
        GitHubContentsBackend::new(
            GitHubSettings {
                api_url: "https://api.example.com/".to_string(),
                token: "t".to_string(),
                repo: "me/data".to_string(),
                branch: "main".to_string(),
                folder: folder.to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_paths_are_namespaced_by_owner() {
        let b = backend("/airdrop-data/");
        let key = ObjectKey::new("42", "wallet_address.json");
        assert_eq!(b.object_path(&key), "airdrop-data/42/wallet_address.json");
        assert_eq!(
            b.contents_url(&key),
            "https://api.example.com/repos/me/data/contents/airdrop-data/42/wallet_address.json"
        );
    }

    #[test]
    fn test_put_request_omits_sha_on_create() {
        let req = PutRequest {
            message: "m".into(),
            content: "e30=".into(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");
    }
}
