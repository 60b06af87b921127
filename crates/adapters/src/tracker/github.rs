// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub REST API v3 client, authenticating as a GitHub App installation.
//!
//! Maps to the operations used by the work-item, spec, and revision pollers.
//! Installation tokens are cached and refreshed a minute before they expire.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::{
    CheckRun, CombinedStatusKind, CombinedStatusState, TrackerClient, TrackerError,
    TrackerInlineComment, TrackerIssue, TrackerLabel, TrackerPullRequest, TrackerReview, TreeEntry,
};

const GITHUB_API_BASE: &str = "https://api.github.com";
const JWT_TTL: ChronoDuration = ChronoDuration::minutes(9);
const TOKEN_REFRESH_SKEW: ChronoDuration = ChronoDuration::minutes(1);

#[derive(Debug, Serialize)]
struct AppJwtClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Credentials for the GitHub App installation-token flow (§6).
#[derive(Debug, Clone)]
pub struct GitHubAppCredentials {
    pub app_id: String,
    pub private_key_path: PathBuf,
    pub installation_id: String,
}

/// GitHub REST API v3 client for one `{owner, repo}`.
#[derive(Clone)]
pub struct GitHubTrackerClient {
    http: Client,
    owner: String,
    repo: String,
    credentials: GitHubAppCredentials,
    cached_token: Arc<Mutex<Option<CachedToken>>>,
}

impl GitHubTrackerClient {
    pub fn new(repository: &str, credentials: GitHubAppCredentials) -> Result<Self, TrackerError> {
        let (owner, repo) = repository.split_once('/').ok_or_else(|| {
            TrackerError::Auth(format!(
                "repository {repository:?} is not in owner/name form"
            ))
        })?;
        Ok(Self {
            http: Client::new(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            credentials,
            cached_token: Arc::new(Mutex::new(None)),
        })
    }

    fn mint_app_jwt(&self) -> Result<String, TrackerError> {
        let pem = std::fs::read(&self.credentials.private_key_path)
            .map_err(|e| TrackerError::Auth(format!("reading private key: {e}")))?;
        let key = EncodingKey::from_rsa_pem(&pem)
            .map_err(|e| TrackerError::Auth(format!("invalid private key: {e}")))?;
        let now = Utc::now();
        let claims = AppJwtClaims {
            iat: (now - ChronoDuration::seconds(30)).timestamp(),
            exp: (now + JWT_TTL).timestamp(),
            iss: self.credentials.app_id.clone(),
        };
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| TrackerError::Auth(format!("signing app jwt: {e}")))
    }

    async fn installation_token(&self) -> Result<String, TrackerError> {
        if let Some(cached) = self.cached_token.lock().as_ref() {
            if cached.expires_at - TOKEN_REFRESH_SKEW > Utc::now() {
                return Ok(cached.token.clone());
            }
        }

        let jwt = self.mint_app_jwt()?;
        let url = format!(
            "{GITHUB_API_BASE}/app/installations/{}/access_tokens",
            self.credentials.installation_id
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(jwt)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "foreman")
            .send()
            .await
            .map_err(|e| TrackerError::Auth(format!("requesting installation token: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TrackerError::Auth(format!(
                "installation token request returned {status}: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            token: String,
            expires_at: DateTime<Utc>,
        }
        let parsed: TokenResponse = resp
            .json()
            .await
            .map_err(|e| TrackerError::Auth(format!("parsing installation token: {e}")))?;

        *self.cached_token.lock() = Some(CachedToken {
            token: parsed.token.clone(),
            expires_at: parsed.expires_at,
        });
        Ok(parsed.token)
    }

    async fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, TrackerError> {
        let token = self.installation_token().await?;
        let url = format!("{GITHUB_API_BASE}{path}");
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "foreman"))
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        req: reqwest::RequestBuilder,
    ) -> Result<T, TrackerError> {
        let resp = req
            .send()
            .await
            .map_err(|e| TrackerError::Request(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TrackerError::Api { status, body });
        }
        resp.json::<T>()
            .await
            .map_err(|e| TrackerError::Request(format!("parsing response: {e}")))
    }

    async fn send_no_content(req: reqwest::RequestBuilder) -> Result<(), TrackerError> {
        let resp = req
            .send()
            .await
            .map_err(|e| TrackerError::Request(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TrackerError::Api { status, body });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawPullRef {
    sha: String,
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Deserialize)]
struct RawPullRequest {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    head: RawPullRef,
    user: RawUser,
    draft: bool,
    state: String,
}

impl From<RawPullRequest> for TrackerPullRequest {
    fn from(raw: RawPullRequest) -> Self {
        Self {
            number: raw.number,
            title: raw.title,
            html_url: raw.html_url,
            body: raw.body,
            head_sha: raw.head.sha,
            head_ref: raw.head.git_ref,
            user_login: raw.user.login,
            draft: raw.draft,
            state: raw.state,
        }
    }
}

#[derive(Deserialize)]
struct RawReview {
    user: RawUser,
    state: String,
    #[serde(default)]
    body: Option<String>,
}

impl From<RawReview> for TrackerReview {
    fn from(raw: RawReview) -> Self {
        Self {
            user_login: raw.user.login,
            state: raw.state,
            body: raw.body,
        }
    }
}

#[derive(Deserialize)]
struct RawInlineComment {
    path: String,
    body: String,
    #[serde(default)]
    line: Option<u64>,
}

impl From<RawInlineComment> for TrackerInlineComment {
    fn from(raw: RawInlineComment) -> Self {
        Self {
            path: raw.path,
            body: raw.body,
            line: raw.line,
        }
    }
}

#[derive(Deserialize)]
struct RawFile {
    filename: String,
}

#[derive(Deserialize)]
struct RawCombinedStatus {
    state: String,
    total_count: u32,
}

#[derive(Deserialize)]
struct RawCheckRunsResponse {
    check_runs: Vec<CheckRun>,
}

#[derive(Deserialize)]
struct RawTreeResponse {
    tree: Vec<TreeEntry>,
}

#[derive(Deserialize)]
struct RawRefObject {
    sha: String,
}

#[derive(Deserialize)]
struct RawRef {
    object: RawRefObject,
}

#[derive(Deserialize)]
struct RawContent {
    content: String,
    encoding: String,
}

#[async_trait]
impl TrackerClient for GitHubTrackerClient {
    async fn list_open_issues_by_label(
        &self,
        label: &str,
    ) -> Result<Vec<TrackerIssue>, TrackerError> {
        let path = format!(
            "/repos/{}/{}/issues?state=open&labels={}&per_page=100",
            self.owner, self.repo, label
        );
        let req = self.request(Method::GET, &path).await?;
        let issues: Vec<TrackerIssue> = Self::send_json(req).await?;
        // GitHub's issues endpoint also returns pull requests; exclude them.
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.html_url.contains("/pull/"))
            .collect())
    }

    async fn get_issue(&self, number: u64) -> Result<TrackerIssue, TrackerError> {
        let path = format!("/repos/{}/{}/issues/{}", self.owner, self.repo, number);
        let req = self.request(Method::GET, &path).await?;
        Self::send_json(req).await
    }

    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        let path = format!(
            "/repos/{}/{}/issues/{}/labels",
            self.owner, self.repo, number
        );
        let req = self
            .request(Method::POST, &path)
            .await?
            .json(&serde_json::json!({ "labels": [label] }));
        Self::send_no_content(req).await
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        let path = format!(
            "/repos/{}/{}/issues/{}/labels/{}",
            self.owner, self.repo, number, label
        );
        let req = self.request(Method::DELETE, &path).await?;
        match Self::send_no_content(req).await {
            // The label may already be gone; treat as success.
            Err(TrackerError::NotFound) => Ok(()),
            other => other,
        }
    }

    async fn list_pull_requests(&self) -> Result<Vec<TrackerPullRequest>, TrackerError> {
        let path = format!(
            "/repos/{}/{}/pulls?state=open&per_page=100",
            self.owner, self.repo
        );
        let req = self.request(Method::GET, &path).await?;
        let raw: Vec<RawPullRequest> = Self::send_json(req).await?;
        Ok(raw.into_iter().map(TrackerPullRequest::from).collect())
    }

    async fn get_pull_request(&self, number: u64) -> Result<TrackerPullRequest, TrackerError> {
        let path = format!("/repos/{}/{}/pulls/{}", self.owner, self.repo, number);
        let req = self.request(Method::GET, &path).await?;
        let raw: RawPullRequest = Self::send_json(req).await?;
        Ok(raw.into())
    }

    async fn list_pr_files(&self, number: u64) -> Result<Vec<String>, TrackerError> {
        let path = format!(
            "/repos/{}/{}/pulls/{}/files?per_page=100",
            self.owner, self.repo, number
        );
        let req = self.request(Method::GET, &path).await?;
        let raw: Vec<RawFile> = Self::send_json(req).await?;
        Ok(raw.into_iter().map(|f| f.filename).collect())
    }

    async fn list_pr_reviews(&self, number: u64) -> Result<Vec<TrackerReview>, TrackerError> {
        let path = format!(
            "/repos/{}/{}/pulls/{}/reviews?per_page=100",
            self.owner, self.repo, number
        );
        let req = self.request(Method::GET, &path).await?;
        let raw: Vec<RawReview> = Self::send_json(req).await?;
        Ok(raw.into_iter().map(TrackerReview::from).collect())
    }

    async fn list_pr_inline_comments(
        &self,
        number: u64,
    ) -> Result<Vec<TrackerInlineComment>, TrackerError> {
        let path = format!(
            "/repos/{}/{}/pulls/{}/comments?per_page=100",
            self.owner, self.repo, number
        );
        let req = self.request(Method::GET, &path).await?;
        let raw: Vec<RawInlineComment> = Self::send_json(req).await?;
        Ok(raw.into_iter().map(TrackerInlineComment::from).collect())
    }

    async fn get_combined_commit_status(
        &self,
        sha: &str,
    ) -> Result<CombinedStatusState, TrackerError> {
        let path = format!("/repos/{}/{}/commits/{}/status", self.owner, self.repo, sha);
        let req = self.request(Method::GET, &path).await?;
        let raw: RawCombinedStatus = Self::send_json(req).await?;
        let kind = match raw.state.as_str() {
            "success" => CombinedStatusKind::Success,
            "failure" | "error" => CombinedStatusKind::Failure,
            _ => CombinedStatusKind::Pending,
        };
        Ok(CombinedStatusState::new(kind, raw.total_count))
    }

    async fn list_check_runs(&self, sha: &str) -> Result<Vec<CheckRun>, TrackerError> {
        let path = format!(
            "/repos/{}/{}/commits/{}/check-runs?per_page=100",
            self.owner, self.repo, sha
        );
        let req = self.request(Method::GET, &path).await?;
        let raw: RawCheckRunsResponse = Self::send_json(req).await?;
        Ok(raw.check_runs)
    }

    async fn get_tree(&self, sha: &str, recursive: bool) -> Result<Vec<TreeEntry>, TrackerError> {
        let path = format!(
            "/repos/{}/{}/git/trees/{}{}",
            self.owner,
            self.repo,
            sha,
            if recursive { "?recursive=1" } else { "" }
        );
        let req = self.request(Method::GET, &path).await?;
        let raw: RawTreeResponse = Self::send_json(req).await?;
        Ok(raw.tree)
    }

    async fn get_ref(&self, branch: &str) -> Result<String, TrackerError> {
        let path = format!(
            "/repos/{}/{}/git/ref/heads/{}",
            self.owner, self.repo, branch
        );
        let req = self.request(Method::GET, &path).await?;
        let raw: RawRef = Self::send_json(req).await?;
        Ok(raw.object.sha)
    }

    async fn get_file_content(
        &self,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>, TrackerError> {
        let api_path = format!(
            "/repos/{}/{}/contents/{}?ref={}",
            self.owner, self.repo, path, git_ref
        );
        let req = self.request(Method::GET, &api_path).await?;
        match Self::send_json::<RawContent>(req).await {
            Ok(raw) => {
                if raw.encoding != "base64" {
                    return Err(TrackerError::Request(format!(
                        "unsupported content encoding {:?}",
                        raw.encoding
                    )));
                }
                let cleaned: String = raw.content.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(cleaned)
                    .map_err(|e| TrackerError::Request(format!("decoding file content: {e}")))?;
                let text = String::from_utf8(bytes)
                    .map_err(|e| TrackerError::Request(format!("file content is not utf8: {e}")))?;
                Ok(Some(text))
            }
            Err(TrackerError::NotFound) => Ok(None),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
