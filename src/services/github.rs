//! GitHub REST API v3 client.
//!
//! Lists are fetched with `per_page=100` and followed through the `Link`
//! response header until GitHub stops sending a `rel="next"` entry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LINK, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::provider::RemoteProvider;
use crate::config::GitHubSettings;
use crate::error::{AppError, AppResult};
use crate::models::{RemoteOrganization, RemoteRepository, RemoteUser};

/// HTTP connect timeout for GitHub API calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// HTTP total timeout for GitHub API calls.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Largest page size GitHub accepts.
const PAGE_SIZE: u32 = 100;
/// Media type for the v3 REST API.
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Client bound to one user's OAuth token.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    user_agent: String,
    token: SecretString,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings, token: SecretString) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: settings.api_url.clone(),
            user_agent: settings.user_agent.clone(),
            token,
        })
    }

    async fn send(&self, url: &str) -> AppResult<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .header(ACCEPT, GITHUB_JSON)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("GitHub returned {} for {}", status, url);
            return Err(AppError::Provider(format!(
                "GitHub returned {} for {}",
                status, url
            )));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let value = self.send(&url).await?.json().await?;
        Ok(value)
    }

    async fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> AppResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(format!("{}{}?per_page={}", self.api_url, path, PAGE_SIZE));
        let mut pages = 0;

        while let Some(url) = next {
            let response = self.send(&url).await?;
            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_next_link);
            let page: Vec<T> = response.json().await?;
            items.extend(page);
            pages += 1;
        }

        debug!("Fetched {} items from {} in {} pages", items.len(), path, pages);
        Ok(items)
    }
}

#[async_trait]
impl RemoteProvider for GitHubClient {
    async fn current_user(&self) -> AppResult<RemoteUser> {
        let user: GitHubUser = self.get_json("/user").await?;
        Ok(user.into())
    }

    async fn list_organizations(&self) -> AppResult<Vec<RemoteOrganization>> {
        let summaries: Vec<GitHubOrgSummary> = self.get_paginated("/user/orgs").await?;

        // The list endpoint omits the display name.
        let mut organizations = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let org: GitHubOrg = self.get_json(&format!("/orgs/{}", summary.login)).await?;
            organizations.push(org.into());
        }
        Ok(organizations)
    }

    async fn list_organization_repositories(
        &self,
        organization: &RemoteOrganization,
    ) -> AppResult<Vec<RemoteRepository>> {
        let repos: Vec<GitHubRepo> = self
            .get_paginated(&format!("/orgs/{}/repos", organization.login))
            .await?;
        Ok(repos.into_iter().map(Into::into).collect())
    }

    async fn list_user_repositories(&self) -> AppResult<Vec<RemoteRepository>> {
        let repos: Vec<GitHubRepo> = self.get_paginated("/user/repos").await?;
        Ok(repos.into_iter().map(Into::into).collect())
    }
}

/// Extract the `rel="next"` target from a `Link` header.
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    #[serde(default)]
    gravatar_id: Option<String>,
}

impl From<GitHubUser> for RemoteUser {
    fn from(u: GitHubUser) -> Self {
        Self {
            id: u.id,
            login: u.login,
            // GitHub sends an empty string when there is no gravatar.
            gravatar_id: u.gravatar_id.filter(|g| !g.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubOrgSummary {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubOrg {
    id: i64,
    login: String,
    #[serde(default)]
    name: Option<String>,
}

impl From<GitHubOrg> for RemoteOrganization {
    fn from(o: GitHubOrg) -> Self {
        Self {
            id: o.id,
            name: o.name.filter(|n| !n.is_empty()),
            login: o.login,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubOwner {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
struct GitHubPermissions {
    #[serde(default)]
    admin: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    id: i64,
    name: String,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    fork: bool,
    private: bool,
    owner: GitHubOwner,
    #[serde(default)]
    permissions: Option<GitHubPermissions>,
}

impl From<GitHubRepo> for RemoteRepository {
    fn from(r: GitHubRepo) -> Self {
        let organization = (r.owner.kind == "Organization").then_some(r.owner.id);
        Self {
            id: r.id,
            name: r.name,
            url: r.html_url,
            description: r.description,
            fork: r.fork,
            private: r.private,
            admin: r.permissions.unwrap_or_default().admin,
            organization,
        }
    }
}
