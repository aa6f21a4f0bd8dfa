//! GitLab v4 REST implementation of [`ProjectApi`].

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::api::ProjectApi;
use super::error::GitLabError;
use super::types::{NewGroup, NewProject, ProjectEdit, RemoteGroup, RemoteProject};

/// Maximum length for error bodies kept in errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Page size for search requests.
const SEARCH_PAGE_SIZE: &str = "100";

/// Upper bound on pages fetched for one search.
const MAX_SEARCH_PAGES: usize = 50;

/// Header carrying the next page number; empty on the last page.
const NEXT_PAGE_HEADER: &str = "x-next-page";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

fn truncate_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}

/// The next page to fetch, if the response says there is one.
fn next_page(headers: &HeaderMap) -> Option<String> {
    headers
        .get(NEXT_PAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::to_string)
}

/// Builds the API base (`{url}/api/v4`) from the instance URL.
pub(crate) fn api_base(url: &str) -> Result<String, GitLabError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(GitLabError::InvalidUrl {
            url: url.to_string(),
            reason: "expected an http:// or https:// URL".to_string(),
        });
    }
    Ok(format!("{}/api/v4", trimmed))
}

/// HTTP client for a single GitLab instance.
pub struct GitLabClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl GitLabClient {
    /// Creates a client for `url` (the instance root, not the API path).
    pub fn new(url: &str, token: SecretString, timeout: Duration) -> Result<Self, GitLabError> {
        let base_url = api_base(url)?;
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(TOKEN_HEADER, self.token.expose_secret())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, GitLabError> {
        let response = self.request(builder).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GitLabError::Status {
            status: status.as_u16(),
            message: truncate_body(&body),
        })
    }

    /// Runs a `search` query against `resource`, following pagination.
    async fn search<T: DeserializeOwned>(
        &self,
        resource: &str,
        fragment: &str,
    ) -> Result<Vec<T>, GitLabError> {
        let url = format!("{}/{}", self.base_url, resource);
        let mut items = Vec::new();
        let mut page = "1".to_string();

        for _ in 0..MAX_SEARCH_PAGES {
            let builder = self.client.get(url.as_str()).query(&[
                ("search", fragment),
                ("per_page", SEARCH_PAGE_SIZE),
                ("page", page.as_str()),
            ]);
            let response = self.send(builder).await?;
            let next = next_page(response.headers());
            items.extend(response.json::<Vec<T>>().await?);

            match next {
                Some(n) => page = n,
                None => return Ok(items),
            }
        }

        warn!(
            "Search for '{}' in {} stopped after {} pages",
            fragment, resource, MAX_SEARCH_PAGES
        );
        Ok(items)
    }
}

#[async_trait]
impl ProjectApi for GitLabClient {
    async fn search_groups(&self, fragment: &str) -> Result<Vec<RemoteGroup>, GitLabError> {
        debug!("Searching GitLab groups matching '{}'", fragment);
        self.search("groups", fragment).await
    }

    async fn create_group(&self, group: &NewGroup) -> Result<RemoteGroup, GitLabError> {
        debug!("Creating GitLab group '{}'", group.path);
        let url = format!("{}/groups", self.base_url);
        Ok(self.send(self.client.post(url).json(group)).await?.json().await?)
    }

    async fn search_projects(&self, fragment: &str) -> Result<Vec<RemoteProject>, GitLabError> {
        debug!("Searching GitLab projects matching '{}'", fragment);
        self.search("projects", fragment).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<RemoteProject, GitLabError> {
        debug!("Creating GitLab project '{}'", project.path);
        let url = format!("{}/projects", self.base_url);
        Ok(self
            .send(self.client.post(url).json(project))
            .await?
            .json()
            .await?)
    }

    async fn edit_project(
        &self,
        id: u64,
        edit: &ProjectEdit,
    ) -> Result<RemoteProject, GitLabError> {
        debug!("Editing GitLab project {}", id);
        let url = format!("{}/projects/{}", self.base_url, id);
        Ok(self.send(self.client.put(url).json(edit)).await?.json().await?)
    }

    async fn archive_project(&self, id: u64) -> Result<(), GitLabError> {
        debug!("Archiving GitLab project {}", id);
        let url = format!("{}/projects/{}/archive", self.base_url, id);
        self.send(self.client.post(url)).await?;
        Ok(())
    }

    async fn delete_project(&self, id: u64) -> Result<(), GitLabError> {
        debug!("Deleting GitLab project {}", id);
        let url = format!("{}/projects/{}", self.base_url, id);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
