//! GitHub REST calls used by the announcer
//!
//! Reads go through a bounded exponential-backoff retry; the changelog PATCH
//! is attempted once and its failure is returned to the caller.

use crate::changes::Commit;
use crate::log_debug;
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use url::Url;

/// Commits requested per history page
pub const COMMITS_PER_PAGE: usize = 100;

/// The parts of a pull request the announcer uses
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitData,
}

#[derive(Debug, Deserialize)]
struct CommitData {
    message: String,
}

/// Client for one repository's pull requests
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    repository: String,
    retry_attempts: usize,
}

impl GitHubClient {
    pub fn new(
        api_url: &str,
        token: &str,
        repository: &str,
        timeout: Duration,
        retry_attempts: usize,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("release-announcer/", env!("CARGO_PKG_VERSION"))),
        );
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.trim()))
            .context("Invalid GitHub token")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create GitHub client")?;

        // A trailing slash keeps any path prefix (GitHub Enterprise) when joining
        let api_url = Url::parse(&format!("{}/", api_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid GitHub API URL: {api_url}"))?;

        Ok(Self {
            client,
            api_url,
            repository: repository.trim_matches('/').to_string(),
            retry_attempts,
        })
    }

    fn pull_url(&self, number: u64, suffix: &str) -> Result<Url> {
        let path = format!("repos/{}/pulls/{number}{suffix}", self.repository);
        self.api_url
            .join(&path)
            .with_context(|| format!("Failed to build GitHub URL for {path}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let strategy = ExponentialBackoff::from_millis(10)
            .factor(2)
            .take(self.retry_attempts);

        Retry::spawn(strategy, || {
            log_debug!("GET {}", url);
            let request = self.client.get(url.clone());
            async move { request.send().await?.error_for_status()?.json::<T>().await }
        })
        .await
        .with_context(|| format!("GitHub request failed: GET {url}"))
    }

    pub async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let url = self.pull_url(number, "")?;
        self.get_json(&url).await
    }

    /// Fetches every commit of the pull request, oldest first.
    ///
    /// Pages are requested one after another until GitHub returns an empty
    /// page.
    pub async fn get_commit_history(&self, number: u64) -> Result<Vec<Commit>> {
        let mut history = Vec::new();
        let mut page = 1_u32;

        loop {
            let mut url = self.pull_url(number, "/commits")?;
            url.query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &COMMITS_PER_PAGE.to_string());

            let entries: Vec<CommitEntry> = self.get_json(&url).await?;
            log_debug!("Commit page {} returned {} commits", page, entries.len());

            if entries.is_empty() {
                break;
            }

            history.extend(entries.into_iter().map(|entry| Commit::new(entry.commit.message)));
            page += 1;
        }

        Ok(history)
    }

    /// Replaces the pull request description
    pub async fn update_pull_request_body(&self, number: u64, body: &str) -> Result<()> {
        let url = self.pull_url(number, "")?;
        log_debug!("PATCH {}", url);

        self.client
            .patch(url.clone())
            .json(&json!({ "body": body }))
            .send()
            .await
            .with_context(|| format!("GitHub request failed: PATCH {url}"))?
            .error_for_status()
            .with_context(|| format!("GitHub rejected the changelog update: PATCH {url}"))?;

        Ok(())
    }
}
