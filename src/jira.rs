//! Jira ticket lookups

use crate::changes::{TicketDetails, TicketKey, TicketSource};
use crate::log_debug;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct IssueResponse {
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    status: Option<IssueStatus>,
}

#[derive(Debug, Deserialize)]
struct IssueStatus {
    name: String,
}

/// Reads ticket summary and status from the Jira REST API
pub struct JiraClient {
    client: Client,
    base_url: Url,
}

impl JiraClient {
    /// `token` is sent as-is after `Basic `, so it must already be the
    /// base64 encoded `user:api-token` pair.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Basic {}", token.trim()))
            .context("Invalid Jira token")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create Jira client")?;

        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid Jira URL: {base_url}"))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl TicketSource for JiraClient {
    async fn fetch_ticket(&self, key: &TicketKey) -> Result<Option<TicketDetails>> {
        let mut url = self.base_url.join(&format!("rest/api/3/issue/{key}"))?;
        url.query_pairs_mut().append_pair("fields", "summary,status");

        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            log_debug!("Jira returned {} for {}", response.status(), key);
            return Ok(None);
        }

        let issue: IssueResponse = response
            .json()
            .await
            .with_context(|| format!("Unexpected Jira response for {key}"))?;

        Ok(Some(TicketDetails {
            summary: issue.fields.summary,
            status: issue.fields.status.map(|status| status.name).unwrap_or_default(),
        }))
    }
}
