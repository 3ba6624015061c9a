#![allow(dead_code)]

use release_announcer::Endpoints;
use release_announcer::changes::{Change, ChangeKey, Commit, TicketKey};
use release_announcer::config::{Config, PerformanceConfig};
use serde_json::{Value, json};

pub const REPOSITORY: &str = "acme/storefront";
pub const GITHUB_TOKEN: &str = "gh-secret";
pub const JIRA_TOKEN: &str = "jira-secret";
pub const SLACK_HOOK_PATH: &str = "/hooks/release";

/// Configuration pointing the tracker at a mock server, without retries
pub fn test_config(jira_url: &str) -> Config {
    Config {
        jira_url: jira_url.to_string(),
        performance: PerformanceConfig {
            retry_attempts: 0,
            request_timeout_seconds: 5,
            ..PerformanceConfig::default()
        },
        ..Config::default()
    }
}

pub fn test_endpoints(github_url: &str, slack_url: &str) -> Endpoints {
    Endpoints {
        api_url: github_url.to_string(),
        repository: REPOSITORY.to_string(),
        github_token: GITHUB_TOKEN.to_string(),
        slack_webhook: slack_url.to_string(),
        jira_token: JIRA_TOKEN.to_string(),
    }
}

/// A page of the pull request commits endpoint
pub fn commit_page(messages: &[&str]) -> Value {
    Value::Array(
        messages
            .iter()
            .map(|message| json!({ "sha": "0000000", "commit": { "message": message } }))
            .collect(),
    )
}

pub fn commits(messages: &[&str]) -> Vec<Commit> {
    messages.iter().map(|message| Commit::new(*message)).collect()
}

pub fn ticket(key: &str) -> ChangeKey {
    let (prefix, number) = key.split_once('-').expect("test keys contain a hyphen");
    ChangeKey::Ticket(TicketKey::from_parts(prefix, number))
}

pub fn keys_in_order(changes: &[Change]) -> Vec<String> {
    changes.iter().map(|change| change.ticket.to_string()).collect()
}
