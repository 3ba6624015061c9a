#![allow(clippy::unwrap_used)]

use clap::Parser;
use httpmock::prelude::*;
use release_announcer::cli::{self, Cli};
use std::io::Write;
use tempfile::NamedTempFile;

#[path = "test_utils.rs"]
mod test_utils;
use test_utils::{GITHUB_TOKEN, JIRA_TOKEN, REPOSITORY, SLACK_HOOK_PATH};

#[tokio::test]
async fn test_unknown_action_ends_quietly_without_contacting_services() {
    let github = MockServer::start_async().await;
    let jira = MockServer::start_async().await;
    let slack = MockServer::start_async().await;

    let github_any = github
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200);
        })
        .await;
    let jira_any = jira
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200);
        })
        .await;
    let slack_any = slack
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200);
        })
        .await;

    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "jira_url = \"{}\"", jira.base_url()).unwrap();

    let slack_url = slack.url(SLACK_HOOK_PATH);
    let github_url = github.base_url();
    let config_path = config.path().to_str().unwrap();

    let cli = Cli::try_parse_from([
        "release-announcer",
        "--action",
        "rollback",
        "--repository",
        REPOSITORY,
        "--ref",
        "refs/pull/7/merge",
        "--api-url",
        github_url.as_str(),
        "--github-token",
        GITHUB_TOKEN,
        "--slack-token",
        slack_url.as_str(),
        "--jira-token",
        JIRA_TOKEN,
        "--config",
        config_path,
        "--quiet",
    ])
    .unwrap();

    cli::run(cli).await.unwrap();

    github_any.assert_hits_async(0).await;
    jira_any.assert_hits_async(0).await;
    slack_any.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_malformed_ref_is_an_error() {
    let cli = Cli::try_parse_from([
        "release-announcer",
        "--action",
        "deploy-start",
        "--repository",
        REPOSITORY,
        "--ref",
        "refs/heads/main",
        "--api-url",
        "http://127.0.0.1:9",
        "--quiet",
    ])
    .unwrap();

    assert!(cli::run(cli).await.is_err());
}
