//! Release and deployment announcements
//!
//! A new release reads the pull request's history, reduces it to ticket
//! changes, posts the announcement to Slack and writes the changelog back to
//! the pull request. Deployment announcements only post a one-line message.

use crate::action::Action;
use crate::changes::{
    Change, TicketMatcher, TicketSource, add_ticket_details, generate_changelog,
    group_history_as_changes, sort_changes_by_size,
};
use crate::config::Config;
use crate::github::{GitHubClient, PullRequest};
use crate::jira::JiraClient;
use crate::slack::{Block, HeaderBlock, SlackMessage, SlackWebhook, TextBlock};
use crate::{log_debug, log_info, ui};
use anyhow::{Context, Result};
use std::fmt;

/// Coordinates and credentials for the three services
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    pub api_url: String,
    pub repository: String,
    pub github_token: String,
    pub slack_webhook: String,
    pub jira_token: String,
}

/// Builds the human-facing URLs used in announcements
#[derive(Debug, Clone)]
pub struct Links {
    github_web_url: String,
    repository: String,
    ticket_browse_url: String,
}

impl Links {
    pub fn new(config: &Config, repository: &str) -> Self {
        Self {
            github_web_url: config.github_web_url.trim_end_matches('/').to_string(),
            repository: repository.trim_matches('/').to_string(),
            ticket_browse_url: config.ticket_browse_url.clone(),
        }
    }

    pub fn pr_url(&self, number: impl fmt::Display) -> String {
        format!("{}/{}/pull/{number}", self.github_web_url, self.repository)
    }

    pub fn ticket_url(&self, ticket: &str) -> String {
        format!("{}{ticket}", self.ticket_browse_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStage {
    Started,
    Completed,
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("started"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Composes the new-release announcement from the ordered changes.
///
/// `changes` must be in the same order as the rendered changelog.
pub fn prepare_release_message(
    product: &str,
    links: &Links,
    pr: &PullRequest,
    changes: &[Change],
) -> SlackMessage {
    let commit_count: usize = changes.iter().map(|change| change.commits).sum();

    SlackMessage::new(format!("New {product} Release proposed in PR #{}", pr.number))
        .add_block(TextBlock::new(format!(
            "A new *{product}* production release has been proposed in PR #{}",
            pr.number
        )))
        .add_block(HeaderBlock::new(pr.title.as_str()))
        .add_block(
            TextBlock::empty()
                .with_button(links.pr_url(pr.number), "View PR")
                .with_field(format!("{} Tickets", changes.len()))
                .with_field(format!("{commit_count} Commits")),
        )
        .add_block(Block::Divider)
        .add_blocks(changes.iter().map(|change| change_block(links, change)))
}

fn change_block(links: &Links, change: &Change) -> TextBlock {
    let ticket_url = links.ticket_url(change.ticket.as_str());
    let prs = change
        .prs
        .iter()
        .map(|pr| format!("<{}|#{pr}>", links.pr_url(pr)))
        .collect::<Vec<_>>()
        .join(", ");

    let text = format!(
        "<{ticket_url}|{}> *[{}]* {} {prs}",
        change.ticket, change.status, change.summary
    );

    TextBlock::new(text.trim_end()).with_button(ticket_url, "View")
}

/// Composes the one-line deployment announcement
pub fn deployment_message(
    product: &str,
    links: &Links,
    pr: &PullRequest,
    stage: DeploymentStage,
) -> SlackMessage {
    SlackMessage::new(format!(
        "{product} production deployment of PR #{} {stage}",
        pr.number
    ))
    .add_block(TextBlock::new(format!(
        "*{product}*: production deployment <{}|PR#{}> {stage}.",
        links.pr_url(pr.number),
        pr.number
    )))
}

/// Runs announcements against GitHub, Jira and Slack
pub struct Announcer {
    config: Config,
    links: Links,
    matcher: TicketMatcher,
    github: GitHubClient,
    tracker: Box<dyn TicketSource>,
    slack: SlackWebhook,
    dry_run: bool,
}

impl Announcer {
    /// Creates the service clients. With `dry_run` the announcement and
    /// changelog are printed instead of being sent.
    pub fn new(config: Config, endpoints: &Endpoints, dry_run: bool) -> Result<Self> {
        let timeout = config.request_timeout();
        let github = GitHubClient::new(
            &endpoints.api_url,
            &endpoints.github_token,
            &endpoints.repository,
            timeout,
            config.performance.retry_attempts,
        )?;
        let tracker = JiraClient::new(&config.jira_url, &endpoints.jira_token, timeout)?;
        let slack = SlackWebhook::new(endpoints.slack_webhook.as_str(), timeout)?;

        Ok(Self {
            links: Links::new(&config, &endpoints.repository),
            matcher: config.ticket_matcher()?,
            github,
            tracker: Box::new(tracker),
            slack,
            dry_run,
            config,
        })
    }

    pub async fn run(&self, action: Action, pr_number: u64) -> Result<()> {
        match action {
            Action::NewRelease => self.announce_new_release(pr_number).await.map(|_| ()),
            Action::DeployStart => {
                self.announce_deployment(pr_number, DeploymentStage::Started)
                    .await
            }
            Action::DeployComplete => {
                self.announce_deployment(pr_number, DeploymentStage::Completed)
                    .await
            }
        }
    }

    /// Announces a proposed release and returns the changelog written to the
    /// pull request.
    #[tracing::instrument(skip(self))]
    pub async fn announce_new_release(&self, pr_number: u64) -> Result<String> {
        log_info!("Announcing new release from PR #{}", pr_number);

        let pr = self.github.get_pull_request(pr_number).await?;
        let history = self.github.get_commit_history(pr_number).await?;
        log_debug!("PR #{} has {} commits", pr_number, history.len());

        let mut change_map = group_history_as_changes(&history, &self.matcher);

        let spinner = ui::create_spinner(&format!("Looking up {} tickets...", change_map.len()));
        let failed = add_ticket_details(
            &mut change_map,
            self.tracker.as_ref(),
            self.config.performance.max_concurrent_lookups,
        )
        .await;
        spinner.finish_and_clear();

        if failed > 0 {
            ui::print_warning(&format!(
                "Could not look up {failed} tickets; they are announced without summary or status"
            ));
        }

        let changes = sort_changes_by_size(change_map);
        let message = prepare_release_message(&self.config.product_name, &self.links, &pr, &changes);
        let changelog = generate_changelog(&changes);

        if self.dry_run {
            print_dry_run(&message, Some(&changelog))?;
            return Ok(changelog);
        }

        self.slack
            .send(&message)
            .await
            .context("Failed to post release announcement")?;
        self.github
            .update_pull_request_body(pr_number, &changelog)
            .await
            .context("Failed to write changelog to the pull request")?;

        ui::print_success(&format!(
            "Announced {} tickets from PR #{}",
            changes.len(),
            pr_number
        ));
        Ok(changelog)
    }

    #[tracing::instrument(skip(self))]
    pub async fn announce_deployment(&self, pr_number: u64, stage: DeploymentStage) -> Result<()> {
        log_info!("Announcing deployment {} for PR #{}", stage, pr_number);

        let pr = self.github.get_pull_request(pr_number).await?;
        let message = deployment_message(&self.config.product_name, &self.links, &pr, stage);

        if self.dry_run {
            return print_dry_run(&message, None);
        }

        self.slack
            .send(&message)
            .await
            .context("Failed to post deployment announcement")?;

        ui::print_success(&format!("Announced deployment {stage} for PR #{pr_number}"));
        Ok(())
    }
}

fn print_dry_run(message: &SlackMessage, changelog: Option<&str>) -> Result<()> {
    ui::print_info("Slack payload (not sent):");
    println!("{}", serde_json::to_string_pretty(&message.to_json())?);

    if let Some(changelog) = changelog {
        ui::print_info("Changelog (not written):");
        println!("{changelog}");
    }

    Ok(())
}
