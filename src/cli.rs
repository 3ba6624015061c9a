use crate::action::{Action, pr_number_from_ref};
use crate::announce::{Announcer, Endpoints};
use crate::config::Config;
use crate::{log_debug, log_error, ui};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, crate_version};
use std::path::PathBuf;

const LOG_FILE: &str = "release-announcer-debug.log";

/// Command-line arguments.
///
/// Every input can also come from the environment a GitHub Actions step
/// provides, so the binary runs unchanged inside a workflow.
#[derive(Parser, Debug)]
#[command(
    author,
    version = crate_version!(),
    about = "Announce release pull requests and their tickets",
    long_about = "Reads the commits of a release pull request, groups them by Jira ticket, posts an announcement to Slack and writes a changelog into the pull request description.",
    styles = get_styles(),
)]
pub struct Cli {
    /// Announcement to make: new-release, deploy-start or deploy-complete
    #[arg(long, env = "INPUT_ACTION")]
    pub action: String,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Pull request ref, e.g. refs/pull/42/merge
    #[arg(long = "ref", env = "GITHUB_REF")]
    pub git_ref: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// GitHub token
    #[arg(long, env = "INPUT_GITHUBTOKEN", default_value = "", hide_env_values = true)]
    pub github_token: String,

    /// Slack incoming webhook URL
    #[arg(long, env = "INPUT_SLACKTOKEN", default_value = "", hide_env_values = true)]
    pub slack_token: String,

    /// Jira credentials, base64 encoded user:token
    #[arg(long, env = "INPUT_JIRATOKEN", default_value = "", hide_env_values = true)]
    pub jira_token: String,

    /// Path to a TOML configuration file
    #[arg(long, env = "RELEASE_ANNOUNCER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the announcement and changelog instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Log debug messages to a file
    #[arg(short = 'l', long = "log")]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(long = "log-file")]
    pub log_file: Option<String>,

    /// Suppress non-essential output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Cli {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            api_url: self.api_url.clone(),
            repository: self.repository.clone(),
            github_token: self.github_token.clone(),
            slack_webhook: self.slack_token.clone(),
            jira_token: self.jira_token.clone(),
        }
    }
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Main function to parse arguments and run the requested announcement
pub async fn main() -> anyhow::Result<()> {
    run(parse_args()).await
}

/// Runs the announcement described by the parsed arguments.
///
/// An unknown action is reported and ends the run successfully without
/// contacting any service.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    let config = Config::load(cli.config.as_deref())?;

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
        crate::logger::set_verbose_logging(
            config.performance.verbose_logging || crate::logger::verbose_from_env(),
        );
    } else {
        crate::logger::disable_logging();
    }

    log_debug!(
        "Running action {:?} for {} at {}",
        cli.action,
        cli.repository,
        cli.git_ref
    );
    ui::print_info(&format!("Action = {}", cli.action));

    let action = match cli.action.parse::<Action>() {
        Ok(action) => action,
        Err(e) => {
            // An unknown action is reported but does not fail the step
            log_error!("{}", e);
            ui::print_error(&e.to_string());
            return Ok(());
        }
    };

    let pr_number = pr_number_from_ref(&cli.git_ref)?;
    let announcer = Announcer::new(config, &cli.endpoints(), cli.dry_run)?;
    announcer.run(action, pr_number).await
}
