//! Release announcer - CI bot for release pull requests
//!
//! Turns the commit history of a release pull request into a per-ticket
//! changelog, announces it in Slack and writes it back to the pull request.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic

pub mod action;
pub mod announce;
pub mod changes;
pub mod cli;
pub mod config;
pub mod github;
pub mod jira;
pub mod logger;
pub mod slack;
pub mod ui;

pub use action::Action;
pub use announce::{Announcer, Endpoints};
pub use config::Config;
