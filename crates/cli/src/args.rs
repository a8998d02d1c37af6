//! Command-line surface. Every option also reads from an environment
//! variable so the tool can be driven from a `.env` file.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use github::DEFAULT_API_URL;
use provisioning::{OrgRole, TeamPrivacy, DEFAULT_ADMIN_TEAM};

pub const DEFAULT_ROSTER: &str = "./members.csv";

#[derive(Parser)]
#[command(
    name = "gh-org-provision",
    version,
    about = "Provision GitHub teams, repositories and invitations from a CSV roster",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub provision: ProvisionArgs,
}

impl Cli {
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Some(Command::Report(args)) => &args.common,
            None => &self.provision.common,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print this week's open and merged pull requests for every team.
    Report(ReportArgs),
}

/// Options shared by provisioning and the report.
#[derive(Args)]
pub struct CommonArgs {
    /// Organization to provision into.
    #[arg(long, env = "PROVISION_ORG")]
    pub org: Option<String>,

    /// Team granted admin on every repository and added to every invitation.
    #[arg(long, env = "PROVISION_ADMIN_TEAM", default_value = DEFAULT_ADMIN_TEAM)]
    pub admin_team: String,

    /// Provision Team1..=N instead of the teams named in the roster.
    #[arg(long, env = "PROVISION_MAX_TEAM")]
    pub max_team: Option<u32>,

    /// Token with `admin:org` and `repo` scopes.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "PROVISION_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Args)]
pub struct ProvisionArgs {
    /// CSV file with `team_no,email` rows.
    #[arg(value_name = "ROSTER", default_value = DEFAULT_ROSTER)]
    pub roster: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Organization role given to invitees (`direct_member` or `admin`).
    #[arg(long, env = "PROVISION_INVITE_ROLE", default_value = "direct_member")]
    pub invite_role: OrgRole,

    /// Privacy of teams this run creates (`closed` or `secret`).
    #[arg(long, env = "PROVISION_TEAM_PRIVACY", default_value = "closed")]
    pub team_privacy: TeamPrivacy,

    /// Log every change instead of making it.
    #[arg(
        long,
        env = "PROVISION_DRY_RUN",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub dry_run: bool,

    /// Print the run summary to stdout as JSON.
    #[arg(long)]
    pub summary_json: bool,
}

#[derive(Args)]
pub struct ReportArgs {
    /// CSV roster used to discover team numbers when `--max-team` is not set.
    #[arg(value_name = "ROSTER", default_value = DEFAULT_ROSTER)]
    pub roster: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
