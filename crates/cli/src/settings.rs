//! Turns raw arguments into validated domain configuration.

use anyhow::Context;
use github::GithubClient;
use provisioning::{OrgName, ProvisionConfig, ProvisionError, TeamScope};
use secrecy::SecretString;

use crate::args::{CommonArgs, ProvisionArgs};

fn missing(what: &str) -> ProvisionError {
    ProvisionError::ConfigurationError {
        message: format!("{what} is required"),
    }
}

/// Builds the provisioning configuration.
///
/// # Errors
///
/// [`ProvisionError::ConfigurationError`] when the organization is missing or
/// any value fails validation.
pub fn provision_config(args: &ProvisionArgs) -> Result<ProvisionConfig, ProvisionError> {
    let common = &args.common;
    let org = common
        .org
        .as_deref()
        .ok_or_else(|| missing("--org (or PROVISION_ORG)"))?;
    Ok(ProvisionConfig::new(org, &common.admin_team)?
        .with_scope(TeamScope::from_max(common.max_team)?)
        .with_invite_role(args.invite_role)
        .with_team_privacy(args.team_privacy)
        .with_dry_run(args.dry_run))
}

/// The organization and team scope a report covers.
pub fn report_target(common: &CommonArgs) -> Result<(OrgName, TeamScope), ProvisionError> {
    let org = common
        .org
        .as_deref()
        .and_then(OrgName::new)
        .ok_or_else(|| missing("--org (or PROVISION_ORG)"))?;
    Ok((org, TeamScope::from_max(common.max_team)?))
}

/// Creates the live GitHub client.
///
/// # Errors
///
/// [`ProvisionError::ConfigurationError`] when no token is configured, and
/// the underlying [`provisioning::GithubError`] if the HTTP client cannot be built.
pub fn github_client(common: &CommonArgs) -> anyhow::Result<GithubClient> {
    let token = common
        .github_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| missing("GITHUB_TOKEN"))?;
    GithubClient::with_api_url(SecretString::from(token.to_string()), common.api_url.clone())
        .context("could not build the GitHub client")
}
