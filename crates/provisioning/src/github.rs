//! GitHub-facing port traits and their error type.
//!
//! The provisioning logic never talks HTTP. It sees only
//! [`OrganizationAdmin`] (everything needed to provision teams,
//! repositories, permissions and invitations) and [`PullRequestReader`]
//! (the weekly report). The `github` crate implements both over the REST API;
//! [`crate::DryRunAdmin`] implements [`OrganizationAdmin`] by recording
//! writes instead of performing them.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    Invitation, OrgName, PermissionLevel, PullRequest, PullRequestState, RepositoryName, Team,
    TeamName, TeamPrivacy, TeamSlug,
};

/// Failures reported by a GitHub port implementation.
///
/// Callers decide severity: a failure is a warning for the unit of work that
/// hit it unless it happens in the preflight check or while resolving the
/// admin team.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GithubError {
    /// The token was missing, expired or revoked (HTTP 401).
    #[error("GitHub rejected the credentials: {message}")]
    Unauthorized { message: String },

    /// The token is valid but lacks the required scope or role (HTTP 403).
    #[error("GitHub denied access: {message}")]
    Forbidden { message: String },

    /// The addressed resource does not exist (HTTP 404).
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// GitHub refused the request body (HTTP 422), e.g. a team name that is
    /// already taken or an invitee who is already a member.
    #[error("GitHub rejected the request: {message}")]
    Unprocessable { message: String },

    /// Any other non-success status.
    #[error("Unexpected HTTP status {status} from GitHub: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, timeout).
    #[error("Could not reach GitHub: {message}")]
    Transport { message: String },

    /// A success response whose body did not have the expected shape.
    #[error("Could not decode GitHub response: {message}")]
    Decode { message: String },
}

/// Organization administration operations used by the provisioning stages.
///
/// Every mutating method is expected to be safe to repeat: callers look
/// resources up before creating them, and permission grants are replaces.
#[async_trait]
pub trait OrganizationAdmin: Send + Sync {
    /// Confirms the organization exists and the credentials can see it.
    async fn verify_organization(&self, org: &OrgName) -> Result<(), GithubError>;

    /// Looks up a team by exact display name.
    async fn find_team_by_name(
        &self,
        org: &OrgName,
        name: &TeamName,
    ) -> Result<Option<Team>, GithubError>;

    /// Creates a team. Fails with [`GithubError::Unprocessable`] if the name
    /// is already in use.
    async fn create_team(
        &self,
        org: &OrgName,
        name: &TeamName,
        privacy: TeamPrivacy,
    ) -> Result<Team, GithubError>;

    /// Returns whether `org/repo` exists.
    async fn repository_exists(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<bool, GithubError>;

    /// Creates a public, empty repository owned by the organization.
    async fn create_repository(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<(), GithubError>;

    /// Sets (replaces) a team's permission on an organization repository.
    async fn grant_team_permission(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        repo: &RepositoryName,
        level: PermissionLevel,
    ) -> Result<(), GithubError>;

    /// Sends an organization invitation.
    async fn create_invitation(
        &self,
        org: &OrgName,
        invitation: &Invitation,
    ) -> Result<(), GithubError>;
}

/// Read-only pull request listing used by the weekly report.
#[async_trait]
pub trait PullRequestReader: Send + Sync {
    /// Lists up to `limit` pull requests targeting `base`, newest first.
    async fn list_pull_requests(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
        base: &str,
        state: PullRequestState,
        limit: u8,
    ) -> Result<Vec<PullRequest>, GithubError>;
}
