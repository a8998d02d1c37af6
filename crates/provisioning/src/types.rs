//! Shared value types for the provisioning domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! several fields or a closed set of values and participate in provisioning
//! decisions (which role to invite with, which permission to grant).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EmailAddress, RepositoryName, TeamId, TeamName, TeamNumber, TeamSlug};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One validated line of the roster: a member and the team they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    /// 1-based line number in the source file, kept for log readability.
    pub line: u64,
    /// Team the member is assigned to.
    pub team: TeamNumber,
    /// Address the organization invitation is sent to.
    pub email: EmailAddress,
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// A GitHub team as resolved by name lookup or creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: TeamName,
    pub slug: TeamSlug,
    pub id: TeamId,
}

/// Visibility of a newly created team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamPrivacy {
    /// Visible to every organization member.
    #[default]
    Closed,
    /// Visible only to team members and owners.
    Secret,
}

impl TeamPrivacy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Secret => "secret",
        }
    }
}

/// Returned when a string does not name a known [`TeamPrivacy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown team privacy '{0}' (expected 'closed' or 'secret')")]
pub struct UnknownPrivacy(pub String);

impl std::str::FromStr for TeamPrivacy {
    type Err = UnknownPrivacy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closed" => Ok(Self::Closed),
            "secret" => Ok(Self::Secret),
            _ => Err(UnknownPrivacy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Repositories and permissions
// ---------------------------------------------------------------------------

/// The two repositories every team receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryFlavor {
    Backend,
    Frontend,
}

impl RepositoryFlavor {
    /// Both flavours, in provisioning order.
    pub const ALL: [RepositoryFlavor; 2] = [RepositoryFlavor::Backend, RepositoryFlavor::Frontend];

    /// Name suffix appended to `Team<N>`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Backend => "_BE",
            Self::Frontend => "_FE",
        }
    }

    /// Short label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Backend => "BE",
            Self::Frontend => "FE",
        }
    }
}

/// Permission level a team holds on a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// Read and write access; granted to the owning team.
    Push,
    /// Full administrative access; granted to the admin team.
    Admin,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

/// Organization-level role an invitee receives on acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Regular organization member.
    #[default]
    DirectMember,
    /// Organization owner.
    Admin,
}

impl OrgRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DirectMember => "direct_member",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`OrgRole`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown organization role '{0}' (expected 'direct_member' or 'admin')")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for OrgRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct_member" | "member" => Ok(Self::DirectMember),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// A pending organization invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub email: EmailAddress,
    pub role: OrgRole,
    pub team_ids: Vec<TeamId>,
}

// ---------------------------------------------------------------------------
// Pull requests (weekly report)
// ---------------------------------------------------------------------------

/// Which pull requests to list for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    Open,
    Closed,
}

impl PullRequestState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// The subset of a pull request the weekly report needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub repository: RepositoryName,
    pub number: u64,
    pub title: String,
    /// Source branch name.
    pub head_ref: String,
    pub updated_at: Timestamp,
    /// `None` for open pull requests and for ones closed without merging.
    pub merged_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
