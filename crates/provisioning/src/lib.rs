//! Core provisioning domain for the organization roster provisioner.
//!
//! This crate contains every domain concept, newtype identifier, value type
//! and error type used to turn a roster of `team_number,email` rows into
//! GitHub teams, invitations, repositories and permission bindings.
//! Infrastructure crates implement the port traits defined here; they never
//! add provisioning rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no network I/O.
//! It defines *what* is needed from GitHub ([`OrganizationAdmin`],
//! [`PullRequestReader`]); the `github` crate defines *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`TeamNumber`, `TeamSlug`, `TeamId`, etc.) |
//! | [`types`] | Shared value types (`RosterRow`, `Team`, `PermissionLevel`, etc.) |
//! | [`errors`] | Fatal error type |
//! | [`github`] | Port traits and the GitHub error type |
//! | [`config`] | Validated run configuration and team scope |
//! | [`roster`] | Roster file loading and row validation |
//! | [`provision`] | The four-stage provisioning orchestrator |
//! | [`dry_run`] | Recording executor used for dry runs |
//! | [`summary`] | Run report and warnings |
//! | [`weekly`] | Weekly pull request report |

pub mod config;
pub mod dry_run;
pub mod errors;
pub mod github;
pub mod identifiers;
pub mod provision;
pub mod roster;
pub mod summary;
pub mod types;
pub mod weekly;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{ProvisionConfig, TeamScope, DEFAULT_ADMIN_TEAM, MAX_TEAM_RANGE};
pub use dry_run::{DryRunAdmin, PlannedAction};
pub use errors::ProvisionError;
pub use github::{GithubError, OrganizationAdmin, PullRequestReader};
pub use identifiers::{
    EmailAddress, OrgName, RepositoryName, RunId, TeamId, TeamName, TeamNumber, TeamSlug,
};
pub use provision::{Provisioner, RepositoryOutcome, TeamDirectory, TeamOutcome};
pub use roster::{load_roster, parse_roster, Roster, SkipReason, SkippedRow};
pub use summary::{RunReport, Stage, Warning};
pub use types::{
    Invitation, OrgRole, PermissionLevel, PullRequest, PullRequestState, RepositoryFlavor,
    RosterRow, Team, TeamPrivacy, Timestamp, UnknownPrivacy, UnknownRole,
};
pub use weekly::{build_weekly_report, report_cutoff, ReportEntry, WeeklyReport};
