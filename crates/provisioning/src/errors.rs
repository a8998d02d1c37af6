//! Fatal error type for the provisioning domain.
//!
//! [`ProvisionError`] covers conditions that halt a run. Everything else a
//! run can hit (a malformed roster line, a duplicate invitation, a repository
//! that could not be created) is a warning: it is logged, recorded in the
//! [`crate::RunReport`], and the run carries on. Component-level failures
//! from GitHub are [`crate::GithubError`] and only become fatal when wrapped
//! here.

use std::path::PathBuf;

use thiserror::Error;

use crate::{GithubError, OrgName, TeamName};

/// Errors that stop a provisioning or report run.
///
/// Re-running the whole process after fixing the cause is the recovery path;
/// nothing a partial run created is rolled back.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The roster file does not exist or could not be read.
    #[error("Roster file '{}' could not be read: {message}", path.display())]
    RosterUnreadable {
        path: PathBuf,
        /// Underlying I/O or CSV failure.
        message: String,
    },

    /// The roster file was read but no line survived validation.
    #[error("Roster file '{}' contains no usable rows ({skipped} skipped)", path.display())]
    RosterEmpty { path: PathBuf, skipped: usize },

    /// The organization could not be reached or the credentials were refused.
    ///
    /// Produced by the preflight check before any stage runs.
    #[error("Organization '{org}' is not accessible: {source}")]
    OrganizationUnavailable {
        org: OrgName,
        #[source]
        source: GithubError,
    },

    /// The admin team could neither be found nor created.
    ///
    /// Every invitation and repository binding depends on it, so the run
    /// cannot continue.
    #[error("Admin team '{name}' could not be resolved: {source}")]
    AdminTeamUnresolved {
        name: TeamName,
        #[source]
        source: GithubError,
    },

    /// The runtime configuration is invalid.
    ///
    /// Produced at startup; no GitHub call is made with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
