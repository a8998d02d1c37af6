//! Outcome accounting for a provisioning run.

use serde::Serialize;
use tracing::warn;

/// Provisioning stage a warning was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Roster,
    Teams,
    Invitations,
    Repositories,
    Permissions,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Roster => "roster",
            Self::Teams => "teams",
            Self::Invitations => "invitations",
            Self::Repositories => "repositories",
            Self::Permissions => "permissions",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal problem: the unit of work named by `subject` was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub stage: Stage,
    /// What was being worked on (team name, repository, email, roster line).
    pub subject: String,
    pub message: String,
}

/// Counters and warnings accumulated over one run.
///
/// A run that returns a report completed; warnings never change the exit
/// status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub teams_found: usize,
    pub teams_created: usize,
    pub teams_failed: usize,
    pub invitations_sent: usize,
    pub invitations_failed: usize,
    pub invitations_skipped: usize,
    pub repositories_existing: usize,
    pub repositories_created: usize,
    pub repositories_failed: usize,
    pub grants_applied: usize,
    pub grants_failed: usize,
    pub grants_skipped: usize,
    pub rows_skipped: usize,
    pub warnings: Vec<Warning>,
}

impl RunReport {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Logs a warning and records it.
    pub(crate) fn warn(&mut self, stage: Stage, subject: impl Into<String>, message: impl Into<String>) {
        let warning = Warning {
            stage,
            subject: subject.into(),
            message: message.into(),
        };
        warn!(
            stage = %warning.stage,
            subject = %warning.subject,
            "{}",
            warning.message
        );
        self.warnings.push(warning);
    }

    /// Warnings raised in `stage`.
    pub fn warnings_in(&self, stage: Stage) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.stage == stage)
    }
}
