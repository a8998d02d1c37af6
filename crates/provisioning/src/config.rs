//! Runtime configuration for a provisioning run.
//!
//! The CLI gathers raw values from flags and environment variables; this
//! module turns them into a validated [`ProvisionConfig`]. A run never starts
//! with an invalid configuration.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{OrgName, OrgRole, ProvisionError, TeamName, TeamNumber, TeamPrivacy};

/// Default display name of the team that administers every repository.
pub const DEFAULT_ADMIN_TEAM: &str = "Admins";

/// Largest accepted `--max-team` bound. Each team costs about ten API calls.
pub const MAX_TEAM_RANGE: u32 = 1000;

/// Which team numbers a run provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TeamScope {
    /// Exactly the distinct team numbers that appear in the roster.
    #[default]
    Discovered,
    /// Every number in `1..=max`, whether or not the roster mentions it.
    /// Roster rows above `max` are skipped with a warning.
    Range { max: TeamNumber },
}

impl TeamScope {
    /// Builds the scope from an optional upper bound.
    pub fn from_max(max: Option<u32>) -> Result<Self, ProvisionError> {
        match max {
            None => Ok(Self::Discovered),
            Some(raw) if raw > MAX_TEAM_RANGE => Err(ProvisionError::ConfigurationError {
                message: format!("maximum team number {raw} exceeds the limit of {MAX_TEAM_RANGE}"),
            }),
            Some(raw) => TeamNumber::new(raw)
                .map(|max| Self::Range { max })
                .ok_or_else(|| ProvisionError::ConfigurationError {
                    message: "maximum team number must be at least 1".to_string(),
                }),
        }
    }

    /// Returns `true` if rows for team `number` take part in the run.
    pub fn contains(self, number: TeamNumber) -> bool {
        match self {
            Self::Discovered => true,
            Self::Range { max } => number <= max,
        }
    }

    /// Resolves the ordered, de-duplicated team numbers to provision.
    ///
    /// `discovered` is ignored for [`TeamScope::Range`].
    pub fn team_numbers(self, discovered: impl IntoIterator<Item = TeamNumber>) -> Vec<TeamNumber> {
        match self {
            Self::Discovered => discovered
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            Self::Range { max } => (1..=max.as_u32()).filter_map(TeamNumber::new).collect(),
        }
    }
}

/// Validated settings for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionConfig {
    /// Organization that owns every team and repository.
    pub org: OrgName,
    /// Team bound with `admin` permission to every repository and added to
    /// every invitation.
    pub admin_team: TeamName,
    pub scope: TeamScope,
    /// Organization role each invitee receives.
    pub invite_role: OrgRole,
    /// Privacy applied to teams this run creates.
    pub team_privacy: TeamPrivacy,
    /// When set, the run is executed against a recording executor and no
    /// mutating call reaches GitHub.
    pub dry_run: bool,
}

impl ProvisionConfig {
    /// Creates a configuration with defaults for everything but the names.
    pub fn new(org: &str, admin_team: &str) -> Result<Self, ProvisionError> {
        let org = OrgName::new(org).ok_or_else(|| ProvisionError::ConfigurationError {
            message: "organization name must not be empty".to_string(),
        })?;
        let admin_team =
            TeamName::new(admin_team).ok_or_else(|| ProvisionError::ConfigurationError {
                message: "admin team name must not be empty".to_string(),
            })?;
        if is_numbered_team_name(admin_team.as_str()) {
            return Err(ProvisionError::ConfigurationError {
                message: format!(
                    "admin team name '{admin_team}' collides with the Team<N> naming convention"
                ),
            });
        }
        Ok(Self {
            org,
            admin_team,
            scope: TeamScope::default(),
            invite_role: OrgRole::default(),
            team_privacy: TeamPrivacy::default(),
            dry_run: false,
        })
    }

    pub fn with_scope(mut self, scope: TeamScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_invite_role(mut self, role: OrgRole) -> Self {
        self.invite_role = role;
        self
    }

    pub fn with_team_privacy(mut self, privacy: TeamPrivacy) -> Self {
        self.team_privacy = privacy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

// GitHub compares team names case-insensitively.
fn is_numbered_team_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower
        .strip_prefix("team")
        .and_then(TeamNumber::parse)
        .is_some()
}
