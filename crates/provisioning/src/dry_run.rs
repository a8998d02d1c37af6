//! Recording executor for dry runs.
//!
//! [`DryRunAdmin`] wraps a real [`OrganizationAdmin`]. Lookups are delegated
//! so the run sees the organization as it really is; every mutating call is
//! logged, recorded as a [`PlannedAction`] and answered locally. Teams the run
//! "creates" get a placeholder slug and id so later stages can reference them.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::{
    GithubError, Invitation, OrgName, OrganizationAdmin, PermissionLevel, RepositoryName, Team,
    TeamId, TeamName, TeamPrivacy, TeamSlug,
};

/// Placeholder ids count down from here, well clear of real GitHub ids.
const PLACEHOLDER_ID_CEILING: u64 = u64::MAX;

/// A mutation a dry run would have made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum PlannedAction {
    CreateTeam {
        name: TeamName,
        privacy: TeamPrivacy,
    },
    CreateRepository {
        repository: String,
    },
    GrantPermission {
        team: TeamSlug,
        repository: String,
        level: PermissionLevel,
    },
    Invite {
        invitation: Invitation,
    },
}

#[derive(Default)]
struct Recorded {
    actions: Vec<PlannedAction>,
    teams: HashMap<TeamName, Team>,
    repositories: HashSet<RepositoryName>,
}

/// [`OrganizationAdmin`] that never mutates the organization.
pub struct DryRunAdmin<A> {
    inner: A,
    recorded: Mutex<Recorded>,
}

impl<A> DryRunAdmin<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    /// Every mutation recorded so far, in call order.
    pub fn planned_actions(&self) -> Vec<PlannedAction> {
        self.lock().actions.clone()
    }

    /// Returns the wrapped executor.
    pub fn into_inner(self) -> A {
        self.inner
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<A: OrganizationAdmin> OrganizationAdmin for DryRunAdmin<A> {
    async fn verify_organization(&self, org: &OrgName) -> Result<(), GithubError> {
        self.inner.verify_organization(org).await
    }

    async fn find_team_by_name(
        &self,
        org: &OrgName,
        name: &TeamName,
    ) -> Result<Option<Team>, GithubError> {
        let planned = self.lock().teams.get(name).cloned();
        if planned.is_some() {
            return Ok(planned);
        }
        self.inner.find_team_by_name(org, name).await
    }

    async fn create_team(
        &self,
        org: &OrgName,
        name: &TeamName,
        privacy: TeamPrivacy,
    ) -> Result<Team, GithubError> {
        let mut recorded = self.lock();
        let id = TeamId::new(PLACEHOLDER_ID_CEILING - recorded.teams.len() as u64);
        let team = Team {
            name: name.clone(),
            slug: TeamSlug::from_name(name),
            id,
        };
        info!(
            dry_run = true,
            org = %org,
            team = %name,
            placeholder_slug = %team.slug,
            placeholder_id = %team.id,
            "Would create team"
        );
        recorded.actions.push(PlannedAction::CreateTeam {
            name: name.clone(),
            privacy,
        });
        recorded.teams.insert(name.clone(), team.clone());
        Ok(team)
    }

    async fn repository_exists(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<bool, GithubError> {
        let planned = self.lock().repositories.contains(repo);
        if planned {
            return Ok(true);
        }
        self.inner.repository_exists(org, repo).await
    }

    async fn create_repository(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<(), GithubError> {
        let repository = repo.full_name(org);
        info!(dry_run = true, repository = %repository, "Would create public repository");
        let mut recorded = self.lock();
        recorded
            .actions
            .push(PlannedAction::CreateRepository { repository });
        recorded.repositories.insert(repo.clone());
        Ok(())
    }

    async fn grant_team_permission(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        repo: &RepositoryName,
        level: PermissionLevel,
    ) -> Result<(), GithubError> {
        let repository = repo.full_name(org);
        info!(
            dry_run = true,
            team = %team,
            repository = %repository,
            permission = %level,
            "Would grant team permission"
        );
        self.lock().actions.push(PlannedAction::GrantPermission {
            team: team.clone(),
            repository,
            level,
        });
        Ok(())
    }

    async fn create_invitation(
        &self,
        org: &OrgName,
        invitation: &Invitation,
    ) -> Result<(), GithubError> {
        info!(
            dry_run = true,
            org = %org,
            email = %invitation.email,
            role = %invitation.role,
            team_ids = ?invitation.team_ids,
            "Would send invitation"
        );
        self.lock().actions.push(PlannedAction::Invite {
            invitation: invitation.clone(),
        });
        Ok(())
    }
}
