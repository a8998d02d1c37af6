//! In-memory organization used by the orchestrator tests.
//!
//! Behaves like GitHub where it matters for idempotence: team names are
//! unique, repository creation fails if the name is taken, grants replace,
//! and a second invitation for the same email is rejected.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use provisioning::{
    parse_roster, GithubError, Invitation, OrgName, OrganizationAdmin, PermissionLevel,
    RepositoryName, Roster, Team, TeamId, TeamName, TeamPrivacy, TeamSlug,
};

#[derive(Default)]
struct State {
    teams: Vec<Team>,
    repositories: BTreeSet<String>,
    grants: BTreeMap<(String, String), PermissionLevel>,
    invitations: Vec<Invitation>,
    members: HashSet<String>,
    mutations: usize,
    next_id: u64,
}

#[derive(Default)]
pub struct FakeOrg {
    state: Mutex<State>,
    /// Team names whose creation always fails.
    pub reject_team_creation: HashSet<String>,
    /// Team names whose creation fails after someone else created them.
    pub racing_team_creation: HashSet<String>,
    /// Team names whose lookup always fails.
    pub failing_team_lookup: HashSet<String>,
    /// Repository names whose creation always fails.
    pub reject_repository_creation: HashSet<String>,
    /// Makes `verify_organization` fail.
    pub unreachable: bool,
}

impl FakeOrg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, email: &str) -> Self {
        self.state.lock().unwrap().members.insert(email.to_string());
        self
    }

    pub fn with_existing_team(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            insert_team(&mut state, name);
        }
        self
    }

    pub fn team_names(&self) -> BTreeSet<String> {
        let state = self.state.lock().unwrap();
        state.teams.iter().map(|t| t.name.to_string()).collect()
    }

    pub fn team(&self, name: &str) -> Option<Team> {
        let state = self.state.lock().unwrap();
        state.teams.iter().find(|t| t.name.as_str() == name).cloned()
    }

    pub fn repositories(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().repositories.clone()
    }

    pub fn grant(&self, slug: &str, repo: &str) -> Option<PermissionLevel> {
        let state = self.state.lock().unwrap();
        state
            .grants
            .get(&(slug.to_string(), repo.to_string()))
            .copied()
    }

    pub fn grant_count(&self) -> usize {
        self.state.lock().unwrap().grants.len()
    }

    pub fn invitations(&self) -> Vec<Invitation> {
        self.state.lock().unwrap().invitations.clone()
    }

    pub fn mutations(&self) -> usize {
        self.state.lock().unwrap().mutations
    }
}

fn insert_team(state: &mut State, name: &str) -> Team {
    state.next_id += 1;
    let name = TeamName::new(name).unwrap();
    let team = Team {
        slug: TeamSlug::from_name(&name),
        name,
        id: TeamId::new(1000 + state.next_id),
    };
    state.teams.push(team.clone());
    team
}

#[async_trait]
impl OrganizationAdmin for FakeOrg {
    async fn verify_organization(&self, org: &OrgName) -> Result<(), GithubError> {
        if self.unreachable {
            return Err(GithubError::Unauthorized {
                message: format!("Bad credentials for {org}"),
            });
        }
        Ok(())
    }

    async fn find_team_by_name(
        &self,
        _org: &OrgName,
        name: &TeamName,
    ) -> Result<Option<Team>, GithubError> {
        if self.failing_team_lookup.contains(name.as_str()) {
            return Err(GithubError::UnexpectedStatus {
                status: 502,
                message: "Server Error".into(),
            });
        }
        let state = self.state.lock().unwrap();
        Ok(state.teams.iter().find(|t| &t.name == name).cloned())
    }

    async fn create_team(
        &self,
        _org: &OrgName,
        name: &TeamName,
        _privacy: TeamPrivacy,
    ) -> Result<Team, GithubError> {
        let mut state = self.state.lock().unwrap();
        state.mutations += 1;
        if self.reject_team_creation.contains(name.as_str()) {
            return Err(GithubError::Forbidden {
                message: "Must have admin rights to create teams".into(),
            });
        }
        if self.racing_team_creation.contains(name.as_str()) {
            insert_team(&mut state, name.as_str());
            return Err(GithubError::Unprocessable {
                message: "Name must be unique for this org".into(),
            });
        }
        if state.teams.iter().any(|t| &t.name == name) {
            return Err(GithubError::Unprocessable {
                message: "Name must be unique for this org".into(),
            });
        }
        Ok(insert_team(&mut state, name.as_str()))
    }

    async fn repository_exists(
        &self,
        _org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<bool, GithubError> {
        let state = self.state.lock().unwrap();
        Ok(state.repositories.contains(repo.as_str()))
    }

    async fn create_repository(
        &self,
        _org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<(), GithubError> {
        let mut state = self.state.lock().unwrap();
        state.mutations += 1;
        if self.reject_repository_creation.contains(repo.as_str()) {
            return Err(GithubError::Forbidden {
                message: "Repository creation is restricted".into(),
            });
        }
        if !state.repositories.insert(repo.to_string()) {
            return Err(GithubError::Unprocessable {
                message: "name already exists on this account".into(),
            });
        }
        Ok(())
    }

    async fn grant_team_permission(
        &self,
        _org: &OrgName,
        team: &TeamSlug,
        repo: &RepositoryName,
        level: PermissionLevel,
    ) -> Result<(), GithubError> {
        let mut state = self.state.lock().unwrap();
        state.mutations += 1;
        if !state.repositories.contains(repo.as_str()) {
            return Err(GithubError::NotFound {
                resource: repo.to_string(),
            });
        }
        state
            .grants
            .insert((team.to_string(), repo.to_string()), level);
        Ok(())
    }

    async fn create_invitation(
        &self,
        _org: &OrgName,
        invitation: &Invitation,
    ) -> Result<(), GithubError> {
        let mut state = self.state.lock().unwrap();
        state.mutations += 1;
        let email = invitation.email.as_str();
        let already_invited = state.invitations.iter().any(|i| i.email == invitation.email);
        if already_invited || state.members.contains(email) {
            return Err(GithubError::Unprocessable {
                message: "Invitee is already a part of this organization".into(),
            });
        }
        state.invitations.push(invitation.clone());
        Ok(())
    }
}

pub fn roster(text: &str) -> Roster {
    parse_roster(text.as_bytes(), Path::new("members.csv")).unwrap()
}
