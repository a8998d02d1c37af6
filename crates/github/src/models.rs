//! Request and response bodies for the endpoints this crate calls.
//!
//! Only the fields the adapter reads or writes are modelled; GitHub sends
//! many more.

use chrono::{DateTime, Utc};
use provisioning::{
    GithubError, Invitation, PullRequest, RepositoryName, Team, TeamId, TeamName, TeamSlug,
    Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct TeamPayload {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

impl TeamPayload {
    pub fn into_team(self) -> Result<Team, GithubError> {
        let name = TeamName::new(self.name).ok_or_else(|| GithubError::Decode {
            message: format!("team {} has an empty name", self.id),
        })?;
        let slug = TeamSlug::new(self.slug).ok_or_else(|| GithubError::Decode {
            message: format!("team '{name}' has an empty slug"),
        })?;
        Ok(Team {
            name,
            slug,
            id: TeamId::new(self.id),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTeamRequest<'a> {
    pub name: &'a str,
    pub privacy: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRepositoryRequest<'a> {
    pub name: &'a str,
    pub private: bool,
    pub visibility: &'static str,
    pub auto_init: bool,
}

impl<'a> CreateRepositoryRequest<'a> {
    /// An empty public repository.
    pub fn public(name: &'a str) -> Self {
        Self {
            name,
            private: false,
            visibility: "public",
            auto_init: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GrantPermissionRequest {
    pub permission: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateInvitationRequest<'a> {
    pub email: &'a str,
    pub role: &'static str,
    pub team_ids: Vec<u64>,
}

impl<'a> From<&'a Invitation> for CreateInvitationRequest<'a> {
    fn from(invitation: &'a Invitation) -> Self {
        Self {
            email: invitation.email.as_str(),
            role: invitation.role.as_str(),
            team_ids: invitation.team_ids.iter().map(|id| id.as_u64()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestPayload {
    pub number: u64,
    pub title: String,
    pub head: HeadPayload,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeadPayload {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

impl PullRequestPayload {
    pub fn into_pull_request(self, repository: RepositoryName) -> PullRequest {
        PullRequest {
            repository,
            number: self.number,
            title: self.title,
            head_ref: self.head.ref_name,
            updated_at: Timestamp::from_utc(self.updated_at),
            merged_at: self.merged_at.map(Timestamp::from_utc),
        }
    }
}
