use async_trait::async_trait;
use provisioning::{
    GithubError, Invitation, OrgName, OrganizationAdmin, PermissionLevel, RepositoryName, Team,
    TeamName, TeamPrivacy, TeamSlug,
};
use reqwest::Method;
use tracing::debug;

use crate::client::{decode, GithubClient};
use crate::models::{
    CreateInvitationRequest, CreateRepositoryRequest, CreateTeamRequest, GrantPermissionRequest,
    TeamPayload,
};

/// Page size for the team listing (the API maximum).
const TEAMS_PER_PAGE: usize = 100;

#[async_trait]
impl OrganizationAdmin for GithubClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn verify_organization(&self, org: &OrgName) -> Result<(), GithubError> {
        let request = self.request(Method::GET, &format!("/orgs/{org}"));
        self.send(request, &format!("organization {org}")).await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_team_by_name(
        &self,
        org: &OrgName,
        name: &TeamName,
    ) -> Result<Option<Team>, GithubError> {
        let mut page = 1usize;
        loop {
            let request = self
                .request(Method::GET, &format!("/orgs/{org}/teams"))
                .query(&[("per_page", TEAMS_PER_PAGE), ("page", page)]);
            let response = self.send(request, &format!("teams of {org}")).await?;
            let teams: Vec<TeamPayload> = decode(response).await?;
            let fetched = teams.len();

            if let Some(found) = teams.into_iter().find(|t| t.name == name.as_str()) {
                return found.into_team().map(Some);
            }
            if fetched < TEAMS_PER_PAGE {
                debug!(pages = page, "team not present");
                return Ok(None);
            }
            page += 1;
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn create_team(
        &self,
        org: &OrgName,
        name: &TeamName,
        privacy: TeamPrivacy,
    ) -> Result<Team, GithubError> {
        let request = self
            .request(Method::POST, &format!("/orgs/{org}/teams"))
            .json(&CreateTeamRequest {
                name: name.as_str(),
                privacy: privacy.as_str(),
            });
        let response = self.send(request, &format!("organization {org}")).await?;
        decode::<TeamPayload>(response).await?.into_team()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn repository_exists(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<bool, GithubError> {
        let request = self.request(Method::GET, &format!("/repos/{org}/{repo}"));
        let response = self
            .send_optional(request, &repo.full_name(org))
            .await?;
        Ok(response.is_some())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn create_repository(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
    ) -> Result<(), GithubError> {
        let request = self
            .request(Method::POST, &format!("/orgs/{org}/repos"))
            .json(&CreateRepositoryRequest::public(repo.as_str()));
        self.send(request, &format!("organization {org}")).await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn grant_team_permission(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        repo: &RepositoryName,
        level: PermissionLevel,
    ) -> Result<(), GithubError> {
        let request = self
            .request(
                Method::PUT,
                &format!("/orgs/{org}/teams/{team}/repos/{org}/{repo}"),
            )
            .json(&GrantPermissionRequest {
                permission: level.as_str(),
            });
        self.send(request, &format!("team {team} or {}", repo.full_name(org)))
            .await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, invitation), fields(email = %invitation.email))]
    async fn create_invitation(
        &self,
        org: &OrgName,
        invitation: &Invitation,
    ) -> Result<(), GithubError> {
        let request = self
            .request(Method::POST, &format!("/orgs/{org}/invitations"))
            .json(&CreateInvitationRequest::from(invitation));
        self.send(request, &format!("organization {org}")).await?;
        Ok(())
    }
}
