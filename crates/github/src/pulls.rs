use async_trait::async_trait;
use provisioning::{
    GithubError, OrgName, PullRequest, PullRequestReader, PullRequestState, RepositoryName,
};
use reqwest::Method;

use crate::client::{decode, GithubClient};
use crate::models::PullRequestPayload;

#[async_trait]
impl PullRequestReader for GithubClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_pull_requests(
        &self,
        org: &OrgName,
        repo: &RepositoryName,
        base: &str,
        state: PullRequestState,
        limit: u8,
    ) -> Result<Vec<PullRequest>, GithubError> {
        let per_page = limit.to_string();
        let request = self
            .request(Method::GET, &format!("/repos/{org}/{repo}/pulls"))
            .query(&[
                ("base", base),
                ("state", state.as_str()),
                ("sort", "updated"),
                ("direction", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        let response = self.send(request, &repo.full_name(org)).await?;
        let payloads: Vec<PullRequestPayload> = decode(response).await?;
        Ok(payloads
            .into_iter()
            .map(|payload| payload.into_pull_request(repo.clone()))
            .collect())
    }
}
