//! Octocrab implementation of the pull request read gateway.

use async_trait::async_trait;
use octocrab::{Octocrab, Page};

use crate::github::error::GithubError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator, RepositoryLocator};
use crate::github::models::{ApiPullRequest, PullRequest};

use super::PullRequestGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error_with_rate_limit;

/// Octocrab-backed pull request read gateway.
pub struct OctocrabPullRequestGateway {
    client: Octocrab,
}

impl OctocrabPullRequestGateway {
    /// Creates a new gateway for the given token and API base URL.
    ///
    /// # Errors
    ///
    /// Returns `GithubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GithubError::Api` when Octocrab fails to construct a client.
    pub fn new(token: &PersonalAccessToken, api_base: &str) -> Result<Self, GithubError> {
        let client = build_octocrab_client(token, api_base)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabPullRequestGateway {
    async fn pull_request(&self, locator: &PullRequestLocator) -> Result<PullRequest, GithubError> {
        match self
            .client
            .get::<ApiPullRequest, _, _>(locator.pull_request_path(), None::<&()>)
            .await
        {
            Ok(api) => Ok(api.into_pull_request(locator.full_name())),
            Err(error) => Err(map_octocrab_error_with_rate_limit(
                &self.client,
                "pull request",
                &error,
            )
            .await),
        }
    }

    async fn list_open_pull_requests(
        &self,
        locator: &RepositoryLocator,
    ) -> Result<Vec<PullRequest>, GithubError> {
        let query_params = [("state", "open"), ("per_page", "100")];

        let page: Page<ApiPullRequest> = match self
            .client
            .get(locator.pulls_path(), Some(&query_params))
            .await
        {
            Ok(page) => page,
            Err(error) => {
                return Err(map_octocrab_error_with_rate_limit(
                    &self.client,
                    "list open pulls",
                    &error,
                )
                .await);
            }
        };

        let full_name = locator.full_name();
        match self.client.all_pages(page).await {
            Ok(items) => Ok(items
                .into_iter()
                .map(|api| api.into_pull_request(full_name.clone()))
                .collect()),
            Err(error) => Err(map_octocrab_error_with_rate_limit(
                &self.client,
                "list open pulls",
                &error,
            )
            .await),
        }
    }
}
