//! Octocrab implementation of the check run gateway.

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::github::error::GithubError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::models::{ApiCheckRunList, CheckRun};

use super::CheckRunGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error_with_rate_limit;

/// Octocrab-backed check run gateway.
pub struct OctocrabCheckRunGateway {
    client: Octocrab,
}

impl OctocrabCheckRunGateway {
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
impl CheckRunGateway for OctocrabCheckRunGateway {
    async fn check_runs(
        &self,
        locator: &PullRequestLocator,
        head_sha: &str,
    ) -> Result<Vec<CheckRun>, GithubError> {
        // The listing wraps runs in an object rather than a bare array, so
        // octocrab's page-based pagination does not apply here.
        let query_params = [("per_page", "100")];

        match self
            .client
            .get::<ApiCheckRunList, _, _>(locator.check_runs_path(head_sha), Some(&query_params))
            .await
        {
            Ok(list) => Ok(list.check_runs.into_iter().map(Into::into).collect()),
            Err(error) => Err(map_octocrab_error_with_rate_limit(
                &self.client,
                "check runs",
                &error,
            )
            .await),
        }
    }
}
