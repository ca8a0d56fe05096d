//! Gateways for reading and mutating pull requests through Octocrab.
//!
//! This module provides trait-based gateways for communicating with the GitHub
//! API. The trait-based design enables mocking in tests while the Octocrab
//! implementations handle real HTTP requests.

mod checks;
mod client;
mod error_mapping;
mod pull_request;
mod reviews;
mod writes;

pub use checks::OctocrabCheckRunGateway;
pub use pull_request::OctocrabPullRequestGateway;
pub use reviews::OctocrabReviewGateway;
pub use writes::OctocrabMutationGateway;

use async_trait::async_trait;

use crate::github::error::GithubError;
use crate::github::locator::{PullRequestLocator, RepositoryLocator};
use crate::github::models::{CheckRun, PullRequest, ReviewSubmission, ReviewSummary};

/// Gateway that can load pull request data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch a single pull request.
    ///
    /// A missing pull request surfaces as [`GithubError::NotFound`], distinct
    /// from other upstream failures.
    async fn pull_request(&self, locator: &PullRequestLocator) -> Result<PullRequest, GithubError>;

    /// List open pull requests for the repository.
    async fn list_open_pull_requests(
        &self,
        locator: &RepositoryLocator,
    ) -> Result<Vec<PullRequest>, GithubError>;
}

/// Gateway that can load the flat review data for a pull request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewGateway: Send + Sync {
    /// Fetch reviews, review comments, and issue comments for the pull
    /// request, together with the set of bot usernames seen among authors.
    async fn review_summary(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<ReviewSummary, GithubError>;
}

/// Gateway that can load CI check runs for a pull request head commit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckRunGateway: Send + Sync {
    /// Fetch check runs for the given head commit of the pull request.
    async fn check_runs(
        &self,
        locator: &PullRequestLocator,
        head_sha: &str,
    ) -> Result<Vec<CheckRun>, GithubError>;
}

/// Gateway that executes write actions against GitHub.
///
/// Every method returns upstream error messages verbatim inside the error
/// variant so callers can surface them without reinterpretation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MutationGateway: Send + Sync {
    /// Submit a review with the given verdict and optional body.
    async fn submit_review(
        &self,
        locator: &PullRequestLocator,
        submission: &ReviewSubmission,
    ) -> Result<(), GithubError>;

    /// Add a general discussion comment to the pull request.
    async fn create_issue_comment(
        &self,
        locator: &PullRequestLocator,
        body: &str,
    ) -> Result<(), GithubError>;

    /// Reply to an existing review comment thread.
    async fn create_reply_comment(
        &self,
        locator: &PullRequestLocator,
        root_id: u64,
        body: &str,
    ) -> Result<(), GithubError>;

    /// Convert the pull request to a draft, addressed by GraphQL node id.
    async fn convert_to_draft(
        &self,
        locator: &PullRequestLocator,
        node_id: &str,
    ) -> Result<(), GithubError>;

    /// Mark the draft pull request as ready for review.
    async fn mark_ready_for_review(
        &self,
        locator: &PullRequestLocator,
        node_id: &str,
    ) -> Result<(), GithubError>;
}
