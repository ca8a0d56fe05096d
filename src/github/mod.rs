//! GitHub access layer: locators, domain models, and Octocrab gateways.
//!
//! This module wraps Octocrab to parse pull request URLs, validate personal
//! access tokens, and retrieve review data alongside check runs. Errors are
//! mapped into user-friendly variants so that callers can surface precise
//! failures without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod rate_limit;

pub use error::GithubError;
pub use gateway::{
    CheckRunGateway, MutationGateway, OctocrabCheckRunGateway, OctocrabMutationGateway,
    OctocrabPullRequestGateway, OctocrabReviewGateway, PullRequestGateway, ReviewGateway,
};
pub use locator::{
    PersonalAccessToken, PullRequestLocator, PullRequestNumber, RepositoryLocator, RepositoryName,
    RepositoryOwner,
};
pub use models::{
    CheckRun, IssueComment, PullRequest, PullRequestState, Review, ReviewComment, ReviewEvent,
    ReviewState, ReviewSubmission, ReviewSummary,
};
pub use rate_limit::RateLimitInfo;
