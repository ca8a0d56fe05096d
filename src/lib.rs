//! Perch library crate: pull request review aggregation and attention
//! signals.
//!
//! The library wraps Octocrab to fetch pull requests, reviews, diff-anchored
//! comments, and check runs; reconstructs review threads; classifies
//! comments; evaluates configurable attention signals against layered
//! thresholds; and coordinates write mutations with an optimistic draft
//! toggle backed by detached reconciliation into a local `SQLite` mirror.

pub mod config;
pub mod github;
pub mod persistence;
pub mod review;
pub mod telemetry;

pub use config::{DEFAULT_NITPICK_MARKERS, OperationMode, PerchConfig};
pub use github::{
    CheckRunGateway, GithubError, MutationGateway, OctocrabCheckRunGateway,
    OctocrabMutationGateway, OctocrabPullRequestGateway, OctocrabReviewGateway,
    PersonalAccessToken, PullRequest, PullRequestGateway, PullRequestLocator, PullRequestState,
    RepositoryLocator, ReviewGateway, ReviewSubmission, ReviewSummary,
};
pub use persistence::{PersistenceError, SqlitePullRequestMirror, SqliteSettingsStore};
pub use review::{
    AttentionSignals, MutationCoordinator, MutationError, MutationOutcome, PullRequestCard,
    PullRequestDetail, PullRequestEnricher, PullRequestMutation, UnconfiguredThresholdStore,
    WriteCredentialStore, WriteIdentity,
};
