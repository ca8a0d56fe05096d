//! Review aggregation: threads, classification, signals, and write actions.
//!
//! This module turns the flat listings fetched by the GitHub gateways into
//! render-ready shapes. Threads are reconstructed from flat comments,
//! comments are classified for bot authorship and staleness, attention
//! signals are evaluated against layered thresholds, and the write path
//! runs every mutation through one precondition pipeline.

pub mod attention;
pub mod classify;
pub mod enrich;
pub mod mutate;
pub mod reconcile;
pub mod threads;
pub mod thresholds;

pub use attention::{AttentionInputs, AttentionSignals, evaluate};
pub use classify::{ClassificationContext, CommentClassification};
pub use enrich::{
    ClassifiedComment, ClassifiedIssueComment, ClassifiedReview, PullRequestCard,
    PullRequestDetail, PullRequestEnricher, ThreadView,
};
pub use mutate::{
    MutationCoordinator, MutationError, MutationOutcome, PullRequestMutation, WriteCredentialStore,
    WriteIdentity,
};
pub use reconcile::{
    NoopReconciliationScheduler, ReconciliationScheduler, TokioReconciliationScheduler,
};
pub use threads::{CommentThread, ThreadSet, build_threads};
pub use thresholds::{
    DEFAULT_REQUIRED_REVIEW_COUNT, DEFAULT_URGENCY_DAYS, EffectiveThresholds, GlobalSettings,
    RepoThreshold, ThresholdResolver, ThresholdStore, UnconfiguredThresholdStore, load_settings,
};
