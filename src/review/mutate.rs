//! Write-path coordination for pull request mutations.
//!
//! Every mutation runs the same precondition pipeline: a configured write
//! credential, payload validation before any upstream call, then a fresh
//! pull request fetch. Draft toggles additionally require the acting user
//! to be the pull request author, checked against the fetched state rather
//! than anything cached. Upstream failures surface their messages verbatim
//! with no retry and no partial application.

use thiserror::Error;

use crate::github::error::GithubError;
use crate::github::gateway::{MutationGateway, PullRequestGateway, ReviewGateway};
use crate::github::locator::PullRequestLocator;
use crate::github::models::{PullRequest, ReviewSubmission, ReviewSummary};

use super::reconcile::ReconciliationScheduler;

/// One write action against a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestMutation {
    /// Submit a review verdict with an optional body.
    SubmitReview(ReviewSubmission),
    /// Add a general discussion comment.
    AddIssueComment {
        /// Comment body before trimming.
        body: String,
    },
    /// Reply to an existing review comment thread.
    ReplyToThread {
        /// Identifier of the thread's root comment.
        root_id: u64,
        /// Reply body before trimming.
        body: String,
    },
    /// Flip the draft state of the pull request.
    ToggleDraft,
}

/// Errors surfaced by the write-mutation pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    /// No write credential is configured.
    #[error("write actions need a configured token and username")]
    NotConfigured,

    /// The acting user may not perform this mutation.
    #[error("{message}")]
    Forbidden {
        /// Explanation of the refused action.
        message: String,
    },

    /// The payload failed validation before any upstream call.
    #[error("{message}")]
    Validation {
        /// Explanation of the rejected payload.
        message: String,
    },

    /// The pull request does not exist upstream.
    #[error("{message}")]
    NotFound {
        /// Upstream not-found detail.
        message: String,
    },

    /// The upstream call failed; the message is reported verbatim.
    #[error("{message}")]
    Upstream {
        /// Verbatim upstream error message.
        message: String,
    },
}

/// Identity acting on the write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteIdentity {
    /// Login the configured token belongs to.
    pub username: String,
}

/// Port exposing the configured write credential, if any.
///
/// An identity is present only when both a token and a username are
/// configured; either one alone leaves the write path unconfigured.
#[cfg_attr(test, mockall::automock)]
pub trait WriteCredentialStore: Send + Sync {
    /// Returns the acting identity when the write path is configured.
    fn write_identity(&self) -> Option<WriteIdentity>;
}

/// Result of a successfully applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Pull request after the mutation, possibly optimistically adjusted.
    pub pull_request: PullRequest,
    /// Fresh review state for content mutations, when the re-fetch
    /// succeeded.
    pub refreshed_summary: Option<ReviewSummary>,
    /// Whether the pull request state is a provisional local guess awaiting
    /// reconciliation.
    pub optimistic: bool,
}

/// Runs the shared precondition pipeline and executes write actions.
pub struct MutationCoordinator<'a> {
    pull_requests: &'a dyn PullRequestGateway,
    reviews: &'a dyn ReviewGateway,
    mutations: &'a dyn MutationGateway,
    credentials: &'a dyn WriteCredentialStore,
    scheduler: &'a dyn ReconciliationScheduler,
}

impl<'a> MutationCoordinator<'a> {
    /// Creates a coordinator over the given ports.
    #[must_use]
    pub fn new(
        pull_requests: &'a dyn PullRequestGateway,
        reviews: &'a dyn ReviewGateway,
        mutations: &'a dyn MutationGateway,
        credentials: &'a dyn WriteCredentialStore,
        scheduler: &'a dyn ReconciliationScheduler,
    ) -> Self {
        Self {
            pull_requests,
            reviews,
            mutations,
            credentials,
            scheduler,
        }
    }

    /// Applies one mutation to the pull request.
    ///
    /// Draft toggles return an optimistic outcome and hand the authoritative
    /// re-fetch to the reconciliation scheduler. Content mutations re-fetch
    /// the review summary synchronously; a failed re-fetch degrades to
    /// `None` with a warning rather than failing the mutation.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError`] when the write path is unconfigured, the
    /// payload is invalid, the acting user lacks permission, the pull
    /// request is missing, or the upstream call fails.
    pub async fn apply(
        &self,
        locator: &PullRequestLocator,
        mutation: PullRequestMutation,
    ) -> Result<MutationOutcome, MutationError> {
        let Some(identity) = self.credentials.write_identity() else {
            return Err(MutationError::NotConfigured);
        };
        let validated = validate(mutation)?;

        let mut pull_request = match self.pull_requests.pull_request(locator).await {
            Ok(found) => found,
            Err(GithubError::NotFound { message }) => {
                return Err(MutationError::NotFound { message });
            }
            Err(error) => {
                return Err(MutationError::Upstream {
                    message: error.to_string(),
                });
            }
        };

        if matches!(validated, PullRequestMutation::ToggleDraft) {
            self.toggle_draft(locator, &identity, &mut pull_request)
                .await?;
            return Ok(MutationOutcome {
                pull_request,
                refreshed_summary: None,
                optimistic: true,
            });
        }

        self.execute_content(locator, &validated).await?;
        let refreshed_summary = match self.reviews.review_summary(locator).await {
            Ok(summary) => Some(summary),
            Err(error) => {
                tracing::warn!(
                    repository = %pull_request.repository,
                    number = pull_request.number,
                    error = %error,
                    "review re-fetch after mutation failed"
                );
                None
            }
        };

        Ok(MutationOutcome {
            pull_request,
            refreshed_summary,
            optimistic: false,
        })
    }

    async fn toggle_draft(
        &self,
        locator: &PullRequestLocator,
        identity: &WriteIdentity,
        pull_request: &mut PullRequest,
    ) -> Result<(), MutationError> {
        if pull_request.author.as_deref() != Some(identity.username.as_str()) {
            return Err(MutationError::Forbidden {
                message: "only the pull request author can toggle draft state".to_owned(),
            });
        }
        let Some(node_id) = pull_request.node_id.as_deref() else {
            return Err(MutationError::Upstream {
                message: "pull request carries no node id for draft mutations".to_owned(),
            });
        };

        let result = if pull_request.draft {
            self.mutations.mark_ready_for_review(locator, node_id).await
        } else {
            self.mutations.convert_to_draft(locator, node_id).await
        };
        result.map_err(|error| MutationError::Upstream {
            message: error.to_string(),
        })?;

        pull_request.draft = !pull_request.draft;
        self.scheduler.schedule(locator.clone());
        Ok(())
    }

    async fn execute_content(
        &self,
        locator: &PullRequestLocator,
        mutation: &PullRequestMutation,
    ) -> Result<(), MutationError> {
        let result = match mutation {
            PullRequestMutation::SubmitReview(submission) => {
                self.mutations.submit_review(locator, submission).await
            }
            PullRequestMutation::AddIssueComment { body } => {
                self.mutations.create_issue_comment(locator, body).await
            }
            PullRequestMutation::ReplyToThread { root_id, body } => {
                self.mutations
                    .create_reply_comment(locator, *root_id, body)
                    .await
            }
            PullRequestMutation::ToggleDraft => Ok(()),
        };
        result.map_err(|error| MutationError::Upstream {
            message: error.to_string(),
        })
    }
}

fn validate(mutation: PullRequestMutation) -> Result<PullRequestMutation, MutationError> {
    match mutation {
        PullRequestMutation::AddIssueComment { body } => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                return Err(MutationError::Validation {
                    message: "comment body must not be empty".to_owned(),
                });
            }
            Ok(PullRequestMutation::AddIssueComment {
                body: trimmed.to_owned(),
            })
        }
        PullRequestMutation::ReplyToThread { root_id, body } => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                return Err(MutationError::Validation {
                    message: "reply body must not be empty".to_owned(),
                });
            }
            Ok(PullRequestMutation::ReplyToThread {
                root_id,
                body: trimmed.to_owned(),
            })
        }
        other => Ok(other),
    }
}
