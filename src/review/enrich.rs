//! Enriched pull request views: threads, classifications, and signals.
//!
//! The enricher joins the flat review data into render-ready shapes. Only
//! the primary pull request fetch can fail; reviews, check runs, and
//! threshold lookups degrade to empty or default values with a warning so
//! the base pull request always renders.

use chrono::{DateTime, Utc};

use crate::github::error::GithubError;
use crate::github::gateway::{CheckRunGateway, PullRequestGateway, ReviewGateway};
use crate::github::locator::{PullRequestLocator, RepositoryLocator};
use crate::github::models::{
    CheckRun, IssueComment, PullRequest, Review, ReviewComment, ReviewSummary,
};

use super::attention::{AttentionInputs, AttentionSignals, evaluate};
use super::classify::{ClassificationContext, CommentClassification};
use super::threads::build_threads;
use super::thresholds::{ThresholdResolver, ThresholdStore, load_settings};

/// A submitted review with its classification verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedReview {
    /// The review as fetched.
    pub review: Review,
    /// Classification verdict for the review.
    pub classification: CommentClassification,
}

/// A diff-anchored review comment with its classification verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedComment {
    /// The comment as fetched.
    pub comment: ReviewComment,
    /// Classification verdict for the comment.
    pub classification: CommentClassification,
}

/// A general discussion comment with its classification verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedIssueComment {
    /// The comment as fetched.
    pub comment: IssueComment,
    /// Classification verdict for the comment.
    pub classification: CommentClassification,
}

/// One reconstructed thread with classified comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadView {
    /// Whether the thread is resolved, taken from its root.
    pub resolved: bool,
    /// The classified root comment.
    pub root: ClassifiedComment,
    /// Classified replies in input order.
    pub replies: Vec<ClassifiedComment>,
}

/// Full detail view for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDetail {
    /// The pull request as fetched.
    pub pull_request: PullRequest,
    /// Reconstructed review threads.
    pub threads: Vec<ThreadView>,
    /// Number of resolved threads.
    pub resolved_count: usize,
    /// Number of unresolved threads.
    pub unresolved_count: usize,
    /// Classified submitted reviews.
    pub reviews: Vec<ClassifiedReview>,
    /// Classified general discussion comments.
    pub issue_comments: Vec<ClassifiedIssueComment>,
    /// Check runs for the head commit.
    pub check_runs: Vec<CheckRun>,
    /// Attention signals for the pull request.
    pub signals: AttentionSignals,
}

/// Card-level summary for the worklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestCard {
    /// The pull request as fetched.
    pub pull_request: PullRequest,
    /// Attention signals for the pull request.
    pub signals: AttentionSignals,
    /// Number of unresolved review threads.
    pub unresolved_count: usize,
}

/// Assembles detail and worklist views from the read gateways.
pub struct PullRequestEnricher<'a> {
    pull_requests: &'a dyn PullRequestGateway,
    reviews: &'a dyn ReviewGateway,
    checks: &'a dyn CheckRunGateway,
    store: &'a dyn ThresholdStore,
    nitpick_markers: Vec<String>,
}

impl<'a> PullRequestEnricher<'a> {
    /// Creates an enricher over the given gateways and settings store.
    #[must_use]
    pub fn new(
        pull_requests: &'a dyn PullRequestGateway,
        reviews: &'a dyn ReviewGateway,
        checks: &'a dyn CheckRunGateway,
        store: &'a dyn ThresholdStore,
        nitpick_markers: Vec<String>,
    ) -> Self {
        Self {
            pull_requests,
            reviews,
            checks,
            store,
            nitpick_markers,
        }
    }

    /// Builds the full detail view for one pull request.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] only when the pull request itself cannot be
    /// fetched; a missing pull request surfaces as
    /// [`GithubError::NotFound`]. Enrichment fetch failures degrade with a
    /// warning instead.
    pub async fn detail(
        &self,
        locator: &PullRequestLocator,
        now: DateTime<Utc>,
    ) -> Result<PullRequestDetail, GithubError> {
        let pull_request = self.pull_requests.pull_request(locator).await?;
        let mut resolver = ThresholdResolver::new(self.store, load_settings(self.store));
        let (summary, check_runs, signals) = self
            .fetch_signals(locator, &pull_request, now, &mut resolver)
            .await;

        let context = ClassificationContext::new(&pull_request, &summary, &self.nitpick_markers);
        let reviews: Vec<ClassifiedReview> = summary
            .reviews
            .iter()
            .map(|review| ClassifiedReview {
                classification: context.classify_review(review),
                review: review.clone(),
            })
            .collect();
        let issue_comments: Vec<ClassifiedIssueComment> = summary
            .issue_comments
            .iter()
            .map(|comment| ClassifiedIssueComment {
                classification: context.classify_issue_comment(comment),
                comment: comment.clone(),
            })
            .collect();

        let thread_set = build_threads(summary.review_comments.clone());
        let threads: Vec<ThreadView> = thread_set
            .threads
            .into_iter()
            .map(|thread| ThreadView {
                resolved: thread.resolved(),
                root: ClassifiedComment {
                    classification: context.classify_review_comment(&thread.root),
                    comment: thread.root,
                },
                replies: thread
                    .replies
                    .into_iter()
                    .map(|reply| ClassifiedComment {
                        classification: context.classify_review_comment(&reply),
                        comment: reply,
                    })
                    .collect(),
            })
            .collect();

        Ok(PullRequestDetail {
            pull_request,
            threads,
            resolved_count: thread_set.resolved_count,
            unresolved_count: thread_set.unresolved_count,
            reviews,
            issue_comments,
            check_runs,
            signals,
        })
    }

    /// Builds the prioritised worklist for a repository's open pull
    /// requests.
    ///
    /// Cards are ordered by active signal count, then days inactive, then
    /// pull request number. Per-repository thresholds resolve through one
    /// shared resolver so the settings store is consulted once per
    /// repository across the whole pass.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] when the open pull request listing fails.
    pub async fn worklist(
        &self,
        repository: &RepositoryLocator,
        now: DateTime<Utc>,
    ) -> Result<Vec<PullRequestCard>, GithubError> {
        let open = self.pull_requests.list_open_pull_requests(repository).await?;
        let mut resolver = ThresholdResolver::new(self.store, load_settings(self.store));

        let mut cards = Vec::with_capacity(open.len());
        for pull_request in open {
            let locator = match repository.pull_request(pull_request.number) {
                Ok(locator) => locator,
                Err(error) => {
                    tracing::warn!(
                        repository = %repository.full_name(),
                        number = pull_request.number,
                        error = %error,
                        "skipping pull request with unusable number"
                    );
                    continue;
                }
            };
            let (summary, _check_runs, signals) = self
                .fetch_signals(&locator, &pull_request, now, &mut resolver)
                .await;
            let unresolved_count = build_threads(summary.review_comments).unresolved_count;
            cards.push(PullRequestCard {
                pull_request,
                signals,
                unresolved_count,
            });
        }

        cards.sort_by(|a, b| {
            b.signals
                .active_count()
                .cmp(&a.signals.active_count())
                .then_with(|| b.signals.days_inactive.cmp(&a.signals.days_inactive))
                .then_with(|| a.pull_request.number.cmp(&b.pull_request.number))
        });
        Ok(cards)
    }

    async fn fetch_signals(
        &self,
        locator: &PullRequestLocator,
        pull_request: &PullRequest,
        now: DateTime<Utc>,
        resolver: &mut ThresholdResolver<'_>,
    ) -> (ReviewSummary, Vec<CheckRun>, AttentionSignals) {
        let summary = match self.reviews.review_summary(locator).await {
            Ok(summary) => summary,
            Err(error) => {
                tracing::warn!(
                    repository = %pull_request.repository,
                    number = pull_request.number,
                    error = %error,
                    "review fetch failed; rendering without review data"
                );
                ReviewSummary::default()
            }
        };
        let check_runs = match self
            .checks
            .check_runs(locator, &pull_request.head_sha)
            .await
        {
            Ok(runs) => runs,
            Err(error) => {
                tracing::warn!(
                    repository = %pull_request.repository,
                    number = pull_request.number,
                    error = %error,
                    "check run fetch failed; rendering without CI data"
                );
                Vec::new()
            }
        };

        let thresholds = resolver.resolve(&pull_request.repository);
        let signals = evaluate(
            &AttentionInputs {
                reviews: &summary.reviews,
                check_runs: &check_runs,
                last_activity_at: pull_request.last_activity_at,
                now,
            },
            thresholds,
            resolver.settings(),
        );
        (summary, check_runs, signals)
    }
}
