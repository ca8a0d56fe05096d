//! End-to-end review flow tests over the public library API.
//!
//! These tests drive the enricher and the mutation coordinator through
//! hand-rolled port stubs, covering the aggregation pipeline from flat
//! review data to rendered signals and the optimistic draft toggle.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use perch::github::gateway::{
    CheckRunGateway, MutationGateway, PullRequestGateway, ReviewGateway,
};
use perch::github::models::test_support::{
    approved_review, pull_request, reply_comment, root_comment,
};
use perch::github::models::{CheckRun, PullRequest, ReviewSubmission, ReviewSummary};
use perch::review::UnconfiguredThresholdStore;
use perch::review::reconcile::ReconciliationScheduler;
use perch::{
    GithubError, MutationCoordinator, MutationError, PullRequestEnricher, PullRequestLocator,
    PullRequestMutation, RepositoryLocator, WriteCredentialStore, WriteIdentity,
};

struct FixedPullRequest(PullRequest);

#[async_trait]
impl PullRequestGateway for FixedPullRequest {
    async fn pull_request(
        &self,
        _locator: &PullRequestLocator,
    ) -> Result<PullRequest, GithubError> {
        Ok(self.0.clone())
    }

    async fn list_open_pull_requests(
        &self,
        _locator: &RepositoryLocator,
    ) -> Result<Vec<PullRequest>, GithubError> {
        Ok(vec![self.0.clone()])
    }
}

struct FixedReviews(ReviewSummary);

#[async_trait]
impl ReviewGateway for FixedReviews {
    async fn review_summary(
        &self,
        _locator: &PullRequestLocator,
    ) -> Result<ReviewSummary, GithubError> {
        Ok(self.0.clone())
    }
}

struct NoChecks;

#[async_trait]
impl CheckRunGateway for NoChecks {
    async fn check_runs(
        &self,
        _locator: &PullRequestLocator,
        _head_sha: &str,
    ) -> Result<Vec<CheckRun>, GithubError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingMutations {
    converted_to_draft: AtomicBool,
    marked_ready: AtomicBool,
}

#[async_trait]
impl MutationGateway for RecordingMutations {
    async fn submit_review(
        &self,
        _locator: &PullRequestLocator,
        _submission: &ReviewSubmission,
    ) -> Result<(), GithubError> {
        Ok(())
    }

    async fn create_issue_comment(
        &self,
        _locator: &PullRequestLocator,
        _body: &str,
    ) -> Result<(), GithubError> {
        Ok(())
    }

    async fn create_reply_comment(
        &self,
        _locator: &PullRequestLocator,
        _root_id: u64,
        _body: &str,
    ) -> Result<(), GithubError> {
        Ok(())
    }

    async fn convert_to_draft(
        &self,
        _locator: &PullRequestLocator,
        _node_id: &str,
    ) -> Result<(), GithubError> {
        self.converted_to_draft.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn mark_ready_for_review(
        &self,
        _locator: &PullRequestLocator,
        _node_id: &str,
    ) -> Result<(), GithubError> {
        self.marked_ready.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct FixedIdentity(Option<WriteIdentity>);

impl WriteCredentialStore for FixedIdentity {
    fn write_identity(&self) -> Option<WriteIdentity> {
        self.0.clone()
    }
}

fn acting_as(username: &str) -> FixedIdentity {
    FixedIdentity(Some(WriteIdentity {
        username: username.to_owned(),
    }))
}

#[derive(Default)]
struct RecordingScheduler {
    scheduled: Mutex<Vec<PullRequestLocator>>,
}

impl RecordingScheduler {
    fn scheduled(&self) -> Vec<PullRequestLocator> {
        self.scheduled
            .lock()
            .expect("scheduler mutex should be available")
            .clone()
    }
}

impl ReconciliationScheduler for RecordingScheduler {
    fn schedule(&self, locator: PullRequestLocator) {
        self.scheduled
            .lock()
            .expect("scheduler mutex should be available")
            .push(locator);
    }
}

fn locator() -> PullRequestLocator {
    PullRequestLocator::parse("https://github.com/acme/widgets/pull/42")
        .expect("locator should parse")
}

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-02-01T12:00:00Z")
        .expect("timestamp should parse")
        .with_timezone(&Utc)
}

#[tokio::test]
async fn detail_flags_outdated_approval_but_counts_it() {
    let mut fetched = pull_request("acme/widgets", 42);
    fetched.head_sha = "abcd123".to_owned();
    fetched.last_activity_at = Some(now());

    let mut current_approval = approved_review(1, "alice");
    current_approval.commit_sha = Some("abcd123".to_owned());
    let mut stale_approval = approved_review(2, "bob");
    stale_approval.commit_sha = Some("ffff999".to_owned());

    let summary = ReviewSummary {
        reviews: vec![current_approval, stale_approval],
        review_comments: vec![
            root_comment(10, "Rename this", "alice"),
            reply_comment(11, 10, "Done", "bob"),
            reply_comment(12, 99, "Orphaned reply", "carol"),
        ],
        ..ReviewSummary::default()
    };

    let pull_requests = FixedPullRequest(fetched);
    let reviews = FixedReviews(summary);
    let checks = NoChecks;
    let store = UnconfiguredThresholdStore;
    let enricher = PullRequestEnricher::new(
        &pull_requests,
        &reviews,
        &checks,
        &store,
        vec!["nitpick".to_owned()],
    );

    let detail = enricher
        .detail(&locator(), now())
        .await
        .expect("detail should build");

    assert_eq!(detail.signals.approval_count, 2, "both approvals count");
    assert!(
        !detail.signals.needs_more_reviews,
        "two approvals meet the default threshold of two"
    );
    let first = detail.reviews.first().expect("should have first review");
    assert!(!first.classification.outdated);
    let second = detail.reviews.get(1).expect("should have second review");
    assert!(
        second.classification.outdated,
        "the approval at ffff999 no longer matches head abcd123"
    );

    assert_eq!(detail.threads.len(), 1, "the orphan reply opens no thread");
    let thread = detail.threads.first().expect("should have one thread");
    assert_eq!(thread.replies.len(), 1, "only the real reply attaches");
    assert_eq!(
        detail.resolved_count + detail.unresolved_count,
        detail.threads.len()
    );
}

#[tokio::test]
async fn draft_toggle_renders_optimistically_before_reconciliation() {
    let mut fetched = pull_request("acme/widgets", 42);
    fetched.author = Some("alice".to_owned());
    fetched.node_id = Some("PR_node42".to_owned());
    fetched.draft = true;

    let pull_requests = FixedPullRequest(fetched);
    let reviews = FixedReviews(ReviewSummary::default());
    let mutations = RecordingMutations::default();
    let credentials = acting_as("alice");
    let scheduler = RecordingScheduler::default();
    let coordinator = MutationCoordinator::new(
        &pull_requests,
        &reviews,
        &mutations,
        &credentials,
        &scheduler,
    );

    let outcome = coordinator
        .apply(&locator(), PullRequestMutation::ToggleDraft)
        .await
        .expect("toggle should succeed");

    assert!(
        !outcome.pull_request.draft,
        "the draft flag flips locally before GitHub confirms it"
    );
    assert!(outcome.optimistic, "the outcome is marked provisional");
    assert!(mutations.marked_ready.load(Ordering::SeqCst));
    assert!(!mutations.converted_to_draft.load(Ordering::SeqCst));

    let scheduled = scheduler.scheduled();
    assert_eq!(scheduled.len(), 1, "one reconciliation pass is queued");
    let queued = scheduled.first().expect("should have a queued locator");
    assert_eq!(queued.full_name(), "acme/widgets");
    assert_eq!(queued.number().get(), 42);
}

#[tokio::test]
async fn draft_toggle_is_refused_for_non_authors() {
    let mut fetched = pull_request("acme/widgets", 42);
    fetched.author = Some("alice".to_owned());
    fetched.node_id = Some("PR_node42".to_owned());

    let pull_requests = FixedPullRequest(fetched);
    let reviews = FixedReviews(ReviewSummary::default());
    let mutations = RecordingMutations::default();
    let credentials = acting_as("mallory");
    let scheduler = RecordingScheduler::default();
    let coordinator = MutationCoordinator::new(
        &pull_requests,
        &reviews,
        &mutations,
        &credentials,
        &scheduler,
    );

    let outcome = coordinator
        .apply(&locator(), PullRequestMutation::ToggleDraft)
        .await;

    assert!(matches!(outcome, Err(MutationError::Forbidden { .. })));
    assert!(!mutations.converted_to_draft.load(Ordering::SeqCst));
    assert!(!mutations.marked_ready.load(Ordering::SeqCst));
    assert!(scheduler.scheduled().is_empty());
}

#[tokio::test]
async fn missing_credentials_leave_the_write_path_unconfigured() {
    let pull_requests = FixedPullRequest(pull_request("acme/widgets", 42));
    let reviews = FixedReviews(ReviewSummary::default());
    let mutations = RecordingMutations::default();
    let credentials = FixedIdentity(None);
    let scheduler = RecordingScheduler::default();
    let coordinator = MutationCoordinator::new(
        &pull_requests,
        &reviews,
        &mutations,
        &credentials,
        &scheduler,
    );

    let outcome = coordinator
        .apply(
            &locator(),
            PullRequestMutation::AddIssueComment {
                body: "Any update?".to_owned(),
            },
        )
        .await;

    assert_eq!(outcome, Err(MutationError::NotConfigured));
}
