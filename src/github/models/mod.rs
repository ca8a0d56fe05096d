//! Data models representing pull requests, reviews, comments, and check runs.
//!
//! This module contains domain models for review data returned by the GitHub
//! API. Types prefixed with `Api` are internal deserialisation targets that
//! convert into public domain types.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[cfg(feature = "test-support")]
pub mod test_support;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PullRequestState {
    /// The pull request is open.
    #[default]
    Open,
    /// The pull request was closed without merging.
    Closed,
    /// The pull request was merged.
    Merged,
}

impl PullRequestState {
    /// Derives the lifecycle state from the raw API state string and merge flag.
    ///
    /// GitHub reports merged pull requests with `state = "closed"` plus a
    /// separate merged indicator, so the merge flag takes precedence.
    #[must_use]
    pub fn from_api(state: Option<&str>, merged: bool) -> Self {
        if merged {
            return Self::Merged;
        }
        match state {
            Some(value) if value.eq_ignore_ascii_case("closed") => Self::Closed,
            _ => Self::Open,
        }
    }

    /// Lowercase state name, used for display and local persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

/// Pull request details used by the review engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequest {
    /// Repository full name in `owner/repo` form.
    pub repository: String,
    /// Pull request number.
    pub number: u64,
    /// Stable numeric identifier assigned by GitHub.
    pub id: u64,
    /// GraphQL node id, required for draft mutations.
    pub node_id: Option<String>,
    /// Title of the pull request.
    pub title: Option<String>,
    /// Lifecycle state.
    pub state: PullRequestState,
    /// Whether the pull request is currently a draft.
    pub draft: bool,
    /// Mergeable status reported by GitHub (e.g. `clean`, `dirty`).
    pub mergeable_state: Option<String>,
    /// Author login if present.
    pub author: Option<String>,
    /// Head branch name.
    pub head_ref: Option<String>,
    /// Base branch name.
    pub base_ref: Option<String>,
    /// Head commit SHA, used for outdated-comment detection.
    pub head_sha: String,
    /// When the pull request was opened.
    pub opened_at: Option<DateTime<Utc>>,
    /// Timestamp of the most recent activity.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Number of files changed.
    pub changed_files: u64,
    /// Label names attached to the pull request.
    pub labels: Vec<String>,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
}

/// State of a submitted review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewState {
    /// The reviewer approved the changes.
    Approved,
    /// The reviewer requested changes.
    ChangesRequested,
    /// The reviewer commented without an explicit verdict.
    #[default]
    Commented,
    /// The review has not been submitted yet.
    Pending,
    /// A previous verdict was dismissed.
    Dismissed,
}

impl ReviewState {
    /// Parses the API review state string.
    ///
    /// Unknown values fall back to [`ReviewState::Commented`] so new upstream
    /// states never break aggregation.
    #[must_use]
    pub fn from_api(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            "PENDING" => Self::Pending,
            "DISMISSED" => Self::Dismissed,
            _ => Self::Commented,
        }
    }

    /// Returns true when this review counts towards the approval total.
    #[must_use]
    pub const fn is_approval(self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Lowercase display label for the verdict.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::ChangesRequested => "changes-requested",
            Self::Commented => "commented",
            Self::Pending => "pending",
            Self::Dismissed => "dismissed",
        }
    }
}

/// A submitted pull request review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Review {
    /// Review identifier.
    pub id: u64,
    /// Reviewer login.
    pub reviewer: Option<String>,
    /// Review verdict.
    pub state: ReviewState,
    /// Review body text.
    pub body: Option<String>,
    /// Commit SHA the review was submitted against.
    pub commit_sha: Option<String>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Whether GitHub reports the reviewer as a bot account.
    pub bot: bool,
}

/// Pull request review comment (attached to a diff position).
///
/// Review comments form at most two levels: roots carry no parent reference
/// and replies reference a root via `in_reply_to_id`. Replies to replies do
/// not occur in the upstream data model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewComment {
    /// Comment identifier.
    pub id: u64,
    /// Identifier of the root comment this replies to, if any.
    pub in_reply_to_id: Option<u64>,
    /// Author login.
    pub author: Option<String>,
    /// Comment body.
    pub body: Option<String>,
    /// File path the comment is attached to.
    pub file_path: Option<String>,
    /// Line number in the diff the comment refers to.
    pub line: Option<u32>,
    /// First line of a multi-line comment range.
    pub start_line: Option<u32>,
    /// Diff hunk context for this comment.
    pub diff_hunk: Option<String>,
    /// Commit SHA this comment was made against.
    pub commit_sha: Option<String>,
    /// Whether the containing thread is resolved.
    pub resolved: bool,
    /// Whether GitHub reports the author as a bot account.
    pub bot: bool,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

/// General discussion comment on the pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueComment {
    /// Comment identifier.
    pub id: u64,
    /// Author login.
    pub author: Option<String>,
    /// Comment body.
    pub body: Option<String>,
    /// Whether GitHub reports the author as a bot account.
    pub bot: bool,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

/// A CI/CD check run attached to the head commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckRun {
    /// Check run identifier.
    pub id: u64,
    /// Check name as reported by the CI provider.
    pub name: String,
    /// Current status (e.g. `queued`, `in_progress`, `completed`).
    pub status: Option<String>,
    /// Final conclusion once completed (e.g. `success`, `failure`).
    pub conclusion: Option<String>,
    /// Whether the check is required by branch protection.
    ///
    /// The check-runs listing does not carry this flag, so it defaults to
    /// false unless a caller enriches it from branch protection data.
    pub required: bool,
    /// URL with details about the run.
    pub details_url: Option<String>,
}

impl CheckRun {
    /// Returns true when the run completed with a failing conclusion.
    #[must_use]
    pub fn failed(&self) -> bool {
        let completed = self
            .status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("completed"));
        let failing_conclusion = self.conclusion.as_deref().is_some_and(|conclusion| {
            matches!(
                conclusion.to_ascii_lowercase().as_str(),
                "failure" | "timed_out" | "action_required" | "startup_failure"
            )
        });
        completed && failing_conclusion
    }
}

/// Flat review data for one pull request, as returned by the review read port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Submitted reviews in fetch order.
    pub reviews: Vec<Review>,
    /// Review comments in fetch order (assumed chronological).
    pub review_comments: Vec<ReviewComment>,
    /// Issue comments in fetch order.
    pub issue_comments: Vec<IssueComment>,
    /// Logins GitHub reports as bot accounts among the authors above.
    pub bot_usernames: HashSet<String>,
}

/// Verdict attached to a submitted review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    /// Approve the pull request.
    Approve,
    /// Request changes.
    RequestChanges,
    /// Comment without a verdict.
    Comment,
}

impl ReviewEvent {
    /// Returns the event string expected by the review submission endpoint.
    #[must_use]
    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::RequestChanges => "REQUEST_CHANGES",
            Self::Comment => "COMMENT",
        }
    }
}

/// A validated review submission payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    /// Review verdict.
    pub event: ReviewEvent,
    /// Optional review body.
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
    #[serde(rename = "type")]
    pub(super) kind: Option<String>,
}

impl ApiUser {
    pub(super) fn is_bot(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("bot"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiBranchRef {
    #[serde(rename = "ref")]
    pub(super) branch: Option<String>,
    pub(super) sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiLabel {
    pub(super) name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    pub(super) id: u64,
    pub(super) node_id: Option<String>,
    pub(super) title: Option<String>,
    pub(super) state: Option<String>,
    pub(super) merged: Option<bool>,
    pub(super) merged_at: Option<DateTime<Utc>>,
    pub(super) draft: Option<bool>,
    pub(super) mergeable_state: Option<String>,
    pub(super) user: Option<ApiUser>,
    pub(super) head: Option<ApiBranchRef>,
    pub(super) base: Option<ApiBranchRef>,
    pub(super) created_at: Option<DateTime<Utc>>,
    pub(super) updated_at: Option<DateTime<Utc>>,
    pub(super) additions: Option<u64>,
    pub(super) deletions: Option<u64>,
    pub(super) changed_files: Option<u64>,
    pub(super) labels: Option<Vec<ApiLabel>>,
    pub(super) html_url: Option<String>,
}

impl ApiPullRequest {
    /// Converts the API payload into the domain type.
    ///
    /// The repository full name is supplied by the caller because list
    /// responses omit it in a directly usable form.
    pub(super) fn into_pull_request(self, repository: String) -> PullRequest {
        let merged = self.merged.unwrap_or(false) || self.merged_at.is_some();
        let state = PullRequestState::from_api(self.state.as_deref(), merged);
        let (head_ref, head_sha) = self
            .head
            .map(|head| (head.branch, head.sha.unwrap_or_default()))
            .unwrap_or((None, String::new()));

        PullRequest {
            repository,
            number: self.number,
            id: self.id,
            node_id: self.node_id,
            title: self.title,
            state,
            draft: self.draft.unwrap_or(false),
            mergeable_state: self.mergeable_state,
            author: self.user.and_then(|user| user.login),
            head_ref,
            base_ref: self.base.and_then(|base| base.branch),
            head_sha,
            opened_at: self.created_at,
            last_activity_at: self.updated_at,
            additions: self.additions.unwrap_or(0),
            deletions: self.deletions.unwrap_or(0),
            changed_files: self.changed_files.unwrap_or(0),
            labels: self
                .labels
                .unwrap_or_default()
                .into_iter()
                .filter_map(|label| label.name)
                .collect(),
            html_url: self.html_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiReview {
    pub(super) id: u64,
    pub(super) user: Option<ApiUser>,
    pub(super) state: Option<String>,
    pub(super) body: Option<String>,
    pub(super) commit_id: Option<String>,
    pub(super) submitted_at: Option<DateTime<Utc>>,
}

impl From<ApiReview> for Review {
    fn from(value: ApiReview) -> Self {
        let bot = value.user.as_ref().is_some_and(ApiUser::is_bot);
        Self {
            id: value.id,
            reviewer: value.user.and_then(|user| user.login),
            state: value
                .state
                .as_deref()
                .map(ReviewState::from_api)
                .unwrap_or_default(),
            body: value.body,
            commit_sha: value.commit_id,
            submitted_at: value.submitted_at,
            bot,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiReviewComment {
    pub(super) id: u64,
    pub(super) body: Option<String>,
    pub(super) user: Option<ApiUser>,
    pub(super) path: Option<String>,
    pub(super) line: Option<u32>,
    pub(super) start_line: Option<u32>,
    pub(super) diff_hunk: Option<String>,
    pub(super) commit_id: Option<String>,
    pub(super) in_reply_to_id: Option<u64>,
    pub(super) created_at: Option<DateTime<Utc>>,
}

impl From<ApiReviewComment> for ReviewComment {
    fn from(value: ApiReviewComment) -> Self {
        let bot = value.user.as_ref().is_some_and(ApiUser::is_bot);
        Self {
            id: value.id,
            in_reply_to_id: value.in_reply_to_id,
            author: value.user.and_then(|user| user.login),
            body: value.body,
            file_path: value.path,
            line: value.line,
            start_line: value.start_line,
            diff_hunk: value.diff_hunk,
            commit_sha: value.commit_id,
            // Resolution state lives on the review thread, not the comment;
            // the gateway overlays it after fetching thread state.
            resolved: false,
            bot,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiIssueComment {
    pub(super) id: u64,
    pub(super) body: Option<String>,
    pub(super) user: Option<ApiUser>,
    pub(super) created_at: Option<DateTime<Utc>>,
}

impl From<ApiIssueComment> for IssueComment {
    fn from(value: ApiIssueComment) -> Self {
        let bot = value.user.as_ref().is_some_and(ApiUser::is_bot);
        Self {
            id: value.id,
            author: value.user.and_then(|user| user.login),
            body: value.body,
            bot,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCheckRun {
    pub(super) id: u64,
    pub(super) name: Option<String>,
    pub(super) status: Option<String>,
    pub(super) conclusion: Option<String>,
    pub(super) details_url: Option<String>,
}

impl From<ApiCheckRun> for CheckRun {
    fn from(value: ApiCheckRun) -> Self {
        Self {
            id: value.id,
            name: value.name.unwrap_or_default(),
            status: value.status,
            conclusion: value.conclusion,
            required: false,
            details_url: value.details_url,
        }
    }
}

/// Wrapper object returned by the check-runs listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCheckRunList {
    pub(super) check_runs: Vec<ApiCheckRun>,
}
