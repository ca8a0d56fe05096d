//! Comment classification: bot authorship, nitpicks, and outdated anchors.
//!
//! Each item gets three independent booleans. Outdated means the item is
//! anchored to a non-empty commit SHA that differs from the pull request
//! head. Bot authorship combines the upstream account-type flag with a
//! case-sensitive match against the per-PR bot username set. Nitpick only
//! ever applies to bot-authored items whose body contains one of the
//! configured markers, compared case-insensitively.

use crate::github::models::{IssueComment, PullRequest, Review, ReviewComment, ReviewSummary};

/// Classification verdict for one review or comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentClassification {
    /// Anchored to a commit that is no longer the head.
    pub outdated: bool,
    /// Authored by a bot account.
    pub bot_authored: bool,
    /// Bot-authored style remark matching a nitpick marker.
    pub nitpick: bool,
}

/// Per-pull-request inputs the classifier needs.
pub struct ClassificationContext<'a> {
    head_sha: &'a str,
    summary: &'a ReviewSummary,
    nitpick_markers: &'a [String],
}

impl<'a> ClassificationContext<'a> {
    /// Builds a context for one pull request and its review summary.
    #[must_use]
    pub fn new(
        pull_request: &'a PullRequest,
        summary: &'a ReviewSummary,
        nitpick_markers: &'a [String],
    ) -> Self {
        Self {
            head_sha: &pull_request.head_sha,
            summary,
            nitpick_markers,
        }
    }

    /// Classifies a submitted review.
    #[must_use]
    pub fn classify_review(&self, review: &Review) -> CommentClassification {
        self.classify(
            review.reviewer.as_deref(),
            review.bot,
            review.body.as_deref(),
            review.commit_sha.as_deref(),
        )
    }

    /// Classifies a diff-anchored review comment.
    #[must_use]
    pub fn classify_review_comment(&self, comment: &ReviewComment) -> CommentClassification {
        self.classify(
            comment.author.as_deref(),
            comment.bot,
            comment.body.as_deref(),
            comment.commit_sha.as_deref(),
        )
    }

    /// Classifies a general discussion comment, which carries no commit
    /// anchor and can therefore never be outdated.
    #[must_use]
    pub fn classify_issue_comment(&self, comment: &IssueComment) -> CommentClassification {
        self.classify(comment.author.as_deref(), comment.bot, comment.body.as_deref(), None)
    }

    fn classify(
        &self,
        author: Option<&str>,
        bot_flag: bool,
        body: Option<&str>,
        commit_sha: Option<&str>,
    ) -> CommentClassification {
        let outdated =
            commit_sha.is_some_and(|sha| !sha.is_empty() && sha != self.head_sha);
        let bot_authored = bot_flag
            || author.is_some_and(|login| self.summary.bot_usernames.contains(login));
        let nitpick = bot_authored && body.is_some_and(|text| self.matches_marker(text));

        CommentClassification {
            outdated,
            bot_authored,
            nitpick,
        }
    }

    fn matches_marker(&self, body: &str) -> bool {
        if body.is_empty() {
            return false;
        }
        let lowered_body = body.to_lowercase();
        self.nitpick_markers.iter().any(|marker| {
            !marker.is_empty() && lowered_body.contains(&marker.to_lowercase())
        })
    }
}
