//! Test helpers for constructing review-domain fixtures.
//!
//! This module provides builder functions for creating domain values in
//! tests, reducing boilerplate and ensuring consistency across test modules.
//!
//! # Examples
//!
//! ```
//! use perch::github::models::test_support::{approved_review, root_comment};
//!
//! let review = approved_review(1, "alice");
//! let comment = root_comment(10, "Looks wrong", "bob");
//! ```

use super::{CheckRun, PullRequest, Review, ReviewComment, ReviewState};

/// Constructs a pull request with the given repository and number.
///
/// The head SHA defaults to `"head000"` and all other fields to their
/// defaults.
///
/// # Examples
///
/// ```
/// use perch::github::models::test_support::pull_request;
///
/// let pr = pull_request("acme/widgets", 7);
/// assert_eq!(pr.repository, "acme/widgets");
/// assert_eq!(pr.number, 7);
/// assert_eq!(pr.head_sha, "head000");
/// ```
#[must_use]
pub fn pull_request(repository: &str, number: u64) -> PullRequest {
    PullRequest {
        repository: repository.to_owned(),
        number,
        id: number,
        head_sha: "head000".to_owned(),
        ..Default::default()
    }
}

/// Constructs a review in the given state.
///
/// # Examples
///
/// ```
/// use perch::github::models::ReviewState;
/// use perch::github::models::test_support::review;
///
/// let r = review(3, "carol", ReviewState::ChangesRequested);
/// assert_eq!(r.id, 3);
/// assert_eq!(r.state, ReviewState::ChangesRequested);
/// ```
#[must_use]
pub fn review(id: u64, reviewer: &str, state: ReviewState) -> Review {
    Review {
        id,
        reviewer: Some(reviewer.to_owned()),
        state,
        ..Default::default()
    }
}

/// Constructs an approving review.
///
/// # Examples
///
/// ```
/// use perch::github::models::ReviewState;
/// use perch::github::models::test_support::approved_review;
///
/// let r = approved_review(1, "alice");
/// assert_eq!(r.state, ReviewState::Approved);
/// ```
#[must_use]
pub fn approved_review(id: u64, reviewer: &str) -> Review {
    review(id, reviewer, ReviewState::Approved)
}

/// Constructs a root review comment (no parent reference).
///
/// # Examples
///
/// ```
/// use perch::github::models::test_support::root_comment;
///
/// let root = root_comment(10, "Needs a null check", "alice");
/// assert_eq!(root.id, 10);
/// assert!(root.in_reply_to_id.is_none());
/// ```
#[must_use]
pub fn root_comment(id: u64, body: &str, author: &str) -> ReviewComment {
    ReviewComment {
        id,
        body: Some(body.to_owned()),
        author: Some(author.to_owned()),
        ..Default::default()
    }
}

/// Constructs a reply comment referencing a root.
///
/// # Examples
///
/// ```
/// use perch::github::models::test_support::reply_comment;
///
/// let reply = reply_comment(11, 10, "Fixed in the next push", "bob");
/// assert_eq!(reply.in_reply_to_id, Some(10));
/// ```
#[must_use]
pub fn reply_comment(id: u64, parent_id: u64, body: &str, author: &str) -> ReviewComment {
    ReviewComment {
        id,
        in_reply_to_id: Some(parent_id),
        body: Some(body.to_owned()),
        author: Some(author.to_owned()),
        ..Default::default()
    }
}

/// Constructs a completed check run with the given conclusion.
///
/// # Examples
///
/// ```
/// use perch::github::models::test_support::completed_check_run;
///
/// let run = completed_check_run(1, "build", "failure");
/// assert!(run.failed());
/// ```
#[must_use]
pub fn completed_check_run(id: u64, name: &str, conclusion: &str) -> CheckRun {
    CheckRun {
        id,
        name: name.to_owned(),
        status: Some("completed".to_owned()),
        conclusion: Some(conclusion.to_owned()),
        required: false,
        details_url: None,
    }
}
