//! Review thread reconstruction from flat comment listings.
//!
//! The upstream listing returns review comments flat and chronologically
//! ordered. Threads are at most two levels: roots carry no parent id and
//! replies reference their root directly, so reconstruction is a single
//! partition pass followed by reply attachment.

use std::collections::HashMap;

use crate::github::models::ReviewComment;

/// A root review comment with its ordered replies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
    /// The thread's root comment.
    pub root: ReviewComment,
    /// Replies in input order.
    pub replies: Vec<ReviewComment>,
}

impl CommentThread {
    /// Thread resolution comes from the root comment alone.
    #[must_use]
    pub const fn resolved(&self) -> bool {
        self.root.resolved
    }
}

/// Threads for one pull request plus resolution tallies.
///
/// `resolved_count + unresolved_count` always equals `threads.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadSet {
    /// Threads in root input order.
    pub threads: Vec<CommentThread>,
    /// Number of resolved threads.
    pub resolved_count: usize,
    /// Number of unresolved threads.
    pub unresolved_count: usize,
}

/// Partitions flat review comments into ordered threads.
///
/// Roots keep their input order and replies attach to their root in input
/// order, regardless of where the reply appeared relative to its root.
/// Replies whose parent id matches no root are dropped with a warning.
#[must_use]
pub fn build_threads(comments: Vec<ReviewComment>) -> ThreadSet {
    let mut threads: Vec<CommentThread> = Vec::new();
    let mut index_by_root: HashMap<u64, usize> = HashMap::new();
    let mut pending_replies: Vec<(u64, ReviewComment)> = Vec::new();

    for comment in comments {
        match comment.in_reply_to_id {
            None => {
                index_by_root.insert(comment.id, threads.len());
                threads.push(CommentThread {
                    root: comment,
                    replies: Vec::new(),
                });
            }
            Some(parent_id) => pending_replies.push((parent_id, comment)),
        }
    }

    for (parent_id, reply) in pending_replies {
        let slot = index_by_root
            .get(&parent_id)
            .and_then(|&index| threads.get_mut(index));
        match slot {
            Some(thread) => thread.replies.push(reply),
            None => {
                tracing::warn!(
                    comment_id = reply.id,
                    parent_id,
                    "dropping reply without a matching root comment"
                );
            }
        }
    }

    let resolved_count = threads.iter().filter(|thread| thread.resolved()).count();
    let unresolved_count = threads.len() - resolved_count;

    ThreadSet {
        threads,
        resolved_count,
        unresolved_count,
    }
}
