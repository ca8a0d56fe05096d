//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use perch::review::{ClassifiedReview, CommentClassification, ThreadView};
use perch::{
    AttentionSignals, GithubError, PullRequestCard, PullRequestDetail, PullRequestState,
};

/// Writes the attention-ordered worklist to the given writer.
///
/// # Errors
///
/// Returns [`GithubError::Io`] when writing fails.
pub fn write_worklist_to<W: Write>(
    writer: &mut W,
    repository: &str,
    cards: &[PullRequestCard],
) -> Result<(), GithubError> {
    writeln!(writer, "Open pull requests for {repository}:").map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;

    if cards.is_empty() {
        writeln!(writer, "  none").map_err(|e| io_error(&e))?;
        return Ok(());
    }

    for card in cards {
        let title = card.pull_request.title.as_deref().unwrap_or("(no title)");
        let author = card.pull_request.author.as_deref().unwrap_or("unknown");
        writeln!(
            writer,
            "  #{} [{}] {title} (@{author})",
            card.pull_request.number,
            signal_labels(&card.signals),
        )
        .map_err(|e| io_error(&e))?;
        writeln!(
            writer,
            "      approvals {}/{}, {} days inactive, {} unresolved threads",
            card.signals.approval_count,
            card.signals.required_review_count,
            card.signals.days_inactive,
            card.unresolved_count,
        )
        .map_err(|e| io_error(&e))?;
    }

    let needing_attention = cards
        .iter()
        .filter(|card| card.signals.active_count() > 0)
        .count();
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "{needing_attention} of {total} pull requests need attention",
        total = cards.len()
    )
    .map_err(|e| io_error(&e))
}

/// Writes the enriched detail view to the given writer.
///
/// # Errors
///
/// Returns [`GithubError::Io`] when writing fails.
pub fn write_detail_to<W: Write>(
    writer: &mut W,
    detail: &PullRequestDetail,
) -> Result<(), GithubError> {
    let pull_request = &detail.pull_request;
    let title = pull_request.title.as_deref().unwrap_or("(no title)");
    let author = pull_request.author.as_deref().unwrap_or("unknown");

    writeln!(
        writer,
        "PR #{} by {author}: {title}",
        pull_request.number
    )
    .map_err(|e| io_error(&e))?;
    if let Some(url) = pull_request.html_url.as_deref() {
        writeln!(writer, "URL: {url}").map_err(|e| io_error(&e))?;
    }
    writeln!(writer, "State: {}", state_label(pull_request.state, pull_request.draft))
        .map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "Signals: [{}] approvals {}/{}, {} days inactive",
        signal_labels(&detail.signals),
        detail.signals.approval_count,
        detail.signals.required_review_count,
        detail.signals.days_inactive,
    )
    .map_err(|e| io_error(&e))?;

    write_threads_to(writer, detail)?;
    write_reviews_to(writer, &detail.reviews)?;
    writeln!(writer, "Issue comments: {}", detail.issue_comments.len())
        .map_err(|e| io_error(&e))?;
    write_check_runs_to(writer, detail)
}

fn write_threads_to<W: Write>(
    writer: &mut W,
    detail: &PullRequestDetail,
) -> Result<(), GithubError> {
    writeln!(
        writer,
        "Threads: {} ({} resolved, {} unresolved)",
        detail.threads.len(),
        detail.resolved_count,
        detail.unresolved_count,
    )
    .map_err(|e| io_error(&e))?;

    for thread in &detail.threads {
        writeln!(writer, "  {}", thread_line(thread)).map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn write_reviews_to<W: Write>(
    writer: &mut W,
    reviews: &[ClassifiedReview],
) -> Result<(), GithubError> {
    writeln!(writer, "Reviews: {}", reviews.len()).map_err(|e| io_error(&e))?;
    for classified in reviews {
        let reviewer = classified.review.reviewer.as_deref().unwrap_or("unknown");
        writeln!(
            writer,
            "  {} by {reviewer}{}",
            classified.review.state.label(),
            classification_tags(&classified.classification),
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn write_check_runs_to<W: Write>(
    writer: &mut W,
    detail: &PullRequestDetail,
) -> Result<(), GithubError> {
    if detail.check_runs.is_empty() {
        return writeln!(writer, "Check runs: none").map_err(|e| io_error(&e));
    }

    let runs: Vec<String> = detail
        .check_runs
        .iter()
        .map(|run| {
            let outcome = run
                .conclusion
                .as_deref()
                .or(run.status.as_deref())
                .unwrap_or("unknown");
            format!("{} {outcome}", run.name)
        })
        .collect();
    writeln!(writer, "Check runs: {}", runs.join(", ")).map_err(|e| io_error(&e))
}

/// One summary line for a thread: resolution, anchor, author, and the first
/// line of the root body plus classification tags and a reply count.
fn thread_line(thread: &ThreadView) -> String {
    let marker = if thread.resolved { "resolved" } else { "open" };
    let path = thread
        .root
        .comment
        .file_path
        .as_deref()
        .unwrap_or("(no file)");
    let author = thread.root.comment.author.as_deref().unwrap_or("unknown");
    let body = thread
        .root
        .comment
        .body
        .as_deref()
        .and_then(|text| text.lines().next())
        .unwrap_or("");
    let replies = match thread.replies.len() {
        0 => String::new(),
        1 => " (+1 reply)".to_owned(),
        count => format!(" (+{count} replies)"),
    };

    format!(
        "[{marker}] {path} @{author}: {body}{}{replies}",
        classification_tags(&thread.root.classification),
    )
}

fn classification_tags(classification: &CommentClassification) -> String {
    let mut tags = String::new();
    if classification.outdated {
        tags.push_str(" [outdated]");
    }
    if classification.nitpick {
        tags.push_str(" [nitpick]");
    } else if classification.bot_authored {
        tags.push_str(" [bot]");
    }
    tags
}

fn signal_labels(signals: &AttentionSignals) -> String {
    let mut labels = Vec::new();
    if signals.needs_more_reviews {
        labels.push("needs-reviews");
    }
    if signals.is_stale {
        labels.push("stale");
    }
    if signals.ci_failing {
        labels.push("ci-failing");
    }

    if labels.is_empty() {
        "ok".to_owned()
    } else {
        labels.join(", ")
    }
}

fn state_label(state: PullRequestState, draft: bool) -> String {
    if draft {
        format!("{} (draft)", state.as_str())
    } else {
        state.as_str().to_owned()
    }
}

/// Converts an I/O error to a [`GithubError::Io`].
pub(crate) fn io_error(error: &io::Error) -> GithubError {
    GithubError::Io {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use perch::github::models::test_support::{
        approved_review, completed_check_run, pull_request, reply_comment, root_comment,
    };
    use perch::review::{ClassifiedComment, ClassifiedReview, CommentClassification, ThreadView};
    use perch::{AttentionSignals, PullRequestCard, PullRequestDetail};

    use super::{write_detail_to, write_worklist_to};

    fn signals(needs_more_reviews: bool, is_stale: bool) -> AttentionSignals {
        AttentionSignals {
            needs_more_reviews,
            is_stale,
            approval_count: 1,
            required_review_count: 2,
            days_inactive: 9,
            ..AttentionSignals::default()
        }
    }

    fn classified_root(id: u64, body: &str, author: &str) -> ClassifiedComment {
        ClassifiedComment {
            comment: root_comment(id, body, author),
            classification: CommentClassification::default(),
        }
    }

    #[test]
    fn worklist_lists_cards_with_signal_labels() {
        let mut flagged = pull_request("acme/widgets", 42);
        flagged.title = Some("Add worklist ordering".to_owned());
        flagged.author = Some("alice".to_owned());
        let mut quiet = pull_request("acme/widgets", 7);
        quiet.title = Some("Fix typo".to_owned());
        quiet.author = Some("bob".to_owned());

        let cards = vec![
            PullRequestCard {
                pull_request: flagged,
                signals: signals(true, true),
                unresolved_count: 3,
            },
            PullRequestCard {
                pull_request: quiet,
                signals: AttentionSignals {
                    approval_count: 2,
                    required_review_count: 2,
                    ..AttentionSignals::default()
                },
                unresolved_count: 0,
            },
        ];

        let mut buffer = Vec::new();
        write_worklist_to(&mut buffer, "acme/widgets", &cards)
            .expect("should write worklist");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        assert!(
            output.contains("Open pull requests for acme/widgets:"),
            "missing header: {output}"
        );
        assert!(
            output.contains("#42 [needs-reviews, stale] Add worklist ordering (@alice)"),
            "missing flagged card line: {output}"
        );
        assert!(
            output.contains("approvals 1/2, 9 days inactive, 3 unresolved threads"),
            "missing signal detail line: {output}"
        );
        assert!(
            output.contains("#7 [ok] Fix typo (@bob)"),
            "missing quiet card line: {output}"
        );
        assert!(
            output.contains("1 of 2 pull requests need attention"),
            "missing summary line: {output}"
        );
    }

    #[test]
    fn worklist_reports_empty_repositories() {
        let mut buffer = Vec::new();
        write_worklist_to(&mut buffer, "acme/widgets", &[])
            .expect("should write empty worklist");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        assert!(output.contains("  none"), "missing empty marker: {output}");
    }

    #[test]
    fn detail_renders_threads_reviews_and_checks() {
        let mut fetched = pull_request("acme/widgets", 7);
        fetched.title = Some("Introduce thresholds".to_owned());
        fetched.author = Some("alice".to_owned());
        fetched.html_url = Some("https://github.com/acme/widgets/pull/7".to_owned());
        fetched.draft = true;

        let mut root = classified_root(1, "Rename this variable", "bob");
        root.comment.file_path = Some("src/main.rs".to_owned());
        let reply = ClassifiedComment {
            comment: reply_comment(2, 1, "Done", "alice"),
            classification: CommentClassification::default(),
        };
        let outdated_review = ClassifiedReview {
            review: approved_review(10, "carol"),
            classification: CommentClassification {
                outdated: true,
                ..CommentClassification::default()
            },
        };

        let detail = PullRequestDetail {
            pull_request: fetched,
            threads: vec![ThreadView {
                resolved: true,
                root,
                replies: vec![reply],
            }],
            resolved_count: 1,
            unresolved_count: 0,
            reviews: vec![outdated_review],
            issue_comments: Vec::new(),
            check_runs: vec![
                completed_check_run(1, "build", "success"),
                completed_check_run(2, "lint", "failure"),
            ],
            signals: signals(true, false),
        };

        let mut buffer = Vec::new();
        write_detail_to(&mut buffer, &detail).expect("should write detail");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        assert!(
            output.contains("PR #7 by alice: Introduce thresholds"),
            "missing header: {output}"
        );
        assert!(
            output.contains("State: open (draft)"),
            "missing state line: {output}"
        );
        assert!(
            output.contains("Signals: [needs-reviews] approvals 1/2, 9 days inactive"),
            "missing signals line: {output}"
        );
        assert!(
            output.contains("Threads: 1 (1 resolved, 0 unresolved)"),
            "missing thread tally: {output}"
        );
        assert!(
            output.contains("[resolved] src/main.rs @bob: Rename this variable (+1 reply)"),
            "missing thread line: {output}"
        );
        assert!(
            output.contains("approved by carol [outdated]"),
            "missing review line: {output}"
        );
        assert!(
            output.contains("Check runs: build success, lint failure"),
            "missing check runs line: {output}"
        );
    }

    #[test]
    fn detail_marks_bot_nitpick_threads() {
        let mut root = classified_root(1, "Nitpick: trailing whitespace", "helper[bot]");
        root.classification = CommentClassification {
            outdated: false,
            bot_authored: true,
            nitpick: true,
        };

        let detail = PullRequestDetail {
            pull_request: pull_request("acme/widgets", 7),
            threads: vec![ThreadView {
                resolved: false,
                root,
                replies: Vec::new(),
            }],
            resolved_count: 0,
            unresolved_count: 1,
            reviews: Vec::new(),
            issue_comments: Vec::new(),
            check_runs: Vec::new(),
            signals: AttentionSignals::default(),
        };

        let mut buffer = Vec::new();
        write_detail_to(&mut buffer, &detail).expect("should write detail");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        assert!(
            output.contains("[open] (no file) @helper[bot]: Nitpick: trailing whitespace [nitpick]"),
            "missing nitpick tag: {output}"
        );
        assert!(
            output.contains("Check runs: none"),
            "missing empty check runs line: {output}"
        );
    }
}
