//! Attention signal evaluation for pull request cards.
//!
//! Signals are computed against the effective thresholds for the
//! repository. Disabled signals are forced false while the raw counts they
//! derive from are still reported, so a dashboard can show "3 days
//! inactive" even when the staleness signal itself is switched off.

use chrono::{DateTime, Utc};

use crate::github::models::{CheckRun, Review};

use super::thresholds::{EffectiveThresholds, GlobalSettings};

/// Signals and raw counts for one pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttentionSignals {
    /// Fewer approvals than the repository requires.
    pub needs_more_reviews: bool,
    /// Inactive for at least the urgency cut-off.
    pub is_stale: bool,
    /// At least one completed check run failed.
    pub ci_failing: bool,
    /// Approving reviews counted from upstream state.
    pub approval_count: u32,
    /// Approvals the repository requires.
    pub required_review_count: u32,
    /// Whole days since the last recorded activity.
    pub days_inactive: u32,
}

impl AttentionSignals {
    /// Number of active signals, used for worklist ordering.
    #[must_use]
    pub fn active_count(&self) -> u32 {
        u32::from(self.needs_more_reviews) + u32::from(self.is_stale) + u32::from(self.ci_failing)
    }
}

/// Inputs for one evaluation pass.
#[derive(Debug, Clone)]
pub struct AttentionInputs<'a> {
    /// Reviews currently on the pull request.
    pub reviews: &'a [Review],
    /// Check runs for the head commit.
    pub check_runs: &'a [CheckRun],
    /// Timestamp of the most recent activity, if known.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// The evaluation instant, supplied by the caller for determinism.
    pub now: DateTime<Utc>,
}

/// Evaluates attention signals against resolved thresholds and enable
/// flags.
///
/// Approvals are counted as upstream reports them: GitHub keeps one active
/// review per reviewer, so no re-deduplication happens here. A missing
/// activity timestamp counts as zero days inactive.
#[must_use]
pub fn evaluate(
    inputs: &AttentionInputs<'_>,
    thresholds: EffectiveThresholds,
    settings: &GlobalSettings,
) -> AttentionSignals {
    let approvals = inputs
        .reviews
        .iter()
        .filter(|review| review.state.is_approval())
        .count();
    let approval_count = u32::try_from(approvals).unwrap_or(u32::MAX);

    let days_inactive = inputs.last_activity_at.map_or(0, |last_activity| {
        let days = (inputs.now - last_activity).num_days().max(0);
        u32::try_from(days).unwrap_or(u32::MAX)
    });

    let needs_more_reviews = approval_count < thresholds.required_review_count;
    let is_stale = settings.stale_signal_enabled && days_inactive >= thresholds.urgency_days;
    let ci_failing = settings.ci_signal_enabled && inputs.check_runs.iter().any(CheckRun::failed);

    AttentionSignals {
        needs_more_reviews,
        is_stale,
        ci_failing,
        approval_count,
        required_review_count: thresholds.required_review_count,
        days_inactive,
    }
}
