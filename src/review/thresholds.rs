//! Layered threshold resolution for attention signals.
//!
//! Effective thresholds resolve per repository with per-field precedence:
//! a non-null field on the repository override wins, then the global
//! settings row, then the hard-coded defaults. Store failures fall back to
//! the next layer with a warning and never surface as errors.

use std::collections::HashMap;

use crate::persistence::PersistenceError;

/// Default number of approving reviews a pull request needs.
pub const DEFAULT_REQUIRED_REVIEW_COUNT: u32 = 2;

/// Default number of inactive days before a pull request counts as stale.
pub const DEFAULT_URGENCY_DAYS: u32 = 7;

/// Global settings row, passed around as an explicit value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    /// Approvals required before the review signal clears.
    pub required_review_count: u32,
    /// Inactive days before a pull request counts as stale.
    pub urgency_days: u32,
    /// Whether the staleness signal is evaluated at all.
    pub stale_signal_enabled: bool,
    /// Whether the CI-failure signal is evaluated at all.
    pub ci_signal_enabled: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            required_review_count: DEFAULT_REQUIRED_REVIEW_COUNT,
            urgency_days: DEFAULT_URGENCY_DAYS,
            stale_signal_enabled: true,
            ci_signal_enabled: true,
        }
    }
}

/// Per-repository threshold override with independently optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoThreshold {
    /// Override for the required approval count, if set.
    pub required_review_count: Option<u32>,
    /// Override for the staleness cut-off in days, if set.
    pub urgency_days: Option<u32>,
}

/// Thresholds after precedence resolution for one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveThresholds {
    /// Approvals required before the review signal clears.
    pub required_review_count: u32,
    /// Inactive days before a pull request counts as stale.
    pub urgency_days: u32,
}

/// Port for loading threshold rows from the settings store.
#[cfg_attr(test, mockall::automock)]
pub trait ThresholdStore: Send + Sync {
    /// Loads the global settings row, if one has been written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the store cannot be read.
    fn global_settings(&self) -> Result<Option<GlobalSettings>, PersistenceError>;

    /// Loads the override row for the repository full name, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the store cannot be read.
    fn repo_threshold(&self, repository: &str) -> Result<Option<RepoThreshold>, PersistenceError>;
}

/// Store used when no local database is configured.
///
/// Every lookup reports no stored rows, so resolution falls through to the
/// built-in defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredThresholdStore;

impl ThresholdStore for UnconfiguredThresholdStore {
    fn global_settings(&self) -> Result<Option<GlobalSettings>, PersistenceError> {
        Ok(None)
    }

    fn repo_threshold(&self, _repository: &str) -> Result<Option<RepoThreshold>, PersistenceError> {
        Ok(None)
    }
}

/// Loads global settings through the store, defaulting when absent or
/// unreadable.
#[must_use]
pub fn load_settings(store: &dyn ThresholdStore) -> GlobalSettings {
    match store.global_settings() {
        Ok(Some(settings)) => settings,
        Ok(None) => GlobalSettings::default(),
        Err(error) => {
            tracing::warn!(error = %error, "failed to load global settings; using defaults");
            GlobalSettings::default()
        }
    }
}

/// Resolves effective thresholds with memoisation scoped to one listing
/// pass.
///
/// Create a fresh resolver per pass and discard it afterwards so override
/// edits take effect on the next pass.
pub struct ThresholdResolver<'a> {
    store: &'a dyn ThresholdStore,
    settings: GlobalSettings,
    cache: HashMap<String, EffectiveThresholds>,
}

impl<'a> ThresholdResolver<'a> {
    /// Creates a resolver over the given store and global settings.
    #[must_use]
    pub fn new(store: &'a dyn ThresholdStore, settings: GlobalSettings) -> Self {
        Self {
            store,
            settings,
            cache: HashMap::new(),
        }
    }

    /// Global settings this resolver was created with.
    #[must_use]
    pub const fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Returns the effective thresholds for the repository.
    ///
    /// A failed override lookup falls back to the global settings with a
    /// warning. The result is memoised for the lifetime of this resolver.
    #[must_use]
    pub fn resolve(&mut self, repository: &str) -> EffectiveThresholds {
        if let Some(found) = self.cache.get(repository) {
            tracing::debug!(repository, "threshold cache hit");
            return *found;
        }

        let override_row = match self.store.repo_threshold(repository) {
            Ok(row) => row.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(
                    repository,
                    error = %error,
                    "threshold lookup failed; falling back to global settings"
                );
                RepoThreshold::default()
            }
        };

        let effective = EffectiveThresholds {
            required_review_count: override_row
                .required_review_count
                .unwrap_or(self.settings.required_review_count),
            urgency_days: override_row
                .urgency_days
                .unwrap_or(self.settings.urgency_days),
        };

        self.cache.insert(repository.to_owned(), effective);
        effective
    }
}
