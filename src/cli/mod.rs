//! CLI operation mode handlers.
//!
//! This module contains the implementations for different operation modes:
//! - [`migrations`]: Database schema migrations
//! - [`repository_listing`]: Attention-ordered worklist for a repository
//! - [`single_pr`]: Enriched detail view for a single pull request
//!
//! Output formatting utilities are in [`output`].

use perch::review::thresholds::{ThresholdStore, UnconfiguredThresholdStore};
use perch::{PerchConfig, SqliteSettingsStore};

pub mod migrations;
pub mod output;
pub mod repository_listing;
pub mod single_pr;

/// Builds the threshold store for read operations.
///
/// Without a configured database the resolver falls through to the built-in
/// defaults; a store that cannot even be constructed is downgraded the same
/// way with a warning, because threshold lookups must never fail a render.
pub fn threshold_store(config: &PerchConfig) -> Box<dyn ThresholdStore> {
    let Some(database_url) = config.database_url.as_deref() else {
        return Box::new(UnconfiguredThresholdStore);
    };

    match SqliteSettingsStore::new(database_url) {
        Ok(store) => Box::new(store),
        Err(error) => {
            tracing::warn!(
                error = %error,
                "settings store unavailable; using default thresholds"
            );
            Box::new(UnconfiguredThresholdStore)
        }
    }
}
