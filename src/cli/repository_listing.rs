//! Attention-ordered repository worklist operation.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use perch::{
    GithubError, OctocrabCheckRunGateway, OctocrabPullRequestGateway, OctocrabReviewGateway,
    PerchConfig, PersonalAccessToken, PullRequestEnricher, RepositoryLocator,
};

use super::output::write_worklist_to;
use super::threshold_store;

/// Renders the attention-ordered worklist for the configured repository.
///
/// # Errors
///
/// Returns [`GithubError::Configuration`] if required configuration is
/// missing and the underlying [`GithubError`] when the open pull request
/// listing fails.
pub async fn run(config: &PerchConfig) -> Result<(), GithubError> {
    let (owner, repo) = config.require_repository_info()?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let locator = RepositoryLocator::from_owner_repo(owner, repo)?;
    let api_base = locator.api_base().as_str().to_owned();

    let pull_requests = OctocrabPullRequestGateway::new(&token, &api_base)?;
    let reviews = OctocrabReviewGateway::new(&token, &api_base)?;
    let checks = OctocrabCheckRunGateway::new(&token, &api_base)?;
    let store = threshold_store(config);
    let enricher = PullRequestEnricher::new(
        &pull_requests,
        &reviews,
        &checks,
        store.as_ref(),
        config.resolve_nitpick_markers(),
    );

    let mut stdout = io::stdout().lock();
    run_with_enricher(&enricher, &locator, Utc::now(), &mut stdout).await
}

/// Renders the worklist over an already-constructed enricher.
///
/// This function is exposed for testing with stub gateways.
///
/// # Errors
///
/// Returns [`GithubError`] when the open pull request listing fails or the
/// output cannot be written.
pub async fn run_with_enricher<W: Write>(
    enricher: &PullRequestEnricher<'_>,
    locator: &RepositoryLocator,
    now: DateTime<Utc>,
    writer: &mut W,
) -> Result<(), GithubError> {
    let cards = enricher.worklist(locator, now).await?;
    write_worklist_to(writer, &locator.full_name(), &cards)
}
