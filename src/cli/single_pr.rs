//! Single pull request detail operation.

use std::io;

use chrono::Utc;
use perch::{
    GithubError, OctocrabCheckRunGateway, OctocrabPullRequestGateway, OctocrabReviewGateway,
    PerchConfig, PersonalAccessToken, PullRequestEnricher, PullRequestLocator,
};

use super::output::write_detail_to;
use super::threshold_store;

/// Loads and renders the enriched detail view for a single pull request.
///
/// # Errors
///
/// Returns [`GithubError::Configuration`] if required configuration is
/// missing and [`GithubError::NotFound`] when the pull request does not
/// exist. Enrichment failures degrade inside the enricher and do not
/// surface here.
pub async fn run(config: &PerchConfig) -> Result<(), GithubError> {
    let pr_url = config.require_pr_url()?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let locator = PullRequestLocator::parse(pr_url)?;
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

    let detail = enricher.detail(&locator, Utc::now()).await?;

    let mut stdout = io::stdout().lock();
    write_detail_to(&mut stdout, &detail)
}
