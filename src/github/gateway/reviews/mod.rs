//! Octocrab implementation of the review read gateway.
//!
//! Combines the REST listings for reviews, review comments, and issue
//! comments into a single [`ReviewSummary`], then overlays thread resolution
//! state fetched through the GraphQL API. Resolution lookup is best-effort:
//! when the GraphQL call fails the summary is still returned with every
//! comment treated as unresolved.

use std::collections::HashSet;

use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;

use crate::github::error::GithubError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::models::{
    ApiIssueComment, ApiReview, ApiReviewComment, IssueComment, Review, ReviewComment,
    ReviewSummary,
};

use super::ReviewGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error_with_rate_limit;

const RESOLVED_THREADS_QUERY: &str = "\
query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      reviewThreads(first: 100) {
        nodes {
          isResolved
          comments(first: 100) { nodes { databaseId } }
        }
      }
    }
  }
}";

/// Octocrab-backed review read gateway.
pub struct OctocrabReviewGateway {
    client: Octocrab,
}

impl OctocrabReviewGateway {
    /// Creates a new gateway for the given token and API base URL.
    ///
    /// # Errors
    ///
    /// Returns `GithubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GithubError::Api` when Octocrab fails to construct a client.
    pub fn new(token: &PersonalAccessToken, api_base: &str) -> Result<Self, GithubError> {
        let client = build_octocrab_client(token, api_base)?;
        Ok(Self { client })
    }

    /// Fetches every page of a listing endpoint into a single vector.
    async fn fetch_all_pages<T>(&self, operation: &str, path: String) -> Result<Vec<T>, GithubError>
    where
        T: DeserializeOwned + Send,
    {
        let query_params = [("per_page", "100")];

        let page: Page<T> = match self.client.get(path, Some(&query_params)).await {
            Ok(page) => page,
            Err(error) => {
                return Err(
                    map_octocrab_error_with_rate_limit(&self.client, operation, &error).await,
                );
            }
        };

        match self.client.all_pages(page).await {
            Ok(items) => Ok(items),
            Err(error) => {
                Err(map_octocrab_error_with_rate_limit(&self.client, operation, &error).await)
            }
        }
    }

    /// Returns the database ids of review comments that sit in resolved
    /// threads.
    ///
    /// Thread resolution only exists in the GraphQL schema. Failures here
    /// must not sink the whole summary, so any transport or shape problem
    /// logs a warning and yields the empty set.
    async fn fetch_resolved_comment_ids(&self, locator: &PullRequestLocator) -> HashSet<u64> {
        let payload = serde_json::json!({
            "query": RESOLVED_THREADS_QUERY,
            "variables": {
                "owner": locator.owner().as_str(),
                "name": locator.repository().as_str(),
                "number": locator.number().get(),
            }
        });

        let response: serde_json::Value = match self.client.graphql(&payload).await {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(
                    repository = %locator.full_name(),
                    number = locator.number().get(),
                    error = %error,
                    "review thread lookup failed; treating all threads as unresolved"
                );
                return HashSet::new();
            }
        };

        if response.get("errors").is_some() {
            tracing::warn!(
                repository = %locator.full_name(),
                number = locator.number().get(),
                "review thread lookup returned errors; treating all threads as unresolved"
            );
            return HashSet::new();
        }

        parse_resolved_comment_ids(&response)
    }
}

#[async_trait]
impl ReviewGateway for OctocrabReviewGateway {
    async fn review_summary(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<ReviewSummary, GithubError> {
        let reviews: Vec<Review> = self
            .fetch_all_pages::<ApiReview>("reviews", locator.reviews_path())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let mut review_comments: Vec<ReviewComment> = self
            .fetch_all_pages::<ApiReviewComment>("review comments", locator.review_comments_path())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let issue_comments: Vec<IssueComment> = self
            .fetch_all_pages::<ApiIssueComment>("issue comments", locator.issue_comments_path())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let resolved_ids = self.fetch_resolved_comment_ids(locator).await;
        for comment in &mut review_comments {
            comment.resolved = resolved_ids.contains(&comment.id);
        }

        let bot_usernames = collect_bot_usernames(&reviews, &review_comments, &issue_comments);

        Ok(ReviewSummary {
            reviews,
            review_comments,
            issue_comments,
            bot_usernames,
        })
    }
}

/// Extracts resolved comment ids from the review-threads GraphQL response.
fn parse_resolved_comment_ids(response: &serde_json::Value) -> HashSet<u64> {
    let Some(nodes) = response
        .pointer("/data/repository/pullRequest/reviewThreads/nodes")
        .and_then(serde_json::Value::as_array)
    else {
        tracing::warn!(
            "review thread response missing expected structure; treating all threads as unresolved"
        );
        return HashSet::new();
    };

    let mut resolved = HashSet::new();
    for node in nodes {
        let is_resolved = node
            .get("isResolved")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !is_resolved {
            continue;
        }

        let Some(comments) = node
            .pointer("/comments/nodes")
            .and_then(serde_json::Value::as_array)
        else {
            continue;
        };

        for comment in comments {
            if let Some(id) = comment
                .get("databaseId")
                .and_then(serde_json::Value::as_u64)
            {
                resolved.insert(id);
            }
        }
    }

    resolved
}

/// Collects the logins GitHub reports as bot accounts across all sources.
fn collect_bot_usernames(
    reviews: &[Review],
    review_comments: &[ReviewComment],
    issue_comments: &[IssueComment],
) -> HashSet<String> {
    let review_bots = reviews
        .iter()
        .filter(|review| review.bot)
        .filter_map(|review| review.reviewer.clone());
    let comment_bots = review_comments
        .iter()
        .filter(|comment| comment.bot)
        .filter_map(|comment| comment.author.clone());
    let issue_bots = issue_comments
        .iter()
        .filter(|comment| comment.bot)
        .filter_map(|comment| comment.author.clone());

    review_bots.chain(comment_bots).chain(issue_bots).collect()
}

#[cfg(test)]
mod tests;
