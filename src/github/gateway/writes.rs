//! Octocrab implementation of the mutation gateway.
//!
//! Review submission and comments go through REST endpoints. Draft state
//! only mutates through GraphQL, which reports failures inside a 200
//! response body, so those responses are checked for an `errors` array.

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::github::error::GithubError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::models::ReviewSubmission;

use super::MutationGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error_with_rate_limit;

/// Octocrab-backed mutation gateway.
pub struct OctocrabMutationGateway {
    client: Octocrab,
}

impl OctocrabMutationGateway {
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

    /// Posts a JSON body to a REST endpoint, discarding the response payload.
    async fn post_rest(
        &self,
        operation: &str,
        path: String,
        body: &serde_json::Value,
    ) -> Result<(), GithubError> {
        match self
            .client
            .post::<_, serde_json::Value>(path, Some(body))
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => {
                Err(map_octocrab_error_with_rate_limit(&self.client, operation, &error).await)
            }
        }
    }

    /// Runs a single-input GraphQL mutation addressed by pull request node id.
    async fn graphql_mutation(
        &self,
        mutation: &str,
        locator: &PullRequestLocator,
        node_id: &str,
    ) -> Result<(), GithubError> {
        let operation = format!("{mutation} for {name}", name = locator.full_name());
        let query = format!(
            "mutation($id: ID!) {{ {mutation}(input: {{pullRequestId: $id}}) {{ pullRequest {{ isDraft }} }} }}"
        );
        let payload = serde_json::json!({
            "query": query,
            "variables": { "id": node_id }
        });

        let response: serde_json::Value = match self.client.graphql(&payload).await {
            Ok(value) => value,
            Err(error) => {
                return Err(
                    map_octocrab_error_with_rate_limit(&self.client, &operation, &error).await,
                );
            }
        };

        graphql_error_message(&response).map_or_else(
            || Ok(()),
            |message| {
                Err(GithubError::Api {
                    message: format!("{operation} failed: {message}"),
                })
            },
        )
    }
}

#[async_trait]
impl MutationGateway for OctocrabMutationGateway {
    async fn submit_review(
        &self,
        locator: &PullRequestLocator,
        submission: &ReviewSubmission,
    ) -> Result<(), GithubError> {
        let mut body = serde_json::json!({ "event": submission.event.api_value() });
        if let Some(text) = &submission.body {
            body["body"] = serde_json::Value::String(text.clone());
        }
        self.post_rest("submit review", locator.reviews_path(), &body)
            .await
    }

    async fn create_issue_comment(
        &self,
        locator: &PullRequestLocator,
        body: &str,
    ) -> Result<(), GithubError> {
        self.post_rest(
            "create issue comment",
            locator.issue_comments_path(),
            &serde_json::json!({ "body": body }),
        )
        .await
    }

    async fn create_reply_comment(
        &self,
        locator: &PullRequestLocator,
        root_id: u64,
        body: &str,
    ) -> Result<(), GithubError> {
        self.post_rest(
            "create reply comment",
            locator.reply_path(root_id),
            &serde_json::json!({ "body": body }),
        )
        .await
    }

    async fn convert_to_draft(
        &self,
        locator: &PullRequestLocator,
        node_id: &str,
    ) -> Result<(), GithubError> {
        self.graphql_mutation("convertPullRequestToDraft", locator, node_id)
            .await
    }

    async fn mark_ready_for_review(
        &self,
        locator: &PullRequestLocator,
        node_id: &str,
    ) -> Result<(), GithubError> {
        self.graphql_mutation("markPullRequestReadyForReview", locator, node_id)
            .await
    }
}

/// Extracts a combined error message from a GraphQL response, if any.
fn graphql_error_message(response: &serde_json::Value) -> Option<String> {
    let errors = response.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }

    let joined = errors
        .iter()
        .filter_map(|error| error.get("message").and_then(serde_json::Value::as_str))
        .collect::<Vec<_>>()
        .join("; ");

    if joined.is_empty() {
        Some("GraphQL mutation returned errors".to_owned())
    } else {
        Some(joined)
    }
}
