//! Tests for the review read gateway.

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{OctocrabReviewGateway, parse_resolved_comment_ids};
use crate::github::error::GithubError;
use crate::github::gateway::ReviewGateway;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::models::ReviewState;

trait BlocksOnRuntime {
    fn runtime(&self) -> &Runtime;

    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime().block_on(future)
    }
}

struct ReviewGatewayFixture {
    runtime: Runtime,
    server: MockServer,
    locator: PullRequestLocator,
    gateway: OctocrabReviewGateway,
}

impl BlocksOnRuntime for ReviewGatewayFixture {
    fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

#[fixture]
fn token() -> FixtureResult<PersonalAccessToken> {
    Ok(PersonalAccessToken::new("valid-token")?)
}

#[fixture]
fn gateway_fixture(
    token: FixtureResult<PersonalAccessToken>,
) -> FixtureResult<ReviewGatewayFixture> {
    let token_value = token?;
    let runtime = Runtime::new()?;
    let server = runtime.block_on(MockServer::start());
    let locator = PullRequestLocator::parse(&format!("{}/owner/repo/pull/42", server.uri()))?;
    let _guard = runtime.enter();
    let gateway = OctocrabReviewGateway::new(&token_value, &format!("{}/api/v3", server.uri()))?;
    Ok(ReviewGatewayFixture {
        runtime,
        server,
        locator,
        gateway,
    })
}

fn mount_listing(fixture: &ReviewGatewayFixture, endpoint: &str, body: serde_json::Value) {
    fixture.block_on(
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/repos/owner/repo/{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&fixture.server),
    );
}

#[rstest]
fn review_summary_combines_sources_and_overlays_resolution(
    gateway_fixture: FixtureResult<ReviewGatewayFixture>,
) {
    let fixture = gateway_fixture.expect("fixture should succeed");

    mount_listing(
        &fixture,
        "pulls/42/reviews",
        serde_json::json!([
            {
                "id": 10,
                "user": { "login": "alice", "type": "User" },
                "state": "APPROVED",
                "commit_id": "abc123",
                "submitted_at": "2026-01-01T00:00:00Z"
            },
            {
                "id": 11,
                "user": { "login": "helper[bot]", "type": "Bot" },
                "state": "COMMENTED",
                "body": "Automated feedback",
                "commit_id": "abc123",
                "submitted_at": "2026-01-01T01:00:00Z"
            }
        ]),
    );

    mount_listing(
        &fixture,
        "pulls/42/comments",
        serde_json::json!([
            {
                "id": 1,
                "body": "Root comment",
                "user": { "login": "alice" },
                "path": "src/lib.rs",
                "line": 5,
                "commit_id": "abc123",
                "in_reply_to_id": null,
                "created_at": "2026-01-01T00:00:00Z"
            },
            {
                "id": 2,
                "body": "Reply",
                "user": { "login": "bob" },
                "path": "src/lib.rs",
                "line": 5,
                "commit_id": "abc123",
                "in_reply_to_id": 1,
                "created_at": "2026-01-01T01:00:00Z"
            }
        ]),
    );

    mount_listing(
        &fixture,
        "issues/42/comments",
        serde_json::json!([
            {
                "id": 30,
                "body": "Build passed",
                "user": { "login": "ci-bot", "type": "Bot" },
                "created_at": "2026-01-01T02:00:00Z"
            }
        ]),
    );

    let graphql_response = ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "data": {
            "repository": {
                "pullRequest": {
                    "reviewThreads": {
                        "nodes": [
                            {
                                "isResolved": true,
                                "comments": { "nodes": [{ "databaseId": 1 }, { "databaseId": 2 }] }
                            }
                        ]
                    }
                }
            }
        }
    }));
    fixture.block_on(
        Mock::given(method("POST"))
            .and(path_regex(".*graphql$"))
            .respond_with(graphql_response)
            .mount(&fixture.server),
    );

    let summary = fixture
        .block_on(fixture.gateway.review_summary(&fixture.locator))
        .expect("request should succeed");

    assert_eq!(summary.reviews.len(), 2);
    let first_review = summary.reviews.first().expect("should have first review");
    assert_eq!(first_review.state, ReviewState::Approved);
    assert!(!first_review.bot);

    assert_eq!(summary.review_comments.len(), 2);
    assert!(
        summary
            .review_comments
            .iter()
            .all(|comment| comment.resolved),
        "both comments sit in the resolved thread"
    );

    assert_eq!(summary.issue_comments.len(), 1);
    assert!(summary.bot_usernames.contains("helper[bot]"));
    assert!(summary.bot_usernames.contains("ci-bot"));
    assert!(!summary.bot_usernames.contains("alice"));
}

#[rstest]
fn review_summary_survives_thread_lookup_failure(
    gateway_fixture: FixtureResult<ReviewGatewayFixture>,
) {
    let fixture = gateway_fixture.expect("fixture should succeed");

    mount_listing(&fixture, "pulls/42/reviews", serde_json::json!([]));
    mount_listing(
        &fixture,
        "pulls/42/comments",
        serde_json::json!([
            {
                "id": 1,
                "body": "Still open",
                "user": { "login": "alice" },
                "path": "src/lib.rs",
                "line": 5,
                "commit_id": "abc123",
                "in_reply_to_id": null,
                "created_at": "2026-01-01T00:00:00Z"
            }
        ]),
    );
    mount_listing(&fixture, "issues/42/comments", serde_json::json!([]));

    fixture.block_on(
        Mock::given(method("POST"))
            .and(path_regex(".*graphql$"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&fixture.server),
    );

    let summary = fixture
        .block_on(fixture.gateway.review_summary(&fixture.locator))
        .expect("summary should degrade, not fail");

    let comment = summary
        .review_comments
        .first()
        .expect("should have one comment");
    assert!(!comment.resolved);
}

#[rstest]
fn review_summary_maps_auth_errors(gateway_fixture: FixtureResult<ReviewGatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");

    let response = ResponseTemplate::new(401).set_body_json(serde_json::json!({
        "message": "Bad credentials",
        "documentation_url": "https://docs.github.com/rest"
    }));
    fixture.block_on(
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/owner/repo/pulls/42/reviews"))
            .respond_with(response)
            .mount(&fixture.server),
    );

    let error = fixture
        .block_on(fixture.gateway.review_summary(&fixture.locator))
        .expect_err("request should fail");

    match error {
        GithubError::Authentication { message } => {
            assert!(
                message.contains("Bad credentials"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected Authentication error, got {other:?}"),
    }
}

#[rstest]
#[case::missing_data(serde_json::json!({ "data": null }))]
#[case::wrong_shape(serde_json::json!({ "data": { "repository": "oops" } }))]
#[case::empty_nodes(serde_json::json!({
    "data": { "repository": { "pullRequest": { "reviewThreads": { "nodes": [] } } } }
}))]
fn parse_resolved_comment_ids_tolerates_malformed_responses(#[case] response: serde_json::Value) {
    assert!(parse_resolved_comment_ids(&response).is_empty());
}

#[test]
fn parse_resolved_comment_ids_skips_unresolved_threads() {
    let response = serde_json::json!({
        "data": {
            "repository": {
                "pullRequest": {
                    "reviewThreads": {
                        "nodes": [
                            {
                                "isResolved": false,
                                "comments": { "nodes": [{ "databaseId": 1 }] }
                            },
                            {
                                "isResolved": true,
                                "comments": { "nodes": [{ "databaseId": 2 }, { "databaseId": null }] }
                            }
                        ]
                    }
                }
            }
        }
    });

    let resolved = parse_resolved_comment_ids(&response);
    assert_eq!(resolved.len(), 1);
    assert!(resolved.contains(&2));
}
