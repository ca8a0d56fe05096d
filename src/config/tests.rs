//! Unit tests for configuration loading and precedence.

use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::{Value, json};

use crate::review::WriteCredentialStore;

use super::{DEFAULT_NITPICK_MARKERS, OperationMode, PerchConfig};

/// Applies a configuration layer to the composer based on the layer type.
fn apply_layer(composer: &mut MergeComposer, layer_type: &str, value: Value) {
    match layer_type {
        "defaults" => composer.push_defaults(value),
        "file" => composer.push_file(value, None),
        "environment" => composer.push_environment(value),
        "cli" => composer.push_cli(value),
        _ => panic!("unknown layer type: {layer_type}"),
    }
}

#[rstest]
#[case::file_overrides_defaults(
    vec![("defaults", json!({"pr_url": "default-url"})), ("file", json!({"pr_url": "file-url"}))],
    "pr_url",
    "file-url",
    "file should override default"
)]
#[case::environment_overrides_file(
    vec![("file", json!({"token": "file-token"})), ("environment", json!({"token": "env-token"}))],
    "token",
    "env-token",
    "environment should override file"
)]
#[case::cli_overrides_environment(
    vec![("environment", json!({"pr_url": "env-url"})), ("cli", json!({"pr_url": "cli-url"}))],
    "pr_url",
    "cli-url",
    "CLI should override environment"
)]
fn test_layer_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] field: &str,
    #[case] expected: &str,
    #[case] message: &str,
) {
    let mut composer = MergeComposer::new();

    for (layer_type, value) in layers {
        apply_layer(&mut composer, layer_type, value);
    }

    let config = PerchConfig::merge_from_layers(composer.layers()).expect("merge should succeed");

    let actual = match field {
        "pr_url" => config.pr_url.as_deref(),
        "token" => config.token.as_deref(),
        _ => panic!("unknown field: {field}"),
    };

    assert_eq!(actual, Some(expected), "{message}");
}

#[rstest]
fn defaults_are_none_when_no_sources_provided() {
    let mut composer = MergeComposer::new();
    composer.push_defaults(json!({"pr_url": null, "token": null}));

    let config = PerchConfig::merge_from_layers(composer.layers())
        .expect("merge should succeed with empty defaults");

    assert!(config.pr_url.is_none(), "pr_url should be None");
    assert!(config.token.is_none(), "token should be None");
}

#[rstest]
fn full_precedence_chain() {
    let mut composer = MergeComposer::new();
    composer.push_defaults(json!({"pr_url": "default", "token": "default-token"}));
    composer.push_file(json!({"pr_url": "file", "token": "file-token"}), None);
    composer.push_environment(json!({"pr_url": "env"}));
    composer.push_cli(json!({"pr_url": "cli"}));

    let config = PerchConfig::merge_from_layers(composer.layers()).expect("merge should succeed");

    assert_eq!(config.pr_url.as_deref(), Some("cli"), "CLI wins for pr_url");
    assert_eq!(
        config.token.as_deref(),
        Some("file-token"),
        "file wins for token (no env/cli override)"
    );
}

#[rstest]
fn nitpick_markers_merge_from_file_layer() {
    let mut composer = MergeComposer::new();
    composer.push_file(json!({"nitpick_markers": ["style:", "polish"]}), None);

    let config = PerchConfig::merge_from_layers(composer.layers()).expect("merge should succeed");

    assert_eq!(
        config.resolve_nitpick_markers(),
        vec!["style:".to_owned(), "polish".to_owned()],
        "configured markers should replace the defaults"
    );
}

#[rstest]
fn unset_nitpick_markers_fall_back_to_defaults() {
    let config = PerchConfig::default();

    let expected: Vec<String> = DEFAULT_NITPICK_MARKERS
        .iter()
        .map(|marker| (*marker).to_owned())
        .collect();
    assert_eq!(config.resolve_nitpick_markers(), expected);
}

#[rstest]
fn empty_nitpick_markers_disable_classification() {
    let config = PerchConfig {
        nitpick_markers: Some(Vec::new()),
        ..Default::default()
    };

    assert!(
        config.resolve_nitpick_markers().is_empty(),
        "an explicit empty list should not fall back to defaults"
    );
}

#[rstest]
#[case::pr_url(
    PerchConfig { pr_url: Some("https://github.com/owner/repo/pull/1".to_owned()), ..Default::default() },
    "https://github.com/owner/repo/pull/1",
    false
)]
#[case::token(
    PerchConfig { token: Some("my-token".to_owned()), ..Default::default() },
    "my-token",
    true
)]
fn returns_value_when_field_present(
    #[case] config: PerchConfig,
    #[case] expected: &str,
    #[case] is_token: bool,
) {
    if is_token {
        let result = config.resolve_token();
        assert_eq!(
            result.ok(),
            Some(expected.to_owned()),
            "should return the token"
        );
    } else {
        let result = config.require_pr_url();
        assert_eq!(result.ok(), Some(expected), "should return the URL");
    }
}

#[rstest]
#[case::pr_url(false)]
#[case::token(true)]
fn returns_error_when_field_none(#[case] is_token: bool) {
    let config = PerchConfig::default();

    if is_token {
        // Lock and clear GITHUB_TOKEN to ensure test isolation
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
        let result = config.resolve_token();
        assert!(result.is_err(), "should return error when token is None");
    } else {
        let result = config.require_pr_url();
        assert!(result.is_err(), "should return error when pr_url is None");
    }
}

#[rstest]
fn resolve_token_falls_back_to_github_token() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("legacy-token"))]);
    let config = PerchConfig::default();

    assert_eq!(
        config.resolve_token().ok(),
        Some("legacy-token".to_owned()),
        "GITHUB_TOKEN should back-fill an unset token"
    );
}

#[rstest]
fn operation_mode_detail_when_pr_url_present() {
    let config = PerchConfig {
        pr_url: Some("https://github.com/owner/repo/pull/1".to_owned()),
        ..Default::default()
    };

    assert_eq!(
        config.operation_mode(),
        OperationMode::PullRequestDetail,
        "should be PullRequestDetail when pr_url is set"
    );
}

#[rstest]
fn operation_mode_worklist_when_owner_and_repo_present() {
    let config = PerchConfig {
        owner: Some("octocat".to_owned()),
        repo: Some("hello-world".to_owned()),
        ..Default::default()
    };

    assert_eq!(
        config.operation_mode(),
        OperationMode::RepositoryWorklist,
        "should be RepositoryWorklist when owner and repo are set"
    );
}

#[rstest]
fn operation_mode_unconfigured_when_no_fields_set() {
    let config = PerchConfig::default();

    assert_eq!(
        config.operation_mode(),
        OperationMode::Unconfigured,
        "should be Unconfigured when no fields are set"
    );
}

#[rstest]
fn migrate_db_takes_precedence_over_other_modes() {
    let config = PerchConfig {
        migrate_db: true,
        pr_url: Some("https://github.com/owner/repo/pull/1".to_owned()),
        owner: Some("octocat".to_owned()),
        repo: Some("hello-world".to_owned()),
        ..Default::default()
    };

    assert_eq!(
        config.operation_mode(),
        OperationMode::MigrateDatabase,
        "migrate_db should win over pr_url and owner/repo"
    );
}

#[rstest]
fn pr_url_takes_precedence_over_owner_repo() {
    let config = PerchConfig {
        pr_url: Some("https://github.com/owner/repo/pull/1".to_owned()),
        owner: Some("octocat".to_owned()),
        repo: Some("hello-world".to_owned()),
        ..Default::default()
    };

    assert_eq!(
        config.operation_mode(),
        OperationMode::PullRequestDetail,
        "pr_url should take precedence over owner/repo"
    );
}

#[rstest]
fn require_repository_info_returns_error_when_owner_missing() {
    let config = PerchConfig {
        repo: Some("hello-world".to_owned()),
        ..Default::default()
    };

    let result = config.require_repository_info();
    assert!(result.is_err(), "should return error when owner is missing");
}

#[rstest]
fn require_repository_info_returns_error_when_repo_missing() {
    let config = PerchConfig {
        owner: Some("octocat".to_owned()),
        ..Default::default()
    };

    let result = config.require_repository_info();
    assert!(result.is_err(), "should return error when repo is missing");
}

#[rstest]
fn require_repository_info_returns_values_when_present() {
    let config = PerchConfig {
        owner: Some("octocat".to_owned()),
        repo: Some("hello-world".to_owned()),
        ..Default::default()
    };

    let result = config.require_repository_info();
    assert_eq!(
        result.ok(),
        Some(("octocat", "hello-world")),
        "should return owner and repo"
    );
}

#[rstest]
fn write_identity_requires_token_and_username() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);

    let unconfigured = PerchConfig::default();
    assert_eq!(
        unconfigured.write_identity(),
        None,
        "no token and no username leaves writes unconfigured"
    );

    let token_only = PerchConfig {
        token: Some("my-token".to_owned()),
        ..Default::default()
    };
    assert_eq!(
        token_only.write_identity(),
        None,
        "a token without a username leaves writes unconfigured"
    );

    let username_only = PerchConfig {
        username: Some("octocat".to_owned()),
        ..Default::default()
    };
    assert_eq!(
        username_only.write_identity(),
        None,
        "a username without a token leaves writes unconfigured"
    );

    let configured = PerchConfig {
        token: Some("my-token".to_owned()),
        username: Some("octocat".to_owned()),
        ..Default::default()
    };
    let identity = configured
        .write_identity()
        .expect("token plus username should configure writes");
    assert_eq!(identity.username, "octocat");
}

#[rstest]
fn write_identity_accepts_the_legacy_token_source() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("legacy-token"))]);

    let config = PerchConfig {
        username: Some("octocat".to_owned()),
        ..Default::default()
    };

    let identity = config
        .write_identity()
        .expect("GITHUB_TOKEN should satisfy the token requirement");
    assert_eq!(identity.username, "octocat");
}
