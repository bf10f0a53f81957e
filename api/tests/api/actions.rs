use api::logic::{Context, LogicError};
use api::test_support::{call_action, call_auth, spawn_test_app, ContextParams};
use api::utils::generate_random_alpha_str;
use serde_json::json;

#[tokio::test(flavor = "multi_thread")]
async fn call_action_skips_authorization_by_default() {
    // Arrange
    let app = spawn_test_app().await;

    // Act
    // An anonymous dataset_create is denied over HTTP, but the helper's
    // default context bypasses the check.
    let result = call_action(
        app.pool(),
        "dataset_create",
        ContextParams::default(),
        json!({"name": generate_random_alpha_str(20), "title": "Rainfall"}),
    )
    .await;

    // Assert
    let dataset = result.expect("action failed");
    assert_eq!(dataset["title"], "Rainfall");
    // The default context runs as the anonymous local user.
    assert_eq!(dataset["owner"], "127.0.0.1");
}

#[tokio::test(flavor = "multi_thread")]
async fn call_action_preserves_caller_supplied_context() {
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let result = call_action(
        app.pool(),
        "dataset_create",
        ContextParams {
            user: Some("annafan".to_string()),
            ignore_auth: None,
        },
        json!({"name": generate_random_alpha_str(20)}),
    )
    .await;

    // Assert
    let dataset = result.expect("action failed");
    assert_eq!(dataset["owner"], "annafan");
}

#[tokio::test(flavor = "multi_thread")]
async fn call_action_can_enforce_authorization_on_request() {
    // Arrange
    let app = spawn_test_app().await;
    let dataset = call_action(
        app.pool(),
        "dataset_create",
        ContextParams::default(),
        json!({"name": generate_random_alpha_str(20)}),
    )
    .await
    .expect("failed to create dataset");

    // Act
    // The anonymous local user is not a sysadmin, so an enforced delete is
    // denied.
    let result = call_action(
        app.pool(),
        "dataset_delete",
        ContextParams {
            user: None,
            ignore_auth: Some(false),
        },
        json!({"id": dataset["id"]}),
    )
    .await;

    // Assert
    assert!(matches!(result, Err(LogicError::NotAuthorized(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn call_auth_reports_the_owners_access() {
    // Arrange
    let app = spawn_test_app().await;
    let dataset = call_action(
        app.pool(),
        "dataset_create",
        ContextParams {
            user: Some("annafan".to_string()),
            ignore_auth: None,
        },
        json!({"name": generate_random_alpha_str(20)}),
    )
    .await
    .expect("failed to create dataset");

    // Act
    let context = Context::new(app.pool().clone(), Some("annafan".to_string()));
    let verdict = call_auth("dataset_update", &context, json!({"id": dataset["id"]}))
        .await
        .expect("auth function failed");

    // Assert
    assert!(verdict.success);
}

#[tokio::test(flavor = "multi_thread")]
async fn call_auth_reports_a_strangers_denial() {
    // Arrange
    let app = spawn_test_app().await;
    let dataset = call_action(
        app.pool(),
        "dataset_create",
        ContextParams {
            user: Some("annafan".to_string()),
            ignore_auth: None,
        },
        json!({"name": generate_random_alpha_str(20)}),
    )
    .await
    .expect("failed to create dataset");

    // Act
    let context = Context::new(app.pool().clone(), Some("frankie".to_string()));
    let verdict = call_auth("dataset_update", &context, json!({"id": dataset["id"]}))
        .await
        .expect("auth function failed");

    // Assert
    assert!(!verdict.success);
    assert!(verdict.msg.is_some());
}
