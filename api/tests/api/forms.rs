use api::test_support::{
    call_action, spawn_test_app, ContextParams, FieldValue, Form, TestApp,
};
use api::utils::generate_random_alpha_str;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_dataset(app: &TestApp, owner: &str) -> Value {
    call_action(
        app.pool(),
        "dataset_create",
        ContextParams {
            user: Some(owner.to_string()),
            ignore_auth: None,
        },
        json!({
            "name": generate_random_alpha_str(20),
            "title": "Monthly Rainfall",
            "tags": ["weather"],
        }),
    )
    .await
    .expect("failed to create dataset")
}

/// The edit form as rendered by `GET /datasets/{id}/edit`.
fn edit_form(dataset_id: i64) -> Form {
    Form::new(format!("/datasets/{dataset_id}/edit"), "post")
        .field("title", FieldValue::Text(Some("Annual Rainfall".into())))
        .field("notes", FieldValue::Text(Some("Updated notes".into())))
        .field(
            "tags",
            FieldValue::Multi(vec!["weather".into(), "annual".into()]),
        )
        .field("save", FieldValue::Submit("finish".into()))
        .field("save", FieldValue::Submit("delete".into()))
}

#[tokio::test(flavor = "multi_thread")]
async fn the_edit_page_renders_the_form() {
    // Arrange
    let app = spawn_test_app().await;
    let dataset = create_dataset(&app, "annafan").await;
    let dataset_id = dataset["id"].as_i64().unwrap();

    // Act
    let response = app.read_dataset_edit_page(dataset_id).await;

    // Assert
    assert!(response.status().is_success());
    let body = response.text().await.expect("failed to read body");
    assert!(body.contains("Monthly Rainfall"));
    assert_eq!(body.matches(r#"name="save""#).count(), 2);
    // The test app always serves the current UI, never the legacy table
    // markup.
    assert!(body.contains("<button"));
    assert!(!body.contains("<table>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn submitting_with_the_save_button_updates_the_dataset() {
    // Arrange
    let app = spawn_test_app().await;
    let dataset = create_dataset(&app, "annafan").await;
    let dataset_id = dataset["id"].as_i64().unwrap();

    // Act
    let form = edit_form(dataset_id);
    let response = app
        .submit_form(&form, Some("save"), None, Some("finish"), Some("annafan"))
        .await;

    // Assert
    assert!(response.status().is_success());
    let updated = call_action(
        app.pool(),
        "dataset_show",
        ContextParams::default(),
        json!({"id": dataset_id}),
    )
    .await
    .expect("failed to read dataset");
    assert_eq!(updated["title"], "Annual Rainfall");
    assert_eq!(updated["tags"], json!(["weather", "annual"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn submitting_with_the_delete_button_deletes_the_dataset() {
    // Arrange
    let app = spawn_test_app().await;
    call_action(
        app.pool(),
        "user_create",
        ContextParams::default(),
        json!({"name": "admin", "email": "admin@example.com", "sysadmin": true}),
    )
    .await
    .expect("failed to create sysadmin");
    let dataset = create_dataset(&app, "annafan").await;
    let dataset_id = dataset["id"].as_i64().unwrap();

    // Act
    // The delete button is the second field named `save`.
    let form = edit_form(dataset_id);
    let response = app
        .submit_form(&form, Some("save"), Some(1), None, Some("admin"))
        .await;

    // Assert
    assert!(response.status().is_success());
    let response = app.read_dataset(dataset_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn submitting_without_selecting_a_button_presses_the_first_one() {
    // Arrange
    let app = spawn_test_app().await;
    let dataset = create_dataset(&app, "annafan").await;
    let dataset_id = dataset["id"].as_i64().unwrap();

    // Act
    let form = edit_form(dataset_id);
    let response = app
        .submit_form(&form, Some("save"), None, None, Some("annafan"))
        .await;

    // Assert
    // The first button saves, so the dataset still exists, updated.
    assert!(response.status().is_success());
    let response = app.read_dataset(dataset_id).await;
    assert!(response.status().is_success());
}
