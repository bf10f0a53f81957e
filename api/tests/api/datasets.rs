use api::test_support::{
    call_action, spawn_test_app,
    test_app::{CreateDatasetRequest, DatasetResponse, DatasetsResponse, UpdateDatasetRequest},
    ContextParams,
};
use api::utils::generate_random_alpha_str;
use reqwest::StatusCode;
use serde_json::json;

fn new_dataset() -> CreateDatasetRequest {
    CreateDatasetRequest {
        name: generate_random_alpha_str(20),
        title: Some("Monthly Rainfall".to_string()),
        notes: Some("Rainfall by month and region".to_string()),
        tags: vec!["weather".to_string(), "monthly".to_string()],
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn dataset_can_be_created_and_read() {
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let dataset = new_dataset();
    let response = app.create_dataset(Some("annafan"), &dataset).await;

    // Assert
    assert!(response.status().is_success());
    let response: DatasetResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    assert_eq!(response.name, dataset.name);
    assert_eq!(response.owner, "annafan");

    let dataset_id = response.id;
    let response = app.read_dataset(dataset_id).await;
    assert!(response.status().is_success());
    let response: DatasetResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    assert_eq!(response.id, dataset_id);
    assert_eq!(response.title, dataset.title);
    assert_eq!(response.tags, dataset.tags);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_anonymous_caller_cant_create_a_dataset() {
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app.create_dataset(None, &new_dataset()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_non_existing_dataset_cant_be_read() {
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app.read_dataset(42).await;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_dataset_can_be_updated_by_its_owner() {
    // Arrange
    let app = spawn_test_app().await;
    let dataset = new_dataset();
    let response = app.create_dataset(Some("annafan"), &dataset).await;
    let response: DatasetResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    let dataset_id = response.id;

    // Act
    let updated = UpdateDatasetRequest {
        title: Some("Annual Rainfall".to_string()),
        notes: dataset.notes.clone(),
        tags: vec!["weather".to_string()],
    };
    let response = app
        .update_dataset(Some("annafan"), dataset_id, &updated)
        .await;

    // Assert
    assert!(response.status().is_success());
    let response = app.read_dataset(dataset_id).await;
    let response: DatasetResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    assert_eq!(response.title, updated.title);
    assert_eq!(response.tags, updated.tags);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_dataset_cant_be_updated_by_another_user() {
    // Arrange
    let app = spawn_test_app().await;
    let response = app.create_dataset(Some("annafan"), &new_dataset()).await;
    let response: DatasetResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    let dataset_id = response.id;

    // Act
    let updated = UpdateDatasetRequest {
        title: Some("Hijacked".to_string()),
        notes: None,
        tags: vec![],
    };
    let response = app
        .update_dataset(Some("frankie"), dataset_id, &updated)
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_sysadmin_can_delete_any_dataset() {
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
    let response = app.create_dataset(Some("annafan"), &new_dataset()).await;
    let response: DatasetResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    let dataset_id = response.id;

    // Act
    let response = app.delete_dataset(Some("admin"), dataset_id).await;

    // Assert
    assert!(response.status().is_success());
    let response = app.read_dataset(dataset_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_regular_user_cant_delete_a_dataset() {
    // Arrange
    let app = spawn_test_app().await;
    let response = app.create_dataset(Some("annafan"), &new_dataset()).await;
    let response: DatasetResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    let dataset_id = response.id;

    // Act
    let response = app.delete_dataset(Some("annafan"), dataset_id).await;

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn all_datasets_can_be_listed() {
    // Arrange
    let app = spawn_test_app().await;
    let first = new_dataset();
    let second = new_dataset();
    app.create_dataset(Some("annafan"), &first).await;
    app.create_dataset(Some("annafan"), &second).await;

    // Act
    let response = app.read_all_datasets().await;

    // Assert
    assert!(response.status().is_success());
    let response: DatasetsResponse = response
        .json()
        .await
        .expect("failed to deserialize response");
    assert_eq!(response.datasets.len(), 2);
    assert_eq!(response.datasets[0].name, first.name);
    assert_eq!(response.datasets[1].name, second.name);
}
