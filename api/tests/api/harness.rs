use api::configuration::{get_settings, shared, Settings};
use api::test_support::{call_action, reset_database, ContextParams, FunctionalTestHarness};
use api::utils::generate_random_alpha_str;
use serde_json::json;

#[tokio::test(flavor = "multi_thread")]
async fn the_database_is_clean_after_a_reset() {
    // Arrange
    let settings = shared(get_settings::<Settings>().expect("Failed to read configuration"));
    let harness = FunctionalTestHarness::start(&settings, |_| {}).await;
    call_action(
        harness.app.pool(),
        "dataset_create",
        ContextParams::default(),
        json!({"name": generate_random_alpha_str(20)}),
    )
    .await
    .expect("failed to create dataset");

    // Act
    harness.reset_database().await;

    // Assert
    let listed = call_action(
        harness.app.pool(),
        "dataset_list",
        ContextParams::default(),
        json!({}),
    )
    .await
    .expect("failed to list datasets");
    assert_eq!(listed["datasets"], json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn resetting_repeatedly_is_harmless() {
    // Arrange
    let settings = shared(get_settings::<Settings>().expect("Failed to read configuration"));
    let harness = FunctionalTestHarness::start(&settings, |_| {}).await;

    // Act
    reset_database(harness.app.pool()).await;
    reset_database(harness.app.pool()).await;

    // Assert
    call_action(
        harness.app.pool(),
        "dataset_create",
        ContextParams::default(),
        json!({"name": generate_random_alpha_str(20)}),
    )
    .await
    .expect("the rebuilt schema should accept new records");
}

#[tokio::test(flavor = "multi_thread")]
async fn settings_changes_do_not_leak_out_of_a_lifecycle() {
    // Arrange
    let settings = shared(get_settings::<Settings>().expect("Failed to read configuration"));
    let before = settings.read().unwrap().clone();

    // Act
    {
        let _harness = FunctionalTestHarness::start(&settings, |settings| {
            settings.application.legacy_ui = true;
            settings.api_key = "patched-for-this-class".to_string();
        })
        .await;
        assert_ne!(*settings.read().unwrap(), before);
    }

    // Assert
    assert_eq!(*settings.read().unwrap(), before);
}

#[tokio::test(flavor = "multi_thread")]
async fn the_harness_app_uses_the_patched_settings() {
    // Arrange
    let settings = shared(get_settings::<Settings>().expect("Failed to read configuration"));

    // Act
    let harness = FunctionalTestHarness::start(&settings, |settings| {
        settings.api_key = "patched-for-this-class".to_string();
    })
    .await;

    // Assert
    assert_eq!(harness.app.api_key, "patched-for-this-class");
    let response = harness
        .app
        .api_client
        .get(format!("{}/v1/datasets", harness.app.address))
        .bearer_auth("patched-for-this-class")
        .send()
        .await
        .expect("failed to execute request");
    assert!(response.status().is_success());
}
