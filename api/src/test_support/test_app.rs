use std::io;
use std::net::TcpListener;

use reqwest::{IntoUrl, RequestBuilder};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::runtime::Handle;
use uuid::Uuid;

use postgres::options::PgDatabaseOptions;
use postgres::test_utils::drop_pg_database;

use crate::configuration::{get_settings, Settings};
use crate::routes::USER_HEADER;
use crate::startup::{run, TEST_DATABASE_PREFIX};
use crate::test_support::database::create_catalog_database;
use crate::test_support::forms::{submit_fields, Form, SubmitValue, MULTIPART};

#[derive(Serialize)]
pub struct CreateDatasetRequest {
    pub name: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Serialize)]
pub struct UpdateDatasetRequest {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct DatasetResponse {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub owner: String,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct DatasetsResponse {
    pub datasets: Vec<DatasetResponse>,
}

#[derive(Serialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub sysadmin: bool,
}

#[derive(Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub sysadmin: bool,
}

/// A running instance of the api with its own throwaway database.
///
/// Issues requests against the server's middleware stack over a loopback
/// socket; dropping it stops the server and drops the database.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub api_key: String,
    pool: PgPool,
    db_options: PgDatabaseOptions,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        // First, abort the server task to ensure it's terminated.
        self.server_handle.abort();

        // To use `block_in_place,` we need a multithreaded runtime since when a blocking
        // task is issued, the runtime will offload existing tasks to another worker.
        tokio::task::block_in_place(move || {
            Handle::current().block_on(async move { drop_pg_database(&self.db_options).await });
        });
    }
}

impl TestApp {
    /// The pool connected to this app's database, for direct fixture setup
    /// and for the action/auth helpers.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn get_authenticated<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.api_client.get(url).bearer_auth(self.api_key.clone())
    }

    fn post_authenticated<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.api_client.post(url).bearer_auth(self.api_key.clone())
    }

    fn delete_authenticated<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.api_client
            .delete(url)
            .bearer_auth(self.api_key.clone())
    }

    fn with_user(builder: RequestBuilder, user: Option<&str>) -> RequestBuilder {
        match user {
            Some(user) => builder.header(USER_HEADER, user),
            None => builder,
        }
    }

    pub async fn create_dataset(
        &self,
        user: Option<&str>,
        dataset: &CreateDatasetRequest,
    ) -> reqwest::Response {
        Self::with_user(
            self.post_authenticated(format!("{}/v1/datasets", &self.address)),
            user,
        )
        .json(dataset)
        .send()
        .await
        .expect("Failed to execute request.")
    }

    pub async fn read_dataset(&self, dataset_id: i64) -> reqwest::Response {
        self.get_authenticated(format!("{}/v1/datasets/{dataset_id}", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn update_dataset(
        &self,
        user: Option<&str>,
        dataset_id: i64,
        dataset: &UpdateDatasetRequest,
    ) -> reqwest::Response {
        Self::with_user(
            self.post_authenticated(format!("{}/v1/datasets/{dataset_id}", &self.address)),
            user,
        )
        .json(dataset)
        .send()
        .await
        .expect("failed to execute request")
    }

    pub async fn delete_dataset(&self, user: Option<&str>, dataset_id: i64) -> reqwest::Response {
        Self::with_user(
            self.delete_authenticated(format!("{}/v1/datasets/{dataset_id}", &self.address)),
            user,
        )
        .send()
        .await
        .expect("Failed to execute request.")
    }

    pub async fn read_all_datasets(&self) -> reqwest::Response {
        self.get_authenticated(format!("{}/v1/datasets", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn create_user(
        &self,
        user: Option<&str>,
        new_user: &CreateUserRequest,
    ) -> reqwest::Response {
        Self::with_user(
            self.post_authenticated(format!("{}/v1/users", &self.address)),
            user,
        )
        .json(new_user)
        .send()
        .await
        .expect("Failed to execute request.")
    }

    pub async fn read_user(&self, user_name: &str) -> reqwest::Response {
        self.get_authenticated(format!("{}/v1/users/{user_name}", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_dataset_edit_page(&self, dataset_id: i64) -> reqwest::Response {
        self.api_client
            .get(format!("{}/datasets/{dataset_id}/edit", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    /// Submits `form` the way a browser would, pressing the chosen button.
    ///
    /// Field collection and button selection follow [`submit_fields`]; the
    /// request then goes to the form's action with its method and encoding.
    /// `user` is sent in the caller-identity header when given.
    pub async fn submit_form(
        &self,
        form: &Form,
        submit_name: Option<&str>,
        index: Option<usize>,
        submit_value: Option<&str>,
        user: Option<&str>,
    ) -> reqwest::Response {
        let fields = submit_fields(form, submit_name, index, submit_value)
            .expect("failed to collect form fields");

        let url = format!("{}{}", &self.address, form.action);
        let request = if form.method.eq_ignore_ascii_case("get") {
            let params: Vec<(String, String)> = fields
                .into_iter()
                .filter_map(|(name, value)| match value {
                    SubmitValue::Text(text) => Some((name, text)),
                    SubmitValue::File(_) => None,
                })
                .collect();
            self.api_client.get(url).query(&params)
        } else if form.enctype == MULTIPART {
            let mut multipart = reqwest::multipart::Form::new();
            for (name, value) in fields {
                multipart = match value {
                    SubmitValue::Text(text) => multipart.text(name, text),
                    SubmitValue::File(upload) => multipart.part(
                        name,
                        reqwest::multipart::Part::bytes(upload.content)
                            .file_name(upload.filename)
                            .mime_str(&upload.content_type)
                            .expect("invalid file content type"),
                    ),
                };
            }
            self.api_client.post(url).multipart(multipart)
        } else {
            let params: Vec<(String, String)> = fields
                .into_iter()
                .filter_map(|(name, value)| match value {
                    SubmitValue::Text(text) => Some((name, text)),
                    SubmitValue::File(_) => None,
                })
                .collect();
            self.api_client.post(url).form(&params)
        };

        Self::with_user(request, user)
            .send()
            .await
            .expect("failed to execute request")
    }
}

/// Spawns a test app using the checked-in configuration.
pub async fn spawn_test_app() -> TestApp {
    let settings = get_settings::<'_, Settings>().expect("Failed to read configuration");
    spawn_test_app_with_settings(settings).await
}

/// Spawns a test app from the given settings.
///
/// The server binds an ephemeral loopback port, gets a freshly created and
/// migrated database with a random name, and always serves the current UI;
/// the legacy markup has its own rendering tests.
pub async fn spawn_test_app_with_settings(mut settings: Settings) -> TestApp {
    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    settings.application.legacy_ui = false;
    settings.database.name = format!("{TEST_DATABASE_PREFIX}{}", Uuid::new_v4().simple());

    let connection_pool = create_catalog_database(&settings.database).await;

    let server = run(
        listener,
        connection_pool.clone(),
        settings.api_key.clone(),
        settings.application.legacy_ui,
    )
    .await
    .expect("failed to bind address");

    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        api_key: settings.api_key,
        pool: connection_pool,
        db_options: settings.database,
        server_handle,
    }
}
