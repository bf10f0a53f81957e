use std::net::TcpListener;

use actix_web::{dev::Server, web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use sqlx::{postgres::PgPoolOptions, Connection, Executor, PgConnection, PgPool, Row};
use tracing_actix_web::TracingLogger;

use crate::{
    authentication::auth_validator,
    configuration::Settings,
    routes::{
        datasets::{
            create_dataset, delete_dataset, edit_dataset_page, edit_dataset_submit,
            read_all_datasets, read_dataset, update_dataset,
        },
        health_check::health_check,
        users::{create_user, read_user},
    },
    MIGRATOR,
};
use postgres::options::PgDatabaseOptions;

/// Prefix of the throwaway databases created by the test harness.
pub const TEST_DATABASE_PREFIX: &str = "catalog_test_";

/// Settings the HTML pages need at render time.
#[derive(Clone)]
pub struct UiSettings {
    pub legacy: bool,
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&settings.database);

        let address = format!("{}:{}", settings.application.host, settings.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            connection_pool,
            settings.api_key,
            settings.application.legacy_ui,
        )
        .await?;

        Ok(Self { port, server })
    }

    pub async fn migrate_database(options: &PgDatabaseOptions) -> Result<(), anyhow::Error> {
        let connection_pool = get_connection_pool(options);

        MIGRATOR.run(&connection_pool).await?;

        Ok(())
    }

    /// Drops every leftover test database.
    ///
    /// `cargo test` creates one database per spawned test app; aborted runs
    /// can leave them behind.
    pub async fn delete_all_test_databases(
        options: &PgDatabaseOptions,
    ) -> Result<usize, anyhow::Error> {
        let mut connection = PgConnection::connect_with(&options.without_db()).await?;

        let rows = sqlx::query("select datname from pg_database where datname like $1")
            .bind(format!("{TEST_DATABASE_PREFIX}%"))
            .fetch_all(&mut connection)
            .await?;

        let mut num_deleted = 0;
        for row in &rows {
            let name: String = row.try_get("datname")?;
            postgres::test_utils::terminate_db_connections(&mut connection, &name).await;
            connection
                .execute(&*format!(r#"DROP DATABASE IF EXISTS "{name}";"#))
                .await?;
            num_deleted += 1;
        }

        Ok(num_deleted)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(options: &PgDatabaseOptions) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(options.with_db())
}

pub async fn run(
    listener: TcpListener,
    connection_pool: PgPool,
    api_key: String,
    legacy_ui: bool,
) -> Result<Server, anyhow::Error> {
    let connection_pool = web::Data::new(connection_pool);
    let api_key = web::Data::new(api_key);
    let ui_settings = web::Data::new(UiSettings { legacy: legacy_ui });

    let server = HttpServer::new(move || {
        let authentication = HttpAuthentication::bearer(auth_validator);
        App::new()
            .wrap(TracingLogger::default())
            .service(health_check)
            // The HTML pages live outside the bearer-authenticated scope.
            .service(edit_dataset_page)
            .service(edit_dataset_submit)
            .service(
                web::scope("v1")
                    .wrap(authentication)
                    //datasets
                    .service(create_dataset)
                    .service(read_dataset)
                    .service(update_dataset)
                    .service(delete_dataset)
                    .service(read_all_datasets)
                    //users
                    .service(create_user)
                    .service(read_user),
            )
            .app_data(connection_pool.clone())
            .app_data(api_key.clone())
            .app_data(ui_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
