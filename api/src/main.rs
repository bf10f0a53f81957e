use std::env;

use anyhow::anyhow;
use api::{
    configuration::{get_settings, Settings},
    startup::Application,
};
use postgres::options::PgDatabaseOptions;
use telemetry::init_tracing;
use tracing::{error, info};

#[actix_web::main]
pub async fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing()?;
    let mut args = env::args();

    if args.len() == 2 {
        let command = args.nth(1).unwrap();
        if command == "migrate" {
            let settings = get_settings::<'_, Settings>()?;
            log_database(&settings.database);
            Application::migrate_database(&settings.database).await?;
            info!("database migrated successfully");
        } else if command == "delete-test-databases" {
            // The cargo test command creates one database per test app
            // and this command deletes them all.
            let settings = get_settings::<'_, Settings>()?;
            log_database(&settings.database);
            let num_deleted = Application::delete_all_test_databases(&settings.database).await?;
            info!("{num_deleted} test databases deleted");
        } else {
            let message = "invalid command line arguments";
            error!("{message}");
            return Err(anyhow!(message));
        }
    } else if args.len() == 1 {
        let settings = get_settings::<'_, Settings>()?;
        log_database(&settings.database);
        let application = Application::build(settings).await?;
        application.run_until_stopped().await?;
    } else {
        let message = "invalid command line arguments";
        error!("{message}");
        return Err(anyhow!(message));
    }

    Ok(())
}

fn log_database(options: &PgDatabaseOptions) {
    let PgDatabaseOptions {
        host,
        port,
        name,
        username,
        password: _,
        require_ssl,
    } = options;
    info!("database: host: {host}, port: {port}, dbname: {name}, username: {username}, require_ssl: {require_ssl}");
}
