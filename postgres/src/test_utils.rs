use sqlx::{Connection, Executor, PgConnection, PgPool};

use crate::options::PgDatabaseOptions;

/// Creates a new PostgreSQL database and returns a connection pool to it.
///
/// Connects to the server with the provided options, creates the named
/// database and returns a [`PgPool`] connected to it. Panics if the
/// connection or the creation fails.
pub async fn create_pg_database(options: &PgDatabaseOptions) -> PgPool {
    let mut connection = PgConnection::connect_with(&options.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, options.name))
        .await
        .expect("Failed to create database");

    PgPool::connect_with(options.with_db())
        .await
        .expect("Failed to connect to Postgres")
}

/// Forcefully terminates every backend attached to `database_name`, except
/// the calling one.
///
/// Leftover connections would otherwise block both `DROP DATABASE` and the
/// schema rebuild performed between tests.
pub async fn terminate_db_connections<'a, E>(executor: E, database_name: &str)
where
    E: Executor<'a, Database = sqlx::Postgres>,
{
    executor
        .execute(&*format!(
            r#"
            SELECT pg_terminate_backend(pg_stat_activity.pid)
            FROM pg_stat_activity
            WHERE pg_stat_activity.datname = '{database_name}'
            AND pid <> pg_backend_pid();"#,
        ))
        .await
        .expect("Failed to terminate database connections");
}

/// Drops a PostgreSQL database, terminating its connections first.
///
/// Useful for cleaning up the throwaway databases created by tests. Panics if
/// any operation fails.
pub async fn drop_pg_database(options: &PgDatabaseOptions) {
    // Administrative statements must run outside the target database.
    let mut connection = PgConnection::connect_with(&options.without_db())
        .await
        .expect("Failed to connect to Postgres");

    terminate_db_connections(&mut connection, &options.name).await;

    connection
        .execute(&*format!(r#"DROP DATABASE IF EXISTS "{}";"#, options.name))
        .await
        .expect("Failed to drop database");
}
