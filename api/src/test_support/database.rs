use sqlx::PgPool;

use postgres::options::PgDatabaseOptions;
use postgres::test_utils::{create_pg_database, terminate_db_connections};

use crate::MIGRATOR;

/// Creates and migrates a new catalog database.
///
/// Like [`create_pg_database`], but additionally runs all migrations after
/// creation. Returns a [`PgPool`] connected to the newly created database.
/// Panics if creation or migration fails.
pub async fn create_catalog_database(options: &PgDatabaseOptions) -> PgPool {
    let connection_pool = create_pg_database(options).await;

    MIGRATOR
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

/// Resets the catalog database to a clean, migrated state.
///
/// Tests that touch the database should call this in their setup so nothing
/// is left over from other tests or earlier runs. Any connections left open
/// by a previous test are terminated first, otherwise they would block the
/// schema rebuild. Destructive: every persisted record is gone afterwards.
/// Calling it repeatedly is safe and always ends in the same empty state.
pub async fn reset_database(pool: &PgPool) {
    let database_name: String = sqlx::query_scalar("select current_database()")
        .fetch_one(pool)
        .await
        .expect("Failed to read current database name");

    terminate_db_connections(pool, &database_name).await;

    sqlx::query("drop schema if exists public cascade")
        .execute(pool)
        .await
        .expect("Failed to drop schema");
    sqlx::query("create schema public")
        .execute(pool)
        .await
        .expect("Failed to recreate schema");

    MIGRATOR
        .run(pool)
        .await
        .expect("Failed to migrate the database");
}
