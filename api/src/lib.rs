pub mod authentication;
pub mod configuration;
pub mod db;
pub mod logic;
pub mod routes;
pub mod startup;
pub mod test_support;
pub mod utils;

/// Migrations embedded from `./migrations`, shared by the application and the
/// test-support database rebuild.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
