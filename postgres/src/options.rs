use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Connection parameters for a PostgreSQL database.
///
/// Covers network location, authentication credentials and security settings.
/// The password is wrapped in [`Secret`] so it never ends up in debug output.
#[derive(Debug, Clone, Deserialize)]
pub struct PgDatabaseOptions {
    /// Host name or IP address of the PostgreSQL server
    pub host: String,
    /// Port the PostgreSQL server listens on
    pub port: u16,
    /// Name of the target database
    pub name: String,
    /// Username for authentication
    pub username: String,
    /// Optional password for authentication
    pub password: Option<Secret<String>>,
    /// If true, requires SSL/TLS encryption for the connection
    pub require_ssl: bool,
}

impl PgDatabaseOptions {
    /// Connection options for the server without selecting a database.
    ///
    /// Needed for administrative statements that must run outside the target
    /// database, like `CREATE DATABASE` and `DROP DATABASE`.
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .ssl_mode(ssl_mode);

        if let Some(password) = &self.password {
            options.password(password.expose_secret())
        } else {
            options
        }
    }

    /// Connection options for the target database.
    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.name)
    }
}

impl PartialEq for PgDatabaseOptions {
    fn eq(&self, other: &Self) -> bool {
        let passwords_match = match (&self.password, &other.password) {
            (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
            (None, None) => true,
            _ => false,
        };
        self.host == other.host
            && self.port == other.port
            && self.name == other.name
            && self.username == other.username
            && self.require_ssl == other.require_ssl
            && passwords_match
    }
}
