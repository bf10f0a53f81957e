use std::fmt::{self, Display};
use std::sync::{Arc, RwLock};

use postgres::options::PgDatabaseOptions;

/// Top-level settings for the catalog api.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Settings {
    pub database: PgDatabaseOptions,
    pub application: ApplicationSettings,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ApplicationSettings {
    /// host the api listens on
    pub host: String,

    /// port the api listens on
    pub port: u16,

    /// serve the dataset edit page with the old markup
    pub legacy_ui: bool,
}

impl Display for ApplicationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    host: {}", self.host)?;
        writeln!(f, "    port: {}", self.port)?;
        writeln!(f, "    legacy_ui: {}", self.legacy_ui)
    }
}

/// Settings shared by reference between a test harness and the code it runs.
///
/// Test lifecycles snapshot the settings on entry and restore them on exit,
/// so one test class cannot leak configuration changes into the next.
pub type SharedSettings = Arc<RwLock<Settings>>;

pub fn shared(settings: Settings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}

/// Loads settings from the layered YAML configuration.
///
/// Reads `configuration/base.yaml`, then the environment-specific file
/// selected by `APP_ENVIRONMENT` (default `dev`), then `APP_*` environment
/// variables with `__` as the nesting separator. E.g.
/// `APP_DATABASE__PORT=5433` sets `Settings { database: { port } }`.
pub fn get_settings<'a, T: serde::Deserialize<'a>>() -> Result<T, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `dev` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| DEV_ENV_NAME.into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");

    let environment_filename = format!("{}.yaml", environment.as_str());
    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<T>()
}

pub const DEV_ENV_NAME: &str = "dev";
pub const PROD_ENV_NAME: &str = "prod";

/// The possible runtime environment for our application.
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => DEV_ENV_NAME,
            Environment::Prod => PROD_ENV_NAME,
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(format!(
                "{other} is not a supported environment. Use either `{DEV_ENV_NAME}` or `{PROD_ENV_NAME}`.",
            )),
        }
    }
}
