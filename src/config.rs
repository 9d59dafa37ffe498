/// Service configuration
use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable naming the active environment.
pub const ENV_SELECTOR: &str = "APP_SETTINGS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testing,
    #[default]
    Production,
}

impl Environment {
    /// Reads `APP_SETTINGS`; unset means production.
    pub fn from_env() -> Result<Self> {
        match std::env::var(ENV_SELECTOR) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Environment::default()),
        }
    }

    /// Variable holding this environment's database URL.
    pub fn database_url_var(&self) -> &'static str {
        match self {
            Environment::Testing => "DATABASE_TEST_URL",
            Environment::Development | Environment::Production => "DATABASE_URL",
        }
    }

    fn default_database_url(&self) -> &'static str {
        match self {
            Environment::Testing => "sqlite::memory:",
            Environment::Development | Environment::Production => "sqlite://users.db",
        }
    }
}

impl FromStr for Environment {
    type Err = ApiError;

    /// Accepts `development` / `testing` / `production` in any case, and the
    /// dotted class form such as `project.config.TestingConfig`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.rsplit('.').next().unwrap_or(s).trim().to_ascii_lowercase();
        let name = name.strip_suffix("config").unwrap_or(&name);
        match name {
            "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "production" => Ok(Environment::Production),
            _ => Err(ApiError::Config(format!(
                "unknown environment {:?} (expected development, testing or production)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub testing: bool,

    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_database")]
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Settings {
    /// Load configuration for the environment named by `APP_SETTINGS`.
    pub fn load() -> Result<Self> {
        Self::load_for(Environment::from_env()?)
    }

    /// Defaults, then `config.toml` if present, then `USERS_*` variables,
    /// then the environment's own database URL variable.
    pub fn load_for(environment: Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = PathBuf::from("config.toml");
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("USERS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: Settings = settings.build()?.try_deserialize()?;
        loaded.apply_environment(environment, std::env::var(environment.database_url_var()).ok());

        Ok(loaded)
    }

    fn apply_environment(&mut self, environment: Environment, database_url: Option<String>) {
        self.environment = environment;
        self.debug = environment == Environment::Development;
        self.testing = environment == Environment::Testing;

        if let Some(url) = database_url.filter(|url| !url.is_empty()) {
            self.database.url = url;
        } else if self.database.url.is_empty() {
            self.database.url = environment.default_database_url().to_string();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(ApiError::Config(format!(
                "database URL is required (set {})",
                self.environment.database_url_var()
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ApiError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings for an isolated in-memory test database.
    pub fn for_testing() -> Self {
        let mut settings = Settings {
            environment: Environment::Testing,
            debug: false,
            testing: true,
            server: default_server(),
            database: default_database(),
        };
        settings.apply_environment(Environment::Testing, None);
        settings
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_database() -> DatabaseSettings {
    DatabaseSettings {
        url: String::new(),
        max_connections: default_max_connections(),
    }
}

fn default_max_connections() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        ENV_SELECTOR,
        "USERS_SERVER__PORT",
        "USERS_DATABASE__URL",
        "DATABASE_URL",
        "DATABASE_TEST_URL",
    ];

    /// Runs `f` with exactly `vars` set among the variables config reads.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        // Safety: every test touching these variables is #[serial].
        unsafe {
            for key in VARS {
                std::env::remove_var(key);
            }
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
        let result = f();
        unsafe {
            for key in VARS {
                std::env::remove_var(key);
            }
        }
        result
    }

    #[test]
    fn test_parse_environment_names() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("Testing".parse::<Environment>().unwrap(), Environment::Testing);
        assert_eq!(
            "project.config.ProductionConfig".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_flags_and_defaults() {
        let mut settings = Settings::for_testing();
        assert!(settings.testing);
        assert!(!settings.debug);
        assert_eq!(settings.database.url, "sqlite::memory:");

        settings.database.url.clear();
        settings.apply_environment(Environment::Development, None);
        assert!(settings.debug);
        assert!(!settings.testing);
        assert_eq!(settings.database.url, "sqlite://users.db");
    }

    #[test]
    fn test_database_variable_overrides_url() {
        let mut settings = Settings::for_testing();
        settings.apply_environment(Environment::Production, Some("sqlite://prod.db".into()));
        assert_eq!(settings.database.url, "sqlite://prod.db");
        assert_eq!(Environment::Testing.database_url_var(), "DATABASE_TEST_URL");
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::for_testing();
        assert!(settings.validate().is_ok());

        settings.database.max_connections = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_reads_prefixed_variables() {
        let settings = with_env(&[("USERS_SERVER__PORT", "8080")], || {
            Settings::load_for(Environment::Testing).unwrap()
        });
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database.url, "sqlite::memory:");
    }

    #[test]
    #[serial]
    fn test_load_prefers_environment_database_variable() {
        let settings = with_env(
            &[
                ("USERS_DATABASE__URL", "sqlite://layered.db"),
                ("DATABASE_TEST_URL", "sqlite://test.db"),
            ],
            || Settings::load_for(Environment::Testing).unwrap(),
        );
        assert_eq!(settings.database.url, "sqlite://test.db");

        let settings = with_env(&[("USERS_DATABASE__URL", "sqlite://layered.db")], || {
            Settings::load_for(Environment::Production).unwrap()
        });
        assert_eq!(settings.database.url, "sqlite://layered.db");
    }

    #[test]
    #[serial]
    fn test_load_uses_selected_environment() {
        let settings = with_env(
            &[(ENV_SELECTOR, "development"), ("DATABASE_URL", "sqlite://dev.db")],
            || Settings::load().unwrap(),
        );
        assert_eq!(settings.environment, Environment::Development);
        assert!(settings.debug);
        assert_eq!(settings.database.url, "sqlite://dev.db");

        let settings = with_env(&[], || Settings::load().unwrap());
        assert_eq!(settings.environment, Environment::Production);
    }

    #[test]
    #[serial]
    fn test_load_rejects_unknown_environment() {
        let result = with_env(&[(ENV_SELECTOR, "staging")], Settings::load);
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
