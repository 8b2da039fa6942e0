use std::env;
use std::time::Duration;

use auth::SessionSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Minimum length of each signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CookieConfig {
    /// Set the `Secure` attribute on session cookies. Must be true behind HTTPS.
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_store_timeout_secs(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Configured origins, falling back to the local frontend when none are set.
    pub fn origins(&self) -> Vec<String> {
        if self.allowed_origins.is_empty() {
            vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
        } else {
            self.allowed_origins.clone()
        }
    }
}

fn default_issuer() -> String {
    auth::jwt::DEFAULT_ISSUER.to_string()
}

fn default_store_timeout_secs() -> u64 {
    10
}

/// Unprefixed variables with `__` between sections.
/// Example: JWT__ACCESS_SECRET=... overrides jwt.access_secret
fn environment_overrides() -> Environment {
    Environment::default()
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// # Errors
    /// * `ConfigError::Message` - Signing secrets are too short or identical
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(environment_overrides())
    }

    fn load_with(environment: Environment) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject signing secrets that are too short or shared between token kinds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, secret) in [
            ("jwt.access_secret", &self.jwt.access_secret),
            ("jwt.refresh_secret", &self.jwt.refresh_secret),
        ] {
            if secret.len() < MIN_SECRET_BYTES {
                return Err(ConfigError::Message(format!(
                    "{} must be at least {} bytes",
                    key, MIN_SECRET_BYTES
                )));
            }
        }

        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }

        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::new(&self.jwt.access_secret, &self.jwt.refresh_secret)
            .with_issuer(&self.jwt.issuer)
    }
}
