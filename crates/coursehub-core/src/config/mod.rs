//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod commerce;
pub mod database;
pub mod logging;
pub mod outbox;
pub mod payment;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::commerce::CommerceConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::outbox::OutboxConfig;
pub use self::payment::PaymentConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Payment gateway settings.
    pub payment: PaymentConfig,
    /// Pricing and group-purchase settings.
    #[serde(default)]
    pub commerce: CommerceConfig,
    /// Notification outbox relay settings.
    #[serde(default)]
    pub outbox: OutboxConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `COURSEHUB`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COURSEHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.commerce.validate()?;
        Ok(config)
    }
}
