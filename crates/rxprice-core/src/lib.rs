pub mod app_config;
pub mod config;
pub mod settings;
pub mod types;

use thiserror::Error;

pub use app_config::{ApiEndpoints, AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use settings::{load_settings, parse_settings, PricingSettings, SettingsOverrides};
pub use types::{
    CompetitorPrice, NewPrice, Outlet, PriceOrigin, PriceSnapshot, PricingTask,
    LINK_NOT_REQUIRED, NO_CATALOG_LINK,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read settings file {path}: {source}")]
    SettingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsFileParse(#[from] serde_yaml::Error),

    #[error("invalid pricing settings: {0}")]
    Validation(String),
}
