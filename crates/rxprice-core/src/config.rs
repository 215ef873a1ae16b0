use crate::app_config::{ApiEndpoints, AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let api_auth = require("RXPRICE_API_AUTH")?;
    let endpoints = ApiEndpoints {
        branches_url: require("RXPRICE_BRANCHES_URL")?,
        prices_url: require("RXPRICE_PRICES_URL")?,
        competitor_prices_url: require("RXPRICE_COMPETITOR_PRICES_URL")?,
        tasks_url: require("RXPRICE_TASKS_URL")?,
        tasks_delete_url: require("RXPRICE_TASKS_DELETE_URL")?,
    };

    let env = parse_environment(&or_default("RXPRICE_ENV", "development"))?;
    let log_level = or_default("RXPRICE_LOG_LEVEL", "info");
    let settings_path = PathBuf::from(or_default(
        "RXPRICE_SETTINGS_PATH",
        "./config/pricing.yaml",
    ));
    let save_path = PathBuf::from(or_default("RXPRICE_SAVE_PATH", "./out"));

    let request_timeout_secs = parse_u64("RXPRICE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("RXPRICE_USER_AGENT", "rxprice/0.1 (competitive-pricing)");
    let max_concurrent_fetches = parse_usize("RXPRICE_MAX_CONCURRENT_FETCHES", "4")?;
    if max_concurrent_fetches == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RXPRICE_MAX_CONCURRENT_FETCHES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let schedule_cron = or_default("RXPRICE_SCHEDULE_CRON", "0 0 */1 * * *");

    Ok(AppConfig {
        env,
        log_level,
        settings_path,
        save_path,
        api_auth,
        endpoints,
        request_timeout_secs,
        user_agent,
        max_concurrent_fetches,
        schedule_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RXPRICE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
