use crate::app_config::{AppConfig, Environment};
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
/// Parsing and validation are decoupled from the process environment so they
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid(var, format!("{raw} is not a finite number")))
        }
    };

    let parse_positive_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = parse_f64(var, default)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(invalid(var, format!("{value} must be greater than zero")))
        }
    };

    let parse_page_size = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let value = parse_u32(var, default)?;
        if value == 0 {
            return Err(invalid(var, "page size must be at least 1".to_string()));
        }
        Ok(value)
    };

    let api_base_url = require("LOOCATOR_API_BASE_URL")?;
    let env = parse_environment(&or_default("LOOCATOR_ENV", "development"))?;
    let log_level = or_default("LOOCATOR_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("LOOCATOR_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("LOOCATOR_USER_AGENT", "loocator/0.1 (map-discovery)");

    let map_debounce_ms = parse_u64("LOOCATOR_MAP_DEBOUNCE_MS", "350")?;
    let list_debounce_ms = parse_u64("LOOCATOR_LIST_DEBOUNCE_MS", "0")?;
    let refetch_min_distance_m = parse_positive_f64("LOOCATOR_REFETCH_MIN_DISTANCE_M", "300")?;
    let refetch_delta_ratio = parse_positive_f64("LOOCATOR_REFETCH_DELTA_RATIO", "0.25")?;

    let list_per_page = parse_page_size("LOOCATOR_LIST_PER_PAGE", "20")?;
    let marker_per_page = parse_page_size("LOOCATOR_MARKER_PER_PAGE", "500")?;
    let nearby_radius_km = parse_positive_f64("LOOCATOR_NEARBY_RADIUS_KM", "5")?;

    let default_center_lat = parse_f64("LOOCATOR_DEFAULT_CENTER_LAT", "36.7538")?;
    let default_center_lng = parse_f64("LOOCATOR_DEFAULT_CENTER_LNG", "3.0588")?;
    let default_radius_km = parse_positive_f64("LOOCATOR_DEFAULT_RADIUS_KM", "30")?;

    Ok(AppConfig {
        env,
        api_base_url,
        log_level,
        request_timeout_secs,
        user_agent,
        map_debounce_ms,
        list_debounce_ms,
        refetch_min_distance_m,
        refetch_delta_ratio,
        list_per_page,
        marker_per_page,
        nearby_radius_km,
        default_center_lat,
        default_center_lng,
        default_radius_km,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOOCATOR_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
