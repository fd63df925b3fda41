use std::env;

/// Process-wide defaults for the domain config keys in spec.md §6. A
/// `restaurant` row's own columns win when present; these are the seed
/// values and the fallback when a restaurant hasn't been configured yet.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,

    pub use_recipe_based_deduction: bool,
    pub deduct_on_completion: bool,
    pub allow_partial_fulfillment: bool,
    pub auto_reverse_on_cancellation: bool,
    pub allow_negative_inventory: bool,
    pub low_stock_warning_threshold_pct: f64,
    pub max_sub_recipe_depth: i32,

    pub max_batch_size: i32,
    pub cache_ttl_seconds: i64,

    pub rebalance_interval_minutes: i64,
    pub rebalance_threshold: f64,
    pub boost_duration_seconds: i64,
    pub max_position_change: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT must be a valid port number"))?;

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let bool_env = |key: &'static str, default: bool| -> Result<bool, ConfigError> {
            match env::var(key) {
                Err(_) => Ok(default),
                Ok(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key_must_be_bool(key))),
            }
        };

        let use_recipe_based_deduction = bool_env("USE_RECIPE_BASED_DEDUCTION", true)?;
        let deduct_on_completion = bool_env("DEDUCT_ON_COMPLETION", false)?;
        let allow_partial_fulfillment = bool_env("ALLOW_PARTIAL_FULFILLMENT", true)?;
        let auto_reverse_on_cancellation = bool_env("AUTO_REVERSE_ON_CANCELLATION", true)?;
        let allow_negative_inventory = bool_env("ALLOW_NEGATIVE_INVENTORY", false)?;

        let low_stock_warning_threshold_pct: f64 = env::var("LOW_STOCK_WARNING_THRESHOLD")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("LOW_STOCK_WARNING_THRESHOLD must be a number"))?;

        let max_sub_recipe_depth: i32 = env::var("MAX_SUB_RECIPE_DEPTH")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_SUB_RECIPE_DEPTH must be a number"))?;

        let max_batch_size: i32 = env::var("MAX_BATCH_SIZE")
            .unwrap_or_else(|_| "200".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_BATCH_SIZE must be a number"))?;

        let cache_ttl_seconds: i64 = env::var("CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CACHE_TTL_SECONDS must be a number"))?;

        let rebalance_interval_minutes: i64 = env::var("REBALANCE_INTERVAL_MINUTES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REBALANCE_INTERVAL_MINUTES must be a number"))?;

        let rebalance_threshold: f64 = env::var("REBALANCE_THRESHOLD")
            .unwrap_or_else(|_| "0.3".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REBALANCE_THRESHOLD must be a number"))?;

        let boost_duration_seconds: i64 = env::var("BOOST_DURATION_SECONDS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BOOST_DURATION_SECONDS must be a number"))?;

        let max_position_change: i32 = env::var("MAX_POSITION_CHANGE")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_POSITION_CHANGE must be a number"))?;

        Ok(Self {
            database_url,
            host,
            port,
            cors_origin,
            use_recipe_based_deduction,
            deduct_on_completion,
            allow_partial_fulfillment,
            auto_reverse_on_cancellation,
            allow_negative_inventory,
            low_stock_warning_threshold_pct,
            max_sub_recipe_depth,
            max_batch_size,
            cache_ttl_seconds,
            rebalance_interval_minutes,
            rebalance_threshold,
            boost_duration_seconds,
            max_position_change,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

fn key_must_be_bool(key: &'static str) -> &'static str {
    match key {
        "USE_RECIPE_BASED_DEDUCTION" => "USE_RECIPE_BASED_DEDUCTION must be true or false",
        "DEDUCT_ON_COMPLETION" => "DEDUCT_ON_COMPLETION must be true or false",
        "ALLOW_PARTIAL_FULFILLMENT" => "ALLOW_PARTIAL_FULFILLMENT must be true or false",
        "AUTO_REVERSE_ON_CANCELLATION" => "AUTO_REVERSE_ON_CANCELLATION must be true or false",
        "ALLOW_NEGATIVE_INVENTORY" => "ALLOW_NEGATIVE_INVENTORY must be true or false",
        _ => "invalid boolean configuration value",
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
