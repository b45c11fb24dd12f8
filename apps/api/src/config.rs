use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use anyhow::{ensure, Context, Result};

const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_USDA_API_URL: &str = "https://api.nal.usda.gov/fdc/v1";
/// Nutrition data barely changes; ten years is already far longer than useful.
const CACHE_TTL_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a numeric one is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub usda_api_key: String,
    pub usda_api_url: String,
    /// When unset, nutrition lookups are cached in process memory only.
    pub redis_url: Option<String>,
    pub recipe_csv_path: String,
    pub nutrition_cache_ttl_days: i64,
    pub nutrition_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    pub lookup_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: env_or("ANTHROPIC_API_URL", DEFAULT_ANTHROPIC_API_URL),
            usda_api_key: env_or("USDA_API_KEY", "DEMO_KEY"),
            usda_api_url: env_or("USDA_API_URL", DEFAULT_USDA_API_URL),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            recipe_csv_path: env_or("RECIPE_CSV_PATH", "data/recipes.csv"),
            nutrition_cache_ttl_days: parse_env_in_range(
                "NUTRITION_CACHE_TTL_DAYS",
                30,
                CACHE_TTL_DAYS_RANGE,
            )?,
            nutrition_timeout_secs: parse_env("NUTRITION_TIMEOUT_SECS", 10)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            lookup_concurrency: parse_env::<usize>("LOOKUP_CONCURRENCY", 4)?.max(1),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_env_in_range<T>(key: &str, default: T, range: RangeInclusive<T>) -> Result<T>
where
    T: FromStr + PartialOrd + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse_env(key, default)?;
    ensure!(
        range.contains(&value),
        "{key} must be between {} and {}, got {value}",
        range.start(),
        range.end()
    );
    Ok(value)
}
