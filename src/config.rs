use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Organization / team metadata cache
    pub meta_cache_ttl_secs: u64,
    pub meta_cache_capacity: u64,

    pub engine: EngineConfig,
}

/// Canonical constants of the calculation engine.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Longest range a caller may request, in days.
    pub max_range_days: u32,
    /// Credit for a late-but-present day.
    pub partial_credit: f64,
    pub late_grace_minutes: u32,
    pub readiness_weight: f64,
    pub compliance_weight: f64,
    /// Calendar days before `as_of` that feed the anomaly baseline.
    pub anomaly_window_days: u32,
    pub anomaly_min_history: usize,
    pub anomaly_notable_drop: f64,
    pub anomaly_significant_drop: f64,
    pub anomaly_critical_drop: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_range_days: 366,
            partial_credit: 75.0,
            late_grace_minutes: 15,
            readiness_weight: 0.6,
            compliance_weight: 0.4,
            anomaly_window_days: 14,
            anomaly_min_history: 3,
            anomaly_notable_drop: 10.0,
            anomaly_significant_drop: 20.0,
            anomaly_critical_drop: 30.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));
        let defaults = EngineConfig::default();

        let engine = EngineConfig {
            max_range_days: parse_or(&lookup, "ENGINE_MAX_RANGE_DAYS", defaults.max_range_days)?,
            partial_credit: parse_or(&lookup, "ENGINE_PARTIAL_CREDIT", defaults.partial_credit)?,
            late_grace_minutes: parse_or(
                &lookup,
                "ENGINE_LATE_GRACE_MINUTES",
                defaults.late_grace_minutes,
            )?,
            anomaly_window_days: parse_or(
                &lookup,
                "ENGINE_ANOMALY_WINDOW_DAYS",
                defaults.anomaly_window_days,
            )?,
            ..defaults
        };
        if !(0.0..=100.0).contains(&engine.partial_credit) {
            return Err(anyhow!(
                "ENGINE_PARTIAL_CREDIT must be within 0..=100, got {}",
                engine.partial_credit
            ));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_addr: required("SERVER_ADDR")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 600)?,
            meta_cache_ttl_secs: parse_or(&lookup, "META_CACHE_TTL_SECS", 300)?,
            meta_cache_capacity: parse_or(&lookup, "META_CACHE_CAPACITY", 10_000)?,
            engine,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        None => Ok(default),
    }
}
