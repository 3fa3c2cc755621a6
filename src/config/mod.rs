use serde::{Deserialize, Serialize};

use crate::metrics::timeline::BandBounds;

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Analytics thresholds and display limits. Defaults match the product
/// dashboards; deployments tune them through the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub red_flag_threshold: f64,
    pub red_flag_limit: usize,
    pub top_contributor_limit: usize,
    pub alignment_goal_limit: usize,
    pub bands: BandBounds,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            red_flag_threshold: 6.0,
            red_flag_limit: 10,
            top_contributor_limit: 5,
            alignment_goal_limit: 15,
            bands: BandBounds::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            red_flag_threshold: env_parse("PERF_RED_FLAG_THRESHOLD", defaults.red_flag_threshold),
            red_flag_limit: env_parse("PERF_RED_FLAG_LIMIT", defaults.red_flag_limit),
            top_contributor_limit: env_parse(
                "PERF_TOP_CONTRIBUTOR_LIMIT",
                defaults.top_contributor_limit,
            ),
            alignment_goal_limit: env_parse(
                "PERF_ALIGNMENT_GOAL_LIMIT",
                defaults.alignment_goal_limit,
            ),
            bands: BandBounds {
                high: env_parse("PERF_BAND_HIGH", defaults.bands.high),
                mid: env_parse("PERF_BAND_MID", defaults.bands.mid),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl OracleConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("PERF_ORACLE_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("PERF_ORACLE_API_KEY").unwrap_or_default(),
            model: std::env::var("PERF_ORACLE_MODEL").unwrap_or(defaults.model),
            timeout_secs: env_parse("PERF_ORACLE_TIMEOUT_SECS", defaults.timeout_secs),
        }
    }
}
