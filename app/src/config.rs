//! Startup configuration surface: one TOML file holding every component's
//! settings, plus environment-variable overrides for webhook URLs. Broker
//! credentials are not modeled here — the venue transport this binary wires
//! is the in-memory reference transport, so there is nothing to
//! authenticate against yet.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

fn default_true() -> bool {
    true
}

/// Per-market trading parameters. A market with no table in the config file
/// is simply not traded.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub per_order_budget: Decimal,
    #[serde(default = "default_true")]
    pub auto_trading: bool,
}

/// Ledger admission limits and database location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub database_path: String,
    pub position_limit: usize,
    pub sector_limit: usize,
    pub sector_ratio: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_path: "./data/ledger.db".to_string(),
            position_limit: prism_ledger::DEFAULT_POSITION_LIMIT,
            sector_limit: prism_ledger::DEFAULT_SECTOR_LIMIT,
            sector_ratio: prism_ledger::DEFAULT_SECTOR_RATIO,
        }
    }
}

/// Scheduled-order store location and replay cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub database_path: String,
    pub poll_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            database_path: "./data/scheduler.db".to_string(),
            poll_interval_secs: prism_scheduler::DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

/// Logging format selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { json: false }
    }
}

fn default_mode() -> String {
    "dry-run".to_string()
}

/// Top-level configuration, deserialized from `config.toml` by
/// [`prism_core::config::load_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Dispatcher operating mode: `"real"`, `"demo"`, or `"dry-run"`
    /// Defaults to the safest choice.
    #[serde(default = "default_mode")]
    pub mode: String,
    pub kr: Option<MarketConfig>,
    pub us: Option<MarketConfig>,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// KR holiday set, supplied externally (NYSE's own holiday table is
    /// computed, not configured).
    #[serde(default)]
    pub kr_holidays: Vec<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_minimal_config_fills_in_every_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.mode, "dry-run");
        assert!(config.kr.is_none());
        assert!(config.us.is_none());
        assert_eq!(config.ledger.position_limit, prism_ledger::DEFAULT_POSITION_LIMIT);
        assert_eq!(config.scheduler.poll_interval_secs, prism_scheduler::DEFAULT_POLL_INTERVAL.as_secs());
        assert!(!config.logging.json);
        assert!(config.kr_holidays.is_empty());
    }

    #[test]
    fn a_full_config_parses_both_markets_and_overrides() {
        let toml = r#"
            mode = "demo"
            kr_holidays = ["2026-01-01", "2026-02-17"]

            [kr]
            per_order_budget = "1000000"
            auto_trading = false

            [us]
            per_order_budget = "10000"

            [ledger]
            database_path = "./data/ledger.db"
            position_limit = 5

            [scheduler]
            poll_interval_secs = 30
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.mode, "demo");
        assert_eq!(config.kr_holidays.len(), 2);
        assert!(!config.kr.unwrap().auto_trading);
        assert!(config.us.unwrap().auto_trading);
        assert_eq!(config.ledger.position_limit, 5);
        assert_eq!(config.scheduler.poll_interval_secs, 30);
    }
}
