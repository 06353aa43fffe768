use crate::models::IndexConfig;
use std::time::Duration;

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

pub fn option_chain_url(base_url: &str, symbol: &str) -> String {
    format!(
        "{}/api/option-chain-indices?symbol={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(symbol)
    )
}

// -----------------------------------------------
// INDICES
// -----------------------------------------------

/// Indices evaluated every cycle, in display order.
pub fn default_indices() -> Vec<IndexConfig> {
    vec![
        IndexConfig::new("NIFTY", "NIFTY", 50.0),
        IndexConfig::new("BANKNIFTY", "BANKNIFTY", 100.0),
        IndexConfig::new("FINNIFTY", "FINNIFTY", 50.0),
        IndexConfig::new("MIDCPNIFTY", "MIDCPNIFTY", 50.0),
    ]
}

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const WARMUP_TIMEOUT: Duration = Duration::from_secs(5);
pub const DATA_TIMEOUT: Duration = Duration::from_secs(10);

// -----------------------------------------------
// HTTP HEADERS
// -----------------------------------------------
pub const HEADER_X_REQUESTED_WITH: &str = "XMLHttpRequest";
pub const HEADER_ACCEPT_HTML: &str = "text/html";

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3;

// -----------------------------------------------
// CACHE
// -----------------------------------------------
pub const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

// -----------------------------------------------
// TRADE PARAMETERS
// -----------------------------------------------
pub const TARGET_MULTIPLIER: f64 = 1.15;
pub const STOP_LOSS_MULTIPLIER: f64 = 0.95;
/// Premiums below this are too small for percentage targets to mean anything.
pub const MIN_ENTRY_PRICE: f64 = 1.0;

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------
pub const DEFAULT_PORT: u16 = 3001;

/// Binary settings read from the environment. Library code never reads these
/// directly; everything is passed in explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: String,
    pub symbol: String,
    pub port: u16,
    pub max_attempts: usize,
    pub retry_delay: Duration,
    pub cache_ttl: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            mode: get_execution_mode(),
            symbol: env_or("NSE_SYMBOL", "NIFTY".to_string()),
            port: env_or("NSE_PORT", DEFAULT_PORT),
            max_attempts: env_or("NSE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS).max(1),
            retry_delay: Duration::from_secs(env_or(
                "NSE_RETRY_DELAY_SECS",
                DEFAULT_RETRY_DELAY_SECS,
            )),
            cache_ttl: Duration::from_secs(env_or("NSE_CACHE_TTL_SECS", CACHE_TTL.as_secs())),
        }
    }
}

/// Get the execution mode from environment or default to batch
pub fn get_execution_mode() -> String {
    std::env::var("NSE_MODE").unwrap_or_else(|_| "batch".to_string())
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_chain_url_encodes_symbol() {
        assert_eq!(
            option_chain_url("https://www.nseindia.com", "NIFTY"),
            "https://www.nseindia.com/api/option-chain-indices?symbol=NIFTY"
        );
        assert_eq!(
            option_chain_url("http://127.0.0.1:9000/", "M&M"),
            "http://127.0.0.1:9000/api/option-chain-indices?symbol=M%26M"
        );
    }

    #[test]
    fn test_default_indices_order_and_steps() {
        let indices = default_indices();
        let names: Vec<&str> = indices.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(names, ["NIFTY", "BANKNIFTY", "FINNIFTY", "MIDCPNIFTY"]);
        assert_eq!(indices[1].tick_step, 100.0);
        assert!(indices.iter().all(|i| i.tick_step > 0.0));
    }
}
