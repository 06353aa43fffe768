use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One index the dashboard tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Name shown to the user.
    pub symbol: String,
    /// Symbol the NSE API expects.
    pub provider_symbol: String,
    /// Strike increment for the index.
    pub tick_step: f64,
}

impl IndexConfig {
    pub fn new(symbol: &str, provider_symbol: &str, tick_step: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            provider_symbol: provider_symbol.to_string(),
            tick_step,
        }
    }
}

/// Immutable table of configured indices, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTable {
    indices: Vec<IndexConfig>,
}

impl IndexTable {
    /// Entries with a blank provider symbol or a non-positive step are dropped.
    pub fn new(indices: Vec<IndexConfig>) -> Self {
        let indices = indices
            .into_iter()
            .filter(|i| !i.provider_symbol.trim().is_empty() && i.tick_step > 0.0)
            .collect();
        Self { indices }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexConfig> {
        self.indices.iter()
    }

    pub fn get(&self, symbol: &str) -> Option<&IndexConfig> {
        self.indices
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Response from the option-chain-indices endpoint.
///
/// Deserialization is lenient: wrong-typed fields become `None`, malformed
/// strike records are dropped and a missing `records` block yields an empty
/// chain with no spot price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub records: Records,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Records {
    #[serde(rename = "underlyingValue", default, deserialize_with = "lenient::number")]
    pub underlying_value: Option<f64>,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub timestamp: Option<String>,

    #[serde(default, deserialize_with = "lenient::strike_records")]
    pub data: Vec<StrikeRecord>,
}

/// Option data for each strike price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrikeRecord {
    #[serde(rename = "strikePrice", default, deserialize_with = "lenient::number")]
    pub strike_price: Option<f64>,

    #[serde(rename = "expiryDate", default, deserialize_with = "lenient::or_default")]
    pub expiry_date: Option<String>,

    #[serde(rename = "CE", default, deserialize_with = "lenient::or_default")]
    pub call: Option<OptionSide>,

    #[serde(rename = "PE", default, deserialize_with = "lenient::or_default")]
    pub put: Option<OptionSide>,
}

/// One side (CE or PE) of a strike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSide {
    #[serde(rename = "openInterest", default, deserialize_with = "lenient::number")]
    pub open_interest: Option<f64>,

    #[serde(rename = "lastPrice", default, deserialize_with = "lenient::number")]
    pub last_price: Option<f64>,
}

impl OptionChain {
    /// Build a chain from any JSON value. Never fails.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn spot(&self) -> Option<f64> {
        self.records.underlying_value.filter(|v| v.is_finite())
    }

    pub fn strikes(&self) -> &[StrikeRecord] {
        &self.records.data
    }
}

/// Result of one Chain Fetcher call. Exactly one of document or message.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(OptionChain),
    Failed { message: String },
}

impl FetchOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failed { message } => Some(message),
        }
    }
}

mod lenient {
    use super::StrikeRecord;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Value::deserialize(deserializer)?.as_f64())
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    pub fn strike_records<'de, D>(deserializer: D) -> Result<Vec<StrikeRecord>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(_) => serde_json::from_value(item).ok(),
                    _ => None,
                })
                .collect()),
            _ => Ok(Vec::new()),
        }
    }
}
