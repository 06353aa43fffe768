pub mod api_server_axum;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod nse_client;
pub mod processor;
pub mod rules;

// Re-exports for convenience
pub use models::{FetchOutcome, IndexConfig, IndexTable, OptionChain, OptionSide, StrikeRecord};
pub use nse_client::{NSEClient, RetryPolicy};
pub use processor::{OptionKind, PivotLevels};
pub use rules::{evaluate, LevelResult, Quote, Reason, TradeSignal};
