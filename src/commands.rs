use crate::api_server_axum;
use crate::config::{self, Settings};
use crate::models::{IndexConfig, IndexTable};
use crate::nse_client::{NSEClient, RetryPolicy};
use crate::rules::{evaluate, LevelResult, TradeSignal, PLACEHOLDER};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

/// One evaluation cycle, ready to hand to a presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Local>,
    pub results: Vec<LevelResult>,
}

/// Fetch and evaluate one index.
pub async fn evaluate_index(
    client: &NSEClient,
    index: &IndexConfig,
    policy: &RetryPolicy,
) -> LevelResult {
    let outcome = client.fetch(&index.provider_symbol, policy).await;
    let result = evaluate(&index.symbol, index.tick_step, &outcome);

    info!(
        index = %result.index,
        spot = ?result.spot,
        trade = %result.trade_description(),
        "index evaluated"
    );
    result
}

/// Evaluate every configured index, one at a time, in table order.
pub async fn collect_levels(
    client: &NSEClient,
    table: &IndexTable,
    policy: &RetryPolicy,
) -> Vec<LevelResult> {
    let mut results = Vec::with_capacity(table.len());
    for index in table.iter() {
        results.push(evaluate_index(client, index, policy).await);
    }
    results
}

pub async fn build_dashboard(
    client: &NSEClient,
    table: &IndexTable,
    policy: &RetryPolicy,
) -> Dashboard {
    Dashboard {
        generated_at: Local::now(),
        results: collect_levels(client, table, policy).await,
    }
}

/// Command handlers behind the binary's modes.
pub struct Commands;

impl Commands {
    fn setup(settings: &Settings) -> (NSEClient, IndexTable, RetryPolicy) {
        let client = NSEClient::new().with_cache_ttl(settings.cache_ttl);
        let table = IndexTable::new(config::default_indices());
        let policy = RetryPolicy::new(settings.max_attempts, settings.retry_delay);
        (client, table, policy)
    }

    /// Evaluate all indices and print them.
    pub async fn run_batch(settings: &Settings) -> Result<()> {
        println!("{}", "=".repeat(60).blue());
        println!("{}", "🚀 Hero or Zero Trade Dashboard".green().bold());
        println!("{}", "Live OI + Pivot Levels + Hero/Zero Trade (15% Target & 5% SL)".dimmed());
        println!("{}", "=".repeat(60).blue());
        println!();

        let (client, table, policy) = Self::setup(settings);
        let start_time = std::time::Instant::now();

        let dashboard = build_dashboard(&client, &table, &policy).await;

        for result in &dashboard.results {
            print_result(result);
        }

        let failed = dashboard
            .results
            .iter()
            .filter(|r| r.error.is_some())
            .count();
        let trades = dashboard
            .results
            .iter()
            .filter(|r| matches!(r.trade, TradeSignal::BuyCall { .. } | TradeSignal::BuyPut { .. }))
            .count();

        println!("{}", "=".repeat(60).blue());
        println!("{}", "Summary".cyan().bold());
        println!("{}", "=".repeat(60).blue());
        println!("{} Indices: {}", "ℹ".blue(), dashboard.results.len());
        println!("{} Trade calls: {}", "✓".green(), trades);
        println!("{} Fetch errors: {}", "✗".red(), failed);
        println!("{} Time taken: {:.2}s", "⏱".yellow(), start_time.elapsed().as_secs_f64());
        println!(
            "{} Generated at: {}",
            "ℹ".blue(),
            dashboard.generated_at.format("%d-%b-%Y %H:%M:%S")
        );

        Ok(())
    }

    /// Evaluate a single configured index.
    pub async fn run_single(settings: &Settings) -> Result<()> {
        let (client, table, policy) = Self::setup(settings);
        let index = table
            .get(&settings.symbol)
            .with_context(|| format!("Unknown index '{}'", settings.symbol))?;

        println!("{} Fetching option chain for {}...", "→".cyan(), index.symbol.yellow());
        println!();

        let result = evaluate_index(&client, index, &policy).await;
        print_result(&result);
        Ok(())
    }

    /// Serve levels over HTTP.
    pub async fn run_server(settings: &Settings) -> Result<()> {
        println!("{}", "=".repeat(60).blue());
        println!("{}", "NSE Hero/Zero API Server".green().bold());
        println!("{}", "=".repeat(60).blue());
        println!();

        let (client, table, policy) = Self::setup(settings);
        api_server_axum::start_server(settings.port, client, table, policy).await
    }
}

/// Console rendering of one result.
pub fn print_result(result: &LevelResult) {
    println!(
        "{} {} - Spot: {}",
        "📊".to_string(),
        result.index.yellow().bold(),
        result.spot_display()
    );

    let trade = result.trade_description();
    let trade = match result.trade {
        TradeSignal::BuyCall { .. } => trade.green().bold(),
        TradeSignal::BuyPut { .. } => trade.red().bold(),
        TradeSignal::WaitForBreakout => trade.yellow(),
        TradeSignal::Error | TradeSignal::NoSpot => trade.red(),
    };
    println!("  Trade: {}", trade);
    println!(
        "  Entry: {}  Target (15%): {}  Stoploss (5%): {}",
        result.entry, result.target, result.stop_loss
    );

    match &result.levels {
        Some(l) => {
            println!("  Pivot: {:.2}", l.pivot);
            println!("  R1/R2/R3: {:.2} / {:.2} / {:.2}", l.r1, l.r2, l.r3);
            println!("  S1/S2/S3: {:.2} / {:.2} / {:.2}", l.s1, l.s2, l.s3);
        }
        None => {
            println!("  Pivot: {}", PLACEHOLDER);
            println!("  R1/R2/R3: {0} / {0} / {0}", PLACEHOLDER);
            println!("  S1/S2/S3: {0} / {0} / {0}", PLACEHOLDER);
        }
    }

    if let Some(error) = &result.error {
        println!("  {} {}", "Error:".red(), error.chars().take(120).collect::<String>());
    }
    println!();
}
