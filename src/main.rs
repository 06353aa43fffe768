use anyhow::Result;
use colored::Colorize;
use nse_hero_zero::commands::Commands;
use nse_hero_zero::config::Settings;
use nse_hero_zero::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let settings = Settings::from_env();

    match settings.mode.as_str() {
        "batch" => Commands::run_batch(&settings).await?,
        "single" => Commands::run_single(&settings).await?,
        "server" => Commands::run_server(&settings).await?,
        other => {
            eprintln!("{} Invalid mode '{}'. Use 'batch', 'single' or 'server'", "✗".red(), other);
            eprintln!("Set NSE_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  NSE_MODE=batch cargo run                     # Evaluate all indices");
            eprintln!("  NSE_MODE=single NSE_SYMBOL=BANKNIFTY cargo run");
            eprintln!("  NSE_MODE=server NSE_PORT=3001 cargo run      # Start API server on port 3001");
            std::process::exit(1);
        }
    }

    Ok(())
}
