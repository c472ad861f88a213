// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::{BitsoClient, MarketData};
use app_config::Settings;
use clap::{Parser, Subcommand};
use core_types::Symbol;
use engine::Engine;
use notifier::{LogNotifier, Notifier, TelegramNotifier};
use risk::PositionSizer;
use std::str::FromStr;
use strategies::{ShortReversal, SignalConditions, Strategy};
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Watches a Bitso order book and reports short-entry signals.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the signal loop until interrupted.
    Run {
        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
    },

    /// Fetches and evaluates the market once without trading or notifying.
    Evaluate,

    /// Prints the newest rows of the trade log.
    Trades {
        /// How many rows to print.
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings().context("Failed to load settings")?;
    init_tracing(&settings.app.log_level);
    tracing::info!(symbol = %settings.trading.symbol, "Application settings loaded successfully.");

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Run { once } => handle_run(settings, once).await,
        Commands::Evaluate => handle_evaluate(&settings).await,
        Commands::Trades { limit } => handle_trades(&settings, limit).await,
    }
}

/// Installs the fmt subscriber, capping sqlx query logs at WARN.
fn init_tracing(log_level: &str) {
    let (level, recognized) = match tracing::Level::from_str(log_level) {
        Ok(level) => (level, true),
        Err(_) => (tracing::Level::INFO, false),
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("sqlx::query", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    if !recognized {
        tracing::warn!(log_level, "Unknown log level, falling back to info.");
    }
}

// --- "Run" Subcommand Logic ---

/// Wires the collaborators and runs either one cycle or the continuous loop.
async fn handle_run(settings: Settings, once: bool) -> Result<()> {
    // --- 1. Component Instantiation ---
    let market = BitsoClient::new(&settings.bitso)?;
    let strategy = ShortReversal::new(settings.strategy.clone())?;
    let sizer = PositionSizer::new(&settings.sizing)?;

    let db = database::connect(&settings.database).await?;
    tracing::info!("Database connection established and migrations are up-to-date.");

    let notifier: Box<dyn Notifier + Send + Sync> = match &settings.telegram {
        Some(telegram) => Box::new(TelegramNotifier::new(telegram)?),
        None => {
            tracing::info!("No Telegram settings, notifications go to the log only.");
            Box::new(LogNotifier::new())
        }
    };

    let run_once = once || settings.schedule.run_once;

    // --- 2. Create the Engine ---
    let engine = Engine::new(
        settings,
        Box::new(market),
        Box::new(strategy),
        sizer,
        Box::new(db),
        notifier,
    );

    // --- 3. Run ---
    if run_once {
        engine.run_once().await.context("Cycle failed")?;
        tracing::info!(symbol = %engine.symbol(), "Single cycle finished.");
        return Ok(());
    }

    let state = engine.run_until(shutdown_signal()).await;
    tracing::info!(
        cycles = state.cycle_index,
        failed = state.failed_cycles,
        "Signal loop stopped."
    );
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the loop runs until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
        std::future::pending::<()>().await;
    }
}

// --- "Evaluate" Subcommand Logic ---

/// Runs the fetch and compute steps once and prints what the rule sees.
async fn handle_evaluate(settings: &Settings) -> Result<()> {
    let market = BitsoClient::new(&settings.bitso)?;
    let strategy = ShortReversal::new(settings.strategy.clone())?;
    let symbol = Symbol(settings.trading.symbol.clone());

    let series = market
        .fetch_recent_bars(
            &symbol,
            settings.trading.bar_interval_secs,
            settings.trading.bar_limit,
        )
        .await
        .context("Failed to fetch bars")?;
    let result = strategy.assess(&series)?;

    println!("\n--- {} | {} bars ---", symbol, series.len());
    let Some(snapshot) = result.snapshot else {
        println!(
            "Not enough history: {} bars fetched, {} needed.",
            series.len(),
            strategy.longest_lookback()
        );
        return Ok(());
    };

    let threshold = settings.strategy.rsi_threshold;
    let conditions = SignalConditions::check(&snapshot, threshold);
    println!("  close       {:.2}", snapshot.close);
    println!("  ema fast    {:.2}", snapshot.ema_fast);
    println!("  ema slow    {:.2}", snapshot.ema_slow);
    println!("  rsi         {:.2}", snapshot.rsi);
    println!("  macd        {:.4}", snapshot.macd);
    println!("  macd signal {:.4}", snapshot.macd_signal);
    println!("  histogram   {:.4}", snapshot.macd_histogram);
    println!("---------------------------------");
    println!("  close < ema fast < ema slow : {}", conditions.trend);
    println!("  rsi > {threshold:<22}: {}", conditions.overbought);
    println!("  macd < signal               : {}", conditions.momentum);
    println!(
        "\nSignal: {}",
        if result.triggered { "SHORT" } else { "none" }
    );
    Ok(())
}

// --- "Trades" Subcommand Logic ---

async fn handle_trades(settings: &Settings, limit: u32) -> Result<()> {
    let db = database::connect(&settings.database).await?;
    let records = db.recent_trades(limit).await?;

    if records.is_empty() {
        println!("The trade log is empty.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<19}  {:<10}  {:>16}  {:>14}  signal",
        "id", "timestamp (UTC)", "symbol", "price", "amount"
    );
    for record in records {
        let entry = record.entry;
        println!(
            "{:>5}  {:<19}  {:<10}  {:>16}  {:>14}  {}",
            record.id,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.symbol.0,
            entry.price,
            entry.amount,
            entry.signal_type
        );
    }
    Ok(())
}
