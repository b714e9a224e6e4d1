//! Gameday Harvester - Main Entry Point
//!
//! One invocation performs one fetch-allocate-submit cycle and exits;
//! scheduling is left to an external trigger such as cron.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gameday_harvester::config::Config;
use gameday_harvester::exchange::{ExchangeApi, KalshiClient, Series};
use gameday_harvester::strategy::{MarketScanner, RunOutcome, StrategyRunner};
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Gameday Harvester CLI
#[derive(Parser)]
#[command(name = "gameday-harvester")]
#[command(version, about = "Fee-aware settlement harvesting on Kalshi sports markets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one fetch-allocate-submit cycle (the default)
    Run {
        /// Compute and log orders without submitting them
        #[arg(long)]
        dry_run: bool,
    },

    /// List open markets for a series
    Markets {
        /// Series ticker (defaults to the configured series)
        #[arg(long)]
        series: Option<Series>,

        /// Only show markets eligible for today's run
        #[arg(long)]
        eligible: bool,
    },

    /// Show the spendable portfolio balance
    Balance,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    info!(
        "Gameday Harvester v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::load()?;
    config.validate()?;

    let client = KalshiClient::new(&config.kalshi, &config.execution)?;

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => run_strategy(&config, &client, dry_run).await,
        Commands::Markets { series, eligible } => {
            list_markets(&config, &client, series, eligible).await
        }
        Commands::Balance => show_balance(&client).await,
    }
}

/// Run the strategy once and log the outcome. A skipped run exits
/// cleanly; rejected orders are reported but do not fail the process.
async fn run_strategy(config: &Config, client: &KalshiClient, dry_run: bool) -> Result<()> {
    if dry_run {
        info!("Dry run: orders will be computed but not submitted");
    } else {
        warn!("Live run: real-money orders will be submitted");
    }

    let runner = StrategyRunner::new(config.strategy.clone(), dry_run)?;

    match runner.run(client).await? {
        RunOutcome::Skipped(reason) => {
            info!(%reason, "Run skipped");
        }
        RunOutcome::Traded(report) => {
            let sized = report.intents.iter().filter(|i| i.contracts > 0).count();
            info!(
                markets = report.intents.len(),
                sized,
                submitted = report.submitted,
                rejected = report.rejected,
                dry_run = report.dry_run,
                "Run complete"
            );
        }
    }

    Ok(())
}

/// List open (optionally: today-eligible) markets for a series.
async fn list_markets(
    config: &Config,
    client: &KalshiClient,
    series: Option<Series>,
    eligible: bool,
) -> Result<()> {
    let series = series.unwrap_or(config.strategy.series);
    let mut markets = client.get_open_markets(Some(series)).await?;

    if eligible {
        let scanner = MarketScanner::new(config.strategy.clone())?;
        markets = scanner.eligible_markets(markets, chrono::Utc::now());
    }

    info!(count = markets.len(), %series, eligible, "Open markets");
    for market in &markets {
        info!(
            ticker = %market.ticker,
            yes_ask = market.yes_ask,
            expires = %market.expected_expiration_time,
            title = market.title.as_deref().unwrap_or("-"),
            "Market"
        );
    }

    Ok(())
}

/// Print the spendable balance in dollars.
async fn show_balance(client: &KalshiClient) -> Result<()> {
    let balance = client.get_portfolio_balance().await?;
    info!(%balance, "Portfolio balance");
    Ok(())
}

/// Initialize logging with stdout and hourly rolling file output.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::hourly("logs", "gameday-harvester.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep it alive for the program duration
    Box::leak(Box::new(_guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gameday_harvester=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .init();

    Ok(())
}
