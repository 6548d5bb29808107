// Pick'em command-line client.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config
// 4. Build the HTTP client and resolve the session context
// 5. Run the requested command

use std::path::Path;

use pickem_client::api::HttpApi;
use pickem_client::app;
use pickem_client::config;
use pickem_core::{PickEdit, StandingsAggregator};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "pickem", version, about = "NFL pick'em pool client")]
struct Cli {
    /// Season year (defaults to the current season)
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Season week (defaults to the current week)
    #[arg(long, global = true)]
    week: Option<u32>,

    /// Whose picks to show or submit (defaults to the configured username)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Output format (overrides config/client.toml)
    #[arg(long, global = true, value_enum)]
    format: Option<config::OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the current week of the season
    Current,
    /// Show the schedule and scores for a week
    Games,
    /// Show every user's picks and points for a week's games
    Results,
    /// Show season standings through a week
    Standings,
    /// Show your picks for a week
    Picks,
    /// Change picks and submit them
    Submit {
        /// A pick as NICKNAME=POINTS, e.g. Giants=7. Repeatable.
        #[arg(long = "pick", required = true)]
        picks: Vec<PickEdit>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("pickem starting: {:?}", cli.command);

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: server={}", config.server.base_url);
    let format = cli.format.unwrap_or(config.output.format);

    // 4. Build the HTTP client and resolve the session context
    let api = HttpApi::from_config(&config)?;
    let mut stdout = std::io::stdout().lock();

    if let Command::Current = cli.command {
        app::show_current(&api, &mut stdout).await?;
        return Ok(());
    }

    let ctx = app::resolve_context(&api, &config, cli.year, cli.week, cli.user).await?;
    info!("Session context: {} user={:?}", ctx.week(), ctx.username());

    // 5. Run the requested command
    let now = chrono::Utc::now();
    match cli.command {
        Command::Current => {}
        Command::Games => {
            app::show_games(&api, &ctx, &mut stdout).await?;
        }
        Command::Results => {
            app::show_results(&api, &ctx, format, &mut stdout).await?;
        }
        Command::Standings => {
            let aggregator = StandingsAggregator::new(config.season.weeks);
            app::show_standings(&api, &ctx, &aggregator, format, &mut stdout).await?;
        }
        Command::Picks => {
            app::show_picks(&api, &config, &ctx, now, &mut stdout).await?;
        }
        Command::Submit { picks } => {
            if let app::SubmitOutcome::Rejected(_) =
                app::submit_picks(&api, &config, &ctx, &picks, now, &mut stdout).await?
            {
                anyhow::bail!("picks were not submitted");
            }
        }
    }

    info!("pickem finished");
    Ok(())
}

/// Default filter when `RUST_LOG` is unset.
const LOG_FILTER: &str = "pickem=info,pickem_client=info,pickem_core=info,warn";

/// Append tracing output to `logs/pickem.log` so stdout carries only command
/// output. Each invocation is one short command, so runs accumulate in the
/// same file.
fn init_tracing() -> anyhow::Result<()> {
    use std::fs::{self, OpenOptions};
    use std::sync::Mutex;
    use tracing_subscriber::EnvFilter;

    let log_dir = Path::new("logs");
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("pickem.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))
}
