//! Roomsense Agent CLI
//!
//! Window-state inference and room advice from a pair of climate feeds.

use anyhow::Context;
use clap::{Parser, Subcommand};
use roomsense_agent::{report, Agent, ClothingBias, Config, VERSION};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roomsense")]
#[command(version = VERSION)]
#[command(about = "Room climate assistant: window inference and advice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler: periodic checks plus the daily greeting
    Run,

    /// Run a single window check now
    Check,

    /// Show the current readings and comfort band
    Status,

    /// Show ventilation and clothing advice
    Recommend {
        /// Prefer warmer clothing suggestions
        #[arg(long)]
        warm: bool,
    },

    /// Analyse insulation and air exchange from recent history
    Analyse,

    /// Send the window request to the roommate chat
    NotifyRoommate,

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => cmd_run().await,
        Commands::Check => cmd_check().await,
        Commands::Status => cmd_status().await,
        Commands::Recommend { warm } => cmd_recommend(warm).await,
        Commands::Analyse => cmd_analyse().await,
        Commands::NotifyRoommate => cmd_notify_roommate().await,
        Commands::Config => cmd_config(),
    }
}

/// Load the config and build an agent, insisting on a configured feed.
fn build_agent() -> anyhow::Result<Agent> {
    let config = Config::load().unwrap_or_default();
    if !config.channel_configured() {
        anyhow::bail!(
            "no feed channel configured; edit {:?} and set channel.channel_id",
            Config::config_path()
        );
    }
    Agent::new(config).context("failed to initialize agent")
}

async fn cmd_run() -> anyhow::Result<()> {
    let agent = build_agent()?;
    println!("Roomsense Agent v{VERSION}");
    println!("Press Ctrl+C to stop");
    agent.run().await.context("scheduler stopped with an error")
}

async fn cmd_check() -> anyhow::Result<()> {
    let agent = build_agent()?;
    match agent.run_check().await? {
        Some(kind) => println!("Transition: {kind}"),
        None => println!("No window state transition."),
    }
    println!(
        "Window believed {}.",
        if agent.window_open().await {
            "open"
        } else {
            "closed"
        }
    );
    Ok(())
}

async fn cmd_status() -> anyhow::Result<()> {
    let agent = build_agent()?;
    let observation = agent.observe().await?;
    match observation.advised() {
        Some((snap, advisory)) => println!("{}", report::status_text(snap, &advisory)),
        None => println!("{}", report::NO_DATA_TEXT),
    }
    Ok(())
}

async fn cmd_recommend(warm: bool) -> anyhow::Result<()> {
    let agent = build_agent()?;
    let observation = agent.observe().await?;
    match observation.snapshot.as_ref() {
        Some(snap) => {
            let bias = if warm {
                ClothingBias::Warm
            } else {
                ClothingBias::Normal
            };
            let advisory = roomsense_agent::advise(snap, bias);
            println!("{}", report::recommend_text(&advisory));
        }
        None => println!("{}", report::NO_DATA_TEXT),
    }
    Ok(())
}

async fn cmd_analyse() -> anyhow::Result<()> {
    let agent = build_agent()?;
    let observation = agent.observe().await?;
    let sample_count = agent.config().channel.fetch_count;
    match observation.advised() {
        Some((snap, advisory)) => match report::analyse_text(snap, &advisory, sample_count) {
            Some(text) => println!("{text}"),
            None => println!("Not enough history for a correlation analysis."),
        },
        None => println!("{}", report::NO_DATA_TEXT),
    }
    Ok(())
}

async fn cmd_notify_roommate() -> anyhow::Result<()> {
    let agent = build_agent()?;
    agent
        .send_roommate_request()
        .await
        .context("failed to notify the roommate")?;
    println!("Request sent.");
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
    Ok(())
}
