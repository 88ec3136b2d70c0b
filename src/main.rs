use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dynasty::client::ApiClient;
use dynasty::config::Config;
use dynasty::models::Game;
use dynasty::{api, seed};

#[derive(Parser)]
#[command(name = "dynasty")]
#[command(about = "Save-data service for college football dynasty playthroughs")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve,
    /// Replace the school catalog with the bundled FBS list
    Seed,
    /// Create or replace a season's schedule from a JSON list of games
    ImportSchedule {
        /// JSON file holding an array of games
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        playthrough_id: String,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        team_name: String,
    },
    /// Check a running server's health
    Status {
        /// Server base URL; defaults to the configured host and port
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = cli.config;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_filter()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await?,
        Commands::Seed => {
            let db = config.open_database()?;
            let report = db.seed_schools(seed::bundled_schools()?)?;

            println!("Seeded {} schools (replaced {})", report.inserted, report.deleted);
            let mut by_count: Vec<_> = report.by_conference.iter().collect();
            by_count.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (conference, count) in by_count {
                println!("   {conference}: {count} schools");
            }
            db.close()?;
        }
        Commands::ImportSchedule {
            file,
            playthrough_id,
            year,
            team_name,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let games: Vec<Game> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON list of games", file.display()))?;

            let db = config.open_database()?;
            let schedule = db.export_schedule(&playthrough_id, year, &team_name, games)?;
            println!(
                "Saved {} {} schedule for playthrough {} ({} games)",
                schedule.year,
                schedule.team_name,
                schedule.playthrough_id,
                schedule.games.len()
            );
            db.close()?;
        }
        Commands::Status { url } => {
            let url = url.unwrap_or_else(|| format!("http://{}", config.bind_addr()));
            let client = ApiClient::with_version(&url, config.api_version.clone())?;

            println!("Checking dynasty server at {url}...");
            let health = client.health().await?;
            println!(
                "{} ({}, up {:.0}s)",
                health.message, health.environment, health.uptime
            );
            let database = client.database_health().await?;
            println!("Database: {}", database.database.status);
        }
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    tracing::info!(
        "Starting dynasty server in {} mode on {}",
        config.run_mode.as_str(),
        addr
    );

    let db = config.open_database()?;
    let app = api::create_router(db.clone(), config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dynasty server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    db.close()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
