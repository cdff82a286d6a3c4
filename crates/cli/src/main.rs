use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use catalog::MySqlWatchlist;
use model::FileSnapshotStore;
use server::{create_router, AppState, Config, EngineConfig, ScoredMovie, SuggestionEngine};
use tmdb::TmdbClient;

/// CineSuggest - personal movie suggestion engine
#[derive(Parser)]
#[command(name = "cine-suggest")]
#[command(about = "Learns your watchlist taste and ranks new releases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one training cycle and persist the snapshot
    Train,

    /// Score current new releases and print the ranking
    Suggest {
        /// Number of suggestions to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let engine = build_engine(&config).await?;

    match cli.command {
        Commands::Serve { port } => handle_serve(engine, config, port).await?,
        Commands::Train => handle_train(engine).await?,
        Commands::Suggest { limit } => handle_suggest(engine, limit).await?,
    }

    Ok(())
}

/// Wire the engine to its production collaborators.
async fn build_engine(config: &Config) -> Result<Arc<SuggestionEngine>> {
    let watchlist = MySqlWatchlist::connect(&config.database_url)
        .await
        .context("Failed to connect to the watchlist database")?;
    let provider = TmdbClient::new(config.tmdb_api_key.clone(), config.tmdb_api_url.clone())
        .context("Failed to build the TMDB client")?;
    let snapshots = FileSnapshotStore::new(&config.model_path);

    let engine_config = EngineConfig {
        trainer: config.trainer_config(),
        score_concurrency: config.score_concurrency,
        fetch_timeout: config.fetch_timeout(),
    };

    Ok(Arc::new(SuggestionEngine::new(
        Arc::new(watchlist),
        Arc::new(provider),
        Arc::new(snapshots),
        engine_config,
    )))
}

/// Handle the 'serve' command
async fn handle_serve(
    engine: Arc<SuggestionEngine>,
    config: Config,
    port: Option<u16>,
) -> Result<()> {
    // Train-or-load before accepting traffic, like the original service; an
    // empty watchlist is not fatal here, /train can be called later.
    if let Err(err) = engine.ensure_ready().await {
        warn!(error = %err, "Starting without a trained model");
    }

    let addr = format!("{}:{}", config.host, port.unwrap_or(config.port));
    let app = create_router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Serving suggestions on http://{}", addr);
    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;
    Ok(())
}

/// Handle the 'train' command
async fn handle_train(engine: Arc<SuggestionEngine>) -> Result<()> {
    let summary = engine.retrain().await?;

    println!("{}", "Training completed".bold().green());
    println!("  Watchlist movies:  {}", summary.movies);
    println!("  Training examples: {}", summary.training_examples);
    println!("  Skipped metadata:  {}", summary.skipped_metadata);
    println!(
        "  Loss: {:.4} -> {:.4} over {} epochs",
        summary.report.initial_loss, summary.report.final_loss, summary.report.epochs
    );
    Ok(())
}

/// Handle the 'suggest' command
async fn handle_suggest(engine: Arc<SuggestionEngine>, limit: usize) -> Result<()> {
    engine.ensure_ready().await?;
    let ranked = engine.suggest().await?;

    print_suggestions(&ranked, limit);
    Ok(())
}

fn print_suggestions(ranked: &[ScoredMovie], limit: usize) {
    println!("{}", "Suggested movies:".bold().blue());
    for (i, movie) in ranked.iter().take(limit).enumerate() {
        let date = movie.release_date.as_deref().unwrap_or("????");
        println!(
            "{}. {} ({}) - predicted {:.2}/5",
            (i + 1).to_string().green(),
            movie.title,
            date,
            movie.predicted_rating
        );
    }
    if ranked.is_empty() {
        println!("  (no unwatched new releases right now)");
    }
}
