use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tour_core::ports::{NavigationPort, TourPersistencePort};
use tour_core::{TourConfig, TourId};
use tour_guide_lib::bootstrap::{init_tracing_subscriber, load_catalog, load_config, wire_runtime};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tour-guide")]
#[command(about = "Walk guided product tours against a simulated router", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a tour from a definition file to completion
    Run {
        /// Tour definition file (.toml or .json)
        #[arg(short, long)]
        tours: PathBuf,
        /// Tour to run; without it the first tour is auto-started for new users
        #[arg(long)]
        tour: Option<String>,
        /// Simulated page load time for navigation steps
        #[arg(long, default_value_t = 150)]
        route_latency_ms: u64,
    },
    /// List the tours in a definition file
    List {
        #[arg(short, long)]
        tours: PathBuf,
    },
    /// Show stored tour progress
    Status,
    /// Forget completed tours and preferences
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing_subscriber(config.logging.log_dir.as_deref())?;

    match cli.command {
        Commands::Run {
            tours,
            tour,
            route_latency_ms,
        } => {
            run_tour(
                &config,
                &tours,
                tour,
                Duration::from_millis(route_latency_ms),
            )
            .await
        }
        Commands::List { tours } => list_tours(&tours),
        Commands::Status => show_status(&config).await,
        Commands::Reset => reset_progress(&config).await,
    }
}

async fn run_tour(
    config: &TourConfig,
    tours: &Path,
    tour: Option<String>,
    route_latency: Duration,
) -> Result<()> {
    let registry = load_catalog(tours)?.into_registry();
    let runtime = wire_runtime(config, route_latency)?;
    let engine = &runtime.engine;
    engine.hydrate().await;

    let mut state = match tour {
        Some(id) => {
            let tour_id = TourId::from(id);
            let steps = registry.steps(&tour_id)?;
            engine.start_tour(tour_id, steps).await?
        }
        None => {
            let tour_id = registry
                .tour_ids()
                .next()
                .cloned()
                .ok_or_else(|| anyhow!("no tours defined in {}", tours.display()))?;
            let steps = registry.steps(&tour_id)?;
            engine.maybe_auto_start(tour_id, steps).await?
        }
    };
    if !state.is_active {
        println!("Tour not started: already completed, tutorials disabled or welcome already seen.");
    }

    while state.is_active {
        if let Some(step) = engine.get_current_step().await {
            println!(
                "[{}/{}] {} ({}) on {}",
                state.current_step + 1,
                state.total_steps,
                step.title,
                step.target,
                runtime.router.current_location()
            );
            if !step.content.is_empty() {
                println!("        {}", step.content);
            }
        }
        state = match engine.next_step().await {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "tour aborted");
                println!("Tour aborted: {err}");
                break;
            }
        };
    }

    engine.shutdown().await;
    info!(
        completed_tours = state.completed_tours.len(),
        "tour session finished"
    );
    Ok(())
}

fn list_tours(tours: &Path) -> Result<()> {
    let registry = load_catalog(tours)?.into_registry();
    for tour_id in registry.tour_ids() {
        let steps = registry.get(tour_id).map(<[_]>::len).unwrap_or(0);
        println!("{tour_id}\t{steps} steps");
    }
    Ok(())
}

async fn show_status(config: &TourConfig) -> Result<()> {
    let runtime = wire_runtime(config, Duration::ZERO)?;
    match runtime.persistence.load().await {
        Some(progress) => {
            let completed: Vec<&str> = progress
                .completed_tours
                .iter()
                .map(TourId::as_str)
                .collect();
            let prefs = progress.user_preferences;
            println!("completed tours:  {}", completed.join(", "));
            println!("auto start:       {}", prefs.auto_start);
            println!("skip tutorials:   {}", prefs.skip_tutorials);
            println!("has seen welcome: {}", prefs.has_seen_welcome);
        }
        None => println!("No stored tour progress."),
    }
    Ok(())
}

async fn reset_progress(config: &TourConfig) -> Result<()> {
    let runtime = wire_runtime(config, Duration::ZERO)?;
    runtime.persistence.clear().await;
    println!("Tour progress cleared.");
    Ok(())
}
