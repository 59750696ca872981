use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use roami::cache::PersistentCache;
use roami::sources::{
    ArchiveSource, CachedArchive, ChatNarrativeClient, FixedPosition, OverpassClient,
    TracingMemoryLog, WikimediaClient,
};
use roami::{RoamiConfig, Tour, TourAssembler, TourSession, TourStop};

/// Roami walking tours from the command line
#[derive(Parser, Debug)]
#[command(name = "roami")]
#[command(about = "Roami roadtrip companion: walking tours of nearby attractions")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "ROAMI_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging for roami
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a tour around a position and walk through its stops
    Tour {
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        /// Discovery radius in meters
        #[arg(long)]
        radius: Option<f64>,
        /// Only keep archival photos from this year on
        #[arg(long)]
        year_from: Option<i32>,
        /// Only keep archival photos up to this year
        #[arg(long)]
        year_to: Option<i32>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RoamiConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    roami::telemetry::init(&config.logging, cli.verbose)?;

    match cli.command {
        Command::Config => {
            let mut shown = config.clone();
            if shown.sources.narrative_api_key.is_some() {
                shown.sources.narrative_api_key = Some("********".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
            Ok(())
        }
        Command::Tour {
            latitude,
            longitude,
            radius,
            year_from,
            year_to,
        } => run_tour(&config, latitude, longitude, radius, year_from, year_to).await,
    }
}

async fn run_tour(
    config: &RoamiConfig,
    latitude: f64,
    longitude: f64,
    radius: Option<f64>,
    year_from: Option<i32>,
    year_to: Option<i32>,
) -> Result<()> {
    let wikimedia =
        WikimediaClient::new(&config.sources)?.with_year_range(year_from, year_to);
    let archive: Arc<dyn ArchiveSource> =
        match PersistentCache::open(config.cache.resolved_location()) {
            Ok(cache) => Arc::new(CachedArchive::new(wikimedia, cache, config.cache.ttl())),
            Err(e) => {
                warn!("Archive cache unavailable, continuing without it: {}", e);
                Arc::new(wikimedia)
            }
        };

    let assembler = TourAssembler::new(
        Arc::new(FixedPosition::new(latitude, longitude)),
        Arc::new(OverpassClient::new(&config.sources)?),
        archive,
        Arc::new(ChatNarrativeClient::new(&config.sources)?),
        config.tour.clone(),
    );
    let session =
        TourSession::new(Arc::new(assembler)).with_memory_log(Arc::new(TracingMemoryLog));

    let tour = match session.start_tour(radius).await {
        Ok(tour) => tour,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    print_summary(&tour);
    loop {
        if let (Some(index), Some(stop)) = (session.current_index(), session.current_stop()) {
            print_stop(index, &stop);
        }
        let before = session.current_index();
        if session.advance() == before {
            break;
        }
    }

    session.flush_memory_log().await;
    Ok(())
}

fn print_summary(tour: &Tour) {
    println!(
        "🗺️  {} stops, {:.1} km, about {:.0} minutes",
        tour.len(),
        tour.total_distance_meters() / 1000.0,
        tour.estimated_duration_minutes()
    );
}

fn print_stop(index: usize, stop: &TourStop) {
    println!();
    println!("{}. {}", index + 1, stop.attraction.name);
    println!("   📍 {}", stop.attraction.location.format_coordinates());
    println!("   {}", stop.narrative);
    for photo in &stop.archival_photos {
        println!("   📷 {} - {}", photo.caption(), photo.url);
    }
}
