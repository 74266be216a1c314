//! Run the feed and tessellation jobs against a JSON data directory.
//!
//! Usage:
//!   skyfeed rebuild-feed [--seed ID]
//!   skyfeed rebuild-tessellation
//!   skyfeed nearest --ra 1.2 --dec -0.3 [--radius 0.05] [--degrees]
//!   skyfeed nearby --scene ID [--count 20]
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use skyfeed::jobs::{
    lookup_nearest_scene, nearby_feed, rebuild_global_tessellation, rebuild_home_feed,
};
use skyfeed::store::JsonFileStore;
use skyfeed::voronoi::ConvexHullVoronoi;
use skyfeed::{Config, SceneId, SkyPosition};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Home feed and sky tessellation maintenance
#[derive(Parser, Debug)]
#[command(name = "skyfeed")]
#[command(version)]
struct Args {
    /// Directory holding scenes.json, feed.json and tessellation documents
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// TOML job configuration (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute the home feed order
    RebuildFeed {
        /// Scene to pin at the top of the feed
        #[arg(long)]
        seed: Option<String>,
    },
    /// Recompute the configured tessellation
    RebuildTessellation,
    /// Print the scene whose cell contains a sky position
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        ra: f64,
        #[arg(long, allow_hyphen_values = true)]
        dec: f64,
        /// Reject matches farther than this angle
        #[arg(long)]
        radius: Option<f64>,
        /// Angles are in degrees rather than radians
        #[arg(long)]
        degrees: bool,
    },
    /// Print scenes spatially near a scene, nearest cells first
    Nearby {
        #[arg(long)]
        scene: String,
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let mut store = JsonFileStore::new(args.data_dir.clone());

    match args.command {
        Command::RebuildFeed { seed } => {
            let seed = seed.map(SceneId::new);
            let t0 = Instant::now();
            let order = rebuild_home_feed(&mut store, seed.as_ref(), &config.feed, Utc::now())
                .context("rebuilding home feed")?;
            info!(
                feed_len = order.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "done"
            );
        }
        Command::RebuildTessellation => {
            let t0 = Instant::now();
            let tessellation = rebuild_global_tessellation(
                &mut store,
                &config.tessellation,
                &ConvexHullVoronoi::default(),
                Utc::now(),
            )
            .context("rebuilding tessellation")?;
            info!(
                name = %tessellation.name,
                cells = tessellation.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "done"
            );
        }
        Command::Nearest {
            ra,
            dec,
            radius,
            degrees,
        } => {
            let (target, radius) = if degrees {
                (
                    SkyPosition::new(ra.to_radians(), dec.to_radians()),
                    radius.map(f64::to_radians),
                )
            } else {
                (SkyPosition::new(ra, dec), radius)
            };
            let hit = lookup_nearest_scene(&store, &config.tessellation.name, target, radius)
                .context("looking up nearest scene")?;
            match hit {
                Some(id) => println!("{id}"),
                None => info!("no scene within radius"),
            }
        }
        Command::Nearby { scene, count } => {
            let ids = nearby_feed(
                &store,
                &config.tessellation.name,
                &SceneId::new(scene),
                count,
            )
            .context("building nearby feed")?;
            for id in ids {
                println!("{id}");
            }
        }
    }

    Ok(())
}
