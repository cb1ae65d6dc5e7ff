//! Warp tile map generator
//!
//! Generates the tile map for one tiling, writes it under the maps
//! directory, loads it back and resolves flat positions to gyrovectors.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p warp-mapgen -- [OPTIONS]
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Hyperbolic default: 8 squares around each vertex
//! cargo run -p warp-mapgen
//!
//! # Pentagonal tiling, 4 rounds, resolve two positions
//! cargo run -p warp-mapgen -- --n 5 --depth 4 --query 0.2,0.3 --query 1.1,-0.4
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod params;

use tracing::info;
use tracing_subscriber::EnvFilter;
use warp_world::TileWorld;

use crate::params::MapgenParams;

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let params = MapgenParams::from_args();
    let generator = params.generator();
    info!(
        "Generating map: n={} depth={} 3d={} dir={}",
        generator.n,
        generator.depth,
        generator.use_3d,
        params.world.maps_dir.display()
    );

    let world = TileWorld::from_config(&params.world)?;
    let model = world.model();
    info!(
        "Map ready: {} tiles, K={}, cell width={:.6}, klein scale={:.6}",
        world.tilemap().len(),
        model.k(),
        model.cell_width(),
        model.klein_scale()
    );

    for query in &params.queries {
        let g = world.gyro_at(*query);
        let t = g.translation();
        let q = g.rotation();
        info!(
            "({:.4}, {:.4}) -> translation ({:.6}, {:.6}, {:.6}) rotation ({:.6}, {:.6}, {:.6}, {:.6})",
            query.x, query.y, t.x, t.y, t.z, q.x, q.y, q.z, q.w
        );
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        "Warp tile map generator

USAGE:
    cargo run -p warp-mapgen -- [OPTIONS]

GENERATION OPTIONS:
    --n <N>             Squares around each vertex, at least 2 (default: 8)
                        4 is flat, below 4 spherical, above 4 hyperbolic
    --depth <N>         Expansion rounds, at most 254 (default: 6)
    --3d                Also expand along the vertical axis
    --maps-dir <DIR>    Directory map files are written to (default: Levels)

QUERY OPTIONS:
    --query <X,Z>       Resolve a flat position after loading (repeatable)

OTHER:
    -h, --help          Print this help message

EXAMPLES:
    # Default hyperbolic map
    cargo run -p warp-mapgen

    # Flat square map with a lookup
    cargo run -p warp-mapgen -- --n 4 --depth 2 --query 3,1

ENVIRONMENT VARIABLES:
    RUST_LOG            Set log level (e.g., info, debug, trace)"
    );
}
