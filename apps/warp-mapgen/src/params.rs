//! Command line parameters.

use std::path::PathBuf;

use glam::DVec2;
use warp_world::{GeneratorConfig, WorldConfig};

/// Map generation parameters (from CLI or defaults).
#[derive(Debug, Clone, Default)]
pub struct MapgenParams {
    pub world: WorldConfig,
    /// Flat positions to resolve after loading.
    pub queries: Vec<DVec2>,
}

impl MapgenParams {
    /// Parse parameters from command line arguments.
    pub fn from_args() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Parse parameters from an argument list without the program name.
    ///
    /// Unknown flags and unparsable values are ignored.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut params = Self::default();
        let args: Vec<String> = args.into_iter().collect();
        let generator = &mut params.world.generator;

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--n" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        generator.n = v;
                        i += 1;
                    }
                }
                "--depth" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        generator.depth = v;
                        i += 1;
                    }
                }
                "--3d" => generator.use_3d = true,
                "--maps-dir" => {
                    if let Some(v) = value {
                        params.world.maps_dir = PathBuf::from(v);
                        i += 1;
                    }
                }
                "--query" => {
                    if let Some(q) = value.and_then(|v| parse_point(v)) {
                        params.queries.push(q);
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        params
    }

    pub fn generator(&self) -> GeneratorConfig {
        self.world.generator
    }
}

/// Parse `"X,Z"` into a flat position.
fn parse_point(s: &str) -> Option<DVec2> {
    let (x, z) = s.split_once(',')?;
    Some(DVec2::new(x.trim().parse().ok()?, z.trim().parse().ok()?))
}
