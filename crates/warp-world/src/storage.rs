//! Map files on disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use warp_core::Result;

use crate::codec::{decode_world_tiles, encode_tiles};
use crate::generation::GeneratorConfig;
use crate::tile::{Tile, WorldTile};

/// Path of the map `config` generates under `maps_dir`.
pub fn map_path(maps_dir: &Path, config: &GeneratorConfig) -> PathBuf {
    maps_dir.join(config.map_file_name())
}

/// Encode `tiles` and replace the file at `path` with them.
///
/// The whole buffer is written to a sibling temp file which is then renamed
/// over the target, so readers never see a partial map.
#[tracing::instrument(level = "trace", skip_all)]
pub fn write_tile_map(path: &Path, tiles: &[Tile]) -> Result<()> {
    let bytes = encode_tiles(tiles)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = write_synced(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!(
        path = %path.display(),
        tiles = tiles.len(),
        bytes = bytes.len(),
        "Wrote tile map"
    );
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Read and decode the map at `path`.
#[tracing::instrument(level = "trace", skip_all)]
pub fn read_tile_map(path: &Path, cell_width: f64) -> Result<Vec<WorldTile>> {
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read tile map");
    decode_world_tiles(&bytes, cell_width)
}
