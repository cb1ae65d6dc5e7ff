//! Tile map byte format.
//!
//! A map is a bare sequence of records with no header or footer:
//!
//! ```text
//! record := len:u8 coord:[u8; len] tx ty tz qx qy qz qw
//! ```
//!
//! The seven trailing fields are little-endian `f32`: the gyro translation
//! followed by the rotation quaternion.

use glam::{DQuat, DVec3};
use warp_core::{Error, GyroVector, Result};

use crate::tile::{Coord, Tile, WorldTile};

/// Bytes of float payload per record.
pub const FLOAT_BYTES: usize = 7 * 4;

/// Append one tile record to `out`.
pub fn encode_tile(tile: &Tile, out: &mut Vec<u8>) -> Result<()> {
    let len = u8::try_from(tile.coord.len()).map_err(|_| {
        Error::Encoding(format!(
            "coord {} has {} symbols, at most 255 fit the length prefix",
            tile.coord,
            tile.coord.len()
        ))
    })?;

    out.reserve(1 + usize::from(len) + FLOAT_BYTES);
    out.push(len);
    tile.coord.write_symbols(out);

    let t = tile.position.translation();
    let q = tile.position.rotation();
    for value in [t.x, t.y, t.z, q.x, q.y, q.z, q.w] {
        out.extend_from_slice(&(value as f32).to_le_bytes());
    }
    Ok(())
}

/// Encode all tiles in order into one buffer.
pub fn encode_tiles(tiles: &[Tile]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(tiles.len() * (8 + FLOAT_BYTES));
    for tile in tiles {
        encode_tile(tile, &mut out)?;
    }
    Ok(out)
}

/// Decode every record. Any malformed record fails the whole decode.
pub fn decode_tiles(bytes: &[u8]) -> Result<Vec<Tile>> {
    let mut reader = Reader::new(bytes);
    let mut tiles = Vec::new();
    while !reader.is_empty() {
        tiles.push(reader.read_tile()?);
    }
    Ok(tiles)
}

/// Decode every record and place it on the flat lookup grid.
pub fn decode_world_tiles(bytes: &[u8], cell_width: f64) -> Result<Vec<WorldTile>> {
    Ok(decode_tiles(bytes)?
        .iter()
        .map(|tile| WorldTile::from_tile(tile, cell_width))
        .collect())
}

/// Cursor over a record stream.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn take(&mut self, count: usize, what: &str) -> Result<&'a [u8]> {
        let remaining = self.bytes.len() - self.offset;
        if count > remaining {
            return Err(Error::CorruptData(format!(
                "{what} at byte {} needs {count} bytes, {remaining} left",
                self.offset
            )));
        }
        let slice = &self.bytes[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_f32(&mut self) -> Result<f64> {
        let raw = self.take(4, "float field")?;
        Ok(f64::from(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])))
    }

    fn read_tile(&mut self) -> Result<Tile> {
        let len = self.take(1, "length prefix")?[0];
        let coord = Coord::parse(self.take(usize::from(len), "coord")?)?;

        let translation = DVec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?);
        let rotation = DQuat::from_xyzw(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        );
        Ok(Tile::new(coord, GyroVector::new(translation, rotation)))
    }
}
