//! Direction symbols, coords and tiles.

use std::fmt;
use std::str::FromStr;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use warp_core::{Error, GyroVector, Result};

/// One step of a tile coord.
///
/// `L`/`R` move along X, `F`/`B` along Y and `D`/`U` along Z. `C` marks the
/// root and does not move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Center,
    Left,
    Right,
    Up,
    Down,
    Forward,
    Back,
}

impl Direction {
    /// Spawn order of the planar generator.
    pub const PLANAR: [Self; 4] = [Self::Right, Self::Left, Self::Up, Self::Down];
    /// Spawn order of the 3D lattice generator.
    pub const LATTICE: [Self; 6] = [
        Self::Right,
        Self::Left,
        Self::Up,
        Self::Down,
        Self::Back,
        Self::Forward,
    ];

    /// ASCII symbol stored in map files.
    #[inline]
    pub const fn symbol(self) -> u8 {
        match self {
            Self::Center => b'C',
            Self::Left => b'L',
            Self::Right => b'R',
            Self::Up => b'U',
            Self::Down => b'D',
            Self::Forward => b'F',
            Self::Back => b'B',
        }
    }

    #[inline]
    pub const fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            b'C' => Some(Self::Center),
            b'L' => Some(Self::Left),
            b'R' => Some(Self::Right),
            b'U' => Some(Self::Up),
            b'D' => Some(Self::Down),
            b'F' => Some(Self::Forward),
            b'B' => Some(Self::Back),
            _ => None,
        }
    }

    /// The step that undoes this one. The root marker is its own opposite.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Center => Self::Center,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Forward => Self::Back,
            Self::Back => Self::Forward,
        }
    }

    /// Gyro translation of one step.
    pub fn shift(self, cell_width: f64) -> DVec3 {
        let w = cell_width;
        match self {
            Self::Center => DVec3::ZERO,
            Self::Left => DVec3::new(-w, 0.0, 0.0),
            Self::Right => DVec3::new(w, 0.0, 0.0),
            Self::Forward => DVec3::new(0.0, -w, 0.0),
            Self::Back => DVec3::new(0.0, w, 0.0),
            Self::Down => DVec3::new(0.0, 0.0, -w),
            Self::Up => DVec3::new(0.0, 0.0, w),
        }
    }

    /// Flat lookup displacement of one step. Vertical steps do not move.
    pub fn flat_offset(self, cell_width: f64) -> DVec2 {
        let w = cell_width;
        match self {
            Self::Left => DVec2::new(-w, 0.0),
            Self::Right => DVec2::new(w, 0.0),
            Self::Down => DVec2::new(0.0, -w),
            Self::Up => DVec2::new(0.0, w),
            Self::Center | Self::Forward | Self::Back => DVec2::ZERO,
        }
    }
}

/// Path label of the breadth-first walk that first reached a tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord(Vec<Direction>);

impl Coord {
    /// Coord of the root tile, `"C"`.
    pub fn root() -> Self {
        Self(vec![Direction::Center])
    }

    pub fn from_directions(directions: Vec<Direction>) -> Self {
        Self(directions)
    }

    /// This coord extended by one step.
    pub fn child(&self, direction: Direction) -> Self {
        let mut directions = Vec::with_capacity(self.0.len() + 1);
        directions.extend_from_slice(&self.0);
        directions.push(direction);
        Self(directions)
    }

    #[inline]
    pub fn directions(&self) -> &[Direction] {
        &self.0
    }

    #[inline]
    pub fn last(&self) -> Option<Direction> {
        self.0.last().copied()
    }

    /// Number of symbols, root marker included.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of steps away from the root, root marker excluded.
    pub fn depth(&self) -> usize {
        self.0.iter().filter(|d| **d != Direction::Center).count()
    }

    /// Flat position reached by summing each step's flat offset.
    pub fn flat_position(&self, cell_width: f64) -> DVec2 {
        self.0
            .iter()
            .fold(DVec2::ZERO, |acc, d| acc + d.flat_offset(cell_width))
    }

    /// Parse ASCII direction symbols.
    pub fn parse(symbols: &[u8]) -> Result<Self> {
        symbols
            .iter()
            .map(|&s| {
                Direction::from_symbol(s).ok_or_else(|| {
                    Error::CorruptData(format!("unknown direction symbol 0x{s:02x}"))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Append the ASCII symbols to `out`.
    pub fn write_symbols(&self, out: &mut Vec<u8>) {
        out.extend(self.0.iter().map(|d| d.symbol()));
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.0 {
            write!(f, "{}", char::from(d.symbol()))?;
        }
        Ok(())
    }
}

impl FromStr for Coord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s.as_bytes())
    }
}

/// A generated tile: the coord that discovered it and its position.
///
/// Identity is the position. Several coords may reach the same tile; only
/// the first one is kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Coord,
    pub position: GyroVector,
}

impl Tile {
    pub fn new(coord: Coord, position: GyroVector) -> Self {
        Self { coord, position }
    }

    /// The root tile at the origin.
    pub fn root() -> Self {
        Self::new(Coord::root(), GyroVector::IDENTITY)
    }
}

/// A loaded tile placed on the flat lookup grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldTile {
    /// Lower corner of the tile's flat cell.
    pub flat_position: DVec2,
    pub position: GyroVector,
}

impl WorldTile {
    pub fn new(flat_position: DVec2, position: GyroVector) -> Self {
        Self {
            flat_position,
            position,
        }
    }

    /// Place a tile by walking its coord.
    pub fn from_tile(tile: &Tile, cell_width: f64) -> Self {
        Self::new(tile.coord.flat_position(cell_width), tile.position)
    }

    /// Whether `query` lies in `[flat_position, flat_position + cell_width)`.
    #[inline]
    pub fn contains(&self, query: DVec2, cell_width: f64) -> bool {
        let min = self.flat_position;
        let max = min + DVec2::splat(cell_width);
        min.x <= query.x && query.x < max.x && min.y <= query.y && query.y < max.y
    }
}
