//! Tile-grid coordinates and the coordinate-qualified tile wrapper.
//!
//! A `TileCoord` is a pixel coordinate divided by 16, kept as two explicit
//! `u32` fields so two distinct coordinates can never collide and both axes
//! are recoverable without mask/shift arithmetic.

use crate::error::GridError;
use crate::tile::{TILE_SIZE, Tile};

/// The 4 cardinal directions a dilation can spill in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Up = 0,    // (tx, ty-1)
    Down = 1,  // (tx, ty+1)
    Left = 2,  // (tx-1, ty)
    Right = 3, // (tx+1, ty)
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The tile-coordinate offset for this direction.
    #[inline]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// A tile-grid coordinate (pixel coordinate / 16).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    #[inline]
    pub const fn new(x: u32, y: u32) -> TileCoord {
        TileCoord { x, y }
    }

    /// The coordinate of the tile containing pixel `(px, py)`.
    #[inline]
    pub const fn from_pixel(px: u32, py: u32) -> TileCoord {
        TileCoord {
            x: px / TILE_SIZE,
            y: py / TILE_SIZE,
        }
    }

    /// The pixel coordinate of this tile's top-left corner.
    #[inline]
    pub const fn origin(self) -> (u32, u32) {
        (self.x * TILE_SIZE, self.y * TILE_SIZE)
    }

    /// The adjacent coordinate in `dir`, or `None` past the edge of the
    /// coordinate space (spills there are simply dropped).
    #[inline]
    pub fn neighbor(self, dir: Direction) -> Option<TileCoord> {
        let (dx, dy) = dir.offset();
        Some(TileCoord {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Single-word key for the slot index. Distinct coordinates map to
    /// distinct keys (x in the low half, y in the high half).
    #[inline]
    pub(crate) const fn packed(self) -> u64 {
        ((self.y as u64) << 32) | self.x as u64
    }
}

/// Resolve an absolute-pixel square to its offset inside `coord`'s tile.
///
/// Fails fast if the square's size is invalid, if it does not start inside
/// `coord`, or if it crosses out of `coord`'s tile.
pub(crate) fn local_rect(
    coord: TileCoord,
    px: u32,
    py: u32,
    size: u32,
) -> Result<(u32, u32), GridError> {
    if size == 0 || size > TILE_SIZE {
        return Err(GridError::InvalidSize { size });
    }
    let end_x = px
        .checked_add(size - 1)
        .ok_or(GridError::InvalidCoordinates { x: px, y: py })?;
    let end_y = py
        .checked_add(size - 1)
        .ok_or(GridError::InvalidCoordinates { x: px, y: py })?;
    if TileCoord::from_pixel(px, py) != coord || TileCoord::from_pixel(end_x, end_y) != coord {
        return Err(GridError::InvalidCoordinates { x: px, y: py });
    }
    Ok((px % TILE_SIZE, py % TILE_SIZE))
}

/// A `Tile` fixed at a tile-grid coordinate.
///
/// The coordinate is immutable for the instance's life. Every operation that
/// takes pixel coordinates, and every binary operation between two placed
/// tiles, must resolve to this coordinate; a mismatch is a programming error
/// and fails with `InvalidCoordinates` rather than silently corrupting
/// geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedTile {
    coord: TileCoord,
    tile: Tile,
}

impl PlacedTile {
    /// An empty tile at `coord`.
    pub const fn new(coord: TileCoord) -> PlacedTile {
        PlacedTile {
            coord,
            tile: Tile::EMPTY,
        }
    }

    pub const fn with_tile(coord: TileCoord, tile: Tile) -> PlacedTile {
        PlacedTile { coord, tile }
    }

    #[inline]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    #[inline]
    pub const fn tile(&self) -> &Tile {
        &self.tile
    }

    #[inline]
    pub(crate) fn tile_mut(&mut self) -> &mut Tile {
        &mut self.tile
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tile.is_empty()
    }

    fn check_coord(&self, other: &PlacedTile) -> Result<(), GridError> {
        if self.coord != other.coord {
            let (x, y) = other.coord.origin();
            return Err(GridError::InvalidCoordinates { x, y });
        }
        Ok(())
    }

    /// Set a square given in absolute pixel coordinates.
    pub fn set_rect(&mut self, px: u32, py: u32, size: u32) -> Result<(), GridError> {
        let (lx, ly) = local_rect(self.coord, px, py, size)?;
        self.tile.set_rect(lx, ly, size)
    }

    /// Clear a square given in absolute pixel coordinates.
    pub fn clear_rect(&mut self, px: u32, py: u32, size: u32) -> Result<(), GridError> {
        let (lx, ly) = local_rect(self.coord, px, py, size)?;
        self.tile.clear_rect(lx, ly, size)
    }

    /// Whether the absolute pixel `(px, py)` falls in this tile and is set.
    pub fn contains_pixel(&self, px: u32, py: u32) -> bool {
        if TileCoord::from_pixel(px, py) != self.coord {
            return false;
        }
        self.tile.contains_pixel(px % TILE_SIZE, py % TILE_SIZE)
    }

    /// Whether the absolute-pixel square falls in this tile and is fully set.
    /// `false`, not an error, when it lies outside.
    pub fn contains_rect(&self, px: u32, py: u32, size: u32) -> bool {
        match local_rect(self.coord, px, py, size) {
            Ok((lx, ly)) => self.tile.contains_rect(lx, ly, size),
            Err(_) => false,
        }
    }

    /// OR `other` into this tile. Coordinates must match.
    pub fn merge(&mut self, other: &PlacedTile) -> Result<(), GridError> {
        self.check_coord(other)?;
        self.tile = self.tile.union(&other.tile);
        Ok(())
    }

    /// Remove `other`'s pixels from this tile. Coordinates must match.
    pub fn subtract(&mut self, other: &PlacedTile) -> Result<(), GridError> {
        self.check_coord(other)?;
        self.tile = self.tile.subtract(&other.tile);
        Ok(())
    }

    /// Whether this tile contains every pixel of `other`. Coordinates must
    /// match.
    pub fn contains(&self, other: &PlacedTile) -> Result<bool, GridError> {
        self.check_coord(other)?;
        Ok(self.tile.contains_tile(&other.tile))
    }
}
