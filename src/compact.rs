//! Dense tile store: a fixed rectangular canvas of tiles.
//!
//! The whole array is allocated at construction and slots are never removed;
//! an all-zero tile simply means empty. A running count of non-empty slots
//! keeps `is_empty` O(1) without scanning.

use crate::coord::{PlacedTile, TileCoord, local_rect};
use crate::error::GridError;
use crate::store::TileRead;
use crate::tile::{TILE_SIZE, Tile};

#[derive(Clone)]
pub struct CompactGrid {
    tiles: Vec<Tile>,
    /// Canvas width in tiles.
    width: u32,
    /// Canvas height in tiles.
    height: u32,
    /// Number of non-empty slots.
    live: usize,
}

impl CompactGrid {
    /// A canvas of `width` × `height` tiles (16× that in pixels), all empty.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tiles: vec![Tile::EMPTY; width as usize * height as usize],
            width,
            height,
            live: 0,
        }
    }

    #[inline]
    pub fn width_tiles(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height_tiles(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn width_pixels(&self) -> u32 {
        self.width * TILE_SIZE
    }

    #[inline]
    pub fn height_pixels(&self) -> u32 {
        self.height * TILE_SIZE
    }

    /// Always the full grid size; slots are never removed.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of non-empty tile slots.
    #[inline]
    pub fn live_tiles(&self) -> usize {
        self.live
    }

    #[inline]
    fn slot_of(&self, coord: TileCoord) -> Option<usize> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some((coord.x + coord.y * self.width) as usize)
    }

    fn slot_of_pixel(&self, x: u32, y: u32) -> Result<(usize, TileCoord), GridError> {
        let coord = TileCoord::from_pixel(x, y);
        let slot = self
            .slot_of(coord)
            .ok_or(GridError::InvalidCoordinates { x, y })?;
        Ok((slot, coord))
    }

    /// Track an empty/non-empty transition of one slot.
    fn update_live<R>(
        &mut self,
        slot: usize,
        mutate: impl FnOnce(&mut Tile) -> R,
    ) -> R {
        let was_empty = self.tiles[slot].is_empty();
        let out = mutate(&mut self.tiles[slot]);
        let is_empty = self.tiles[slot].is_empty();
        if was_empty && !is_empty {
            self.live += 1;
        } else if !was_empty && is_empty {
            self.live -= 1;
        }
        out
    }

    /// Set a `size`×`size` square at absolute pixel `(x, y)`. The square must
    /// lie inside the canvas and not cross a tile boundary.
    pub fn set(&mut self, x: u32, y: u32, size: u32) -> Result<(), GridError> {
        let (slot, coord) = self.slot_of_pixel(x, y)?;
        let (lx, ly) = local_rect(coord, x, y, size)?;
        self.update_live(slot, |tile| tile.set_rect(lx, ly, size))
    }

    /// Clear a square. Returns `false` when the containing tile was already
    /// empty (a no-op); out-of-canvas coordinates are an error.
    pub fn clear(&mut self, x: u32, y: u32, size: u32) -> Result<bool, GridError> {
        let (slot, coord) = self.slot_of_pixel(x, y)?;
        let (lx, ly) = local_rect(coord, x, y, size)?;
        if self.tiles[slot].is_empty() {
            return Ok(false);
        }
        self.update_live(slot, |tile| tile.clear_rect(lx, ly, size))?;
        Ok(true)
    }

    /// OR a whole tile into its canvas slot.
    pub fn set_tile(&mut self, tile: &PlacedTile) -> Result<(), GridError> {
        let slot = self.slot_of(tile.coord()).ok_or_else(|| {
            let (x, y) = tile.coord().origin();
            GridError::InvalidCoordinates { x, y }
        })?;
        self.update_live(slot, |mine| {
            let merged = mine.union(tile.tile());
            *mine = merged;
        });
        Ok(())
    }

    /// Remove a whole tile's pixels from its canvas slot. Returns `false`
    /// when the slot was already empty.
    pub fn clear_tile(&mut self, tile: &PlacedTile) -> Result<bool, GridError> {
        let slot = self.slot_of(tile.coord()).ok_or_else(|| {
            let (x, y) = tile.coord().origin();
            GridError::InvalidCoordinates { x, y }
        })?;
        if self.tiles[slot].is_empty() {
            return Ok(false);
        }
        self.update_live(slot, |mine| {
            let remaining = mine.subtract(tile.tile());
            *mine = remaining;
        });
        Ok(true)
    }

    /// OR every entry of `other` into the canvas, applied sequentially.
    /// An entry outside the canvas fails with `InvalidCoordinates`.
    pub fn set_from(&mut self, other: &impl TileRead) -> Result<(), GridError> {
        let mut result = Ok(());
        other.for_each_tile(|coord, tile| {
            if result.is_ok() {
                result = self.set_tile(&PlacedTile::with_tile(coord, *tile));
            }
        });
        result
    }

    /// Remove every pixel of `other` from the canvas.
    pub fn clear_from(&mut self, other: &impl TileRead) -> Result<(), GridError> {
        let mut result = Ok(());
        other.for_each_tile(|coord, tile| {
            if result.is_ok() {
                result = self.clear_tile(&PlacedTile::with_tile(coord, *tile)).map(|_| ());
            }
        });
        result
    }

    /// Whether every pixel of `other` is present here. Entries outside the
    /// canvas make this `false`, not an error.
    pub fn contains_all(&self, other: &impl TileRead) -> bool {
        let mut all = true;
        other.for_each_tile(|coord, tile| {
            all = all
                && self
                    .slot_of(coord)
                    .is_some_and(|slot| self.tiles[slot].contains_tile(tile));
        });
        all
    }

    /// `false`, not an error, outside the canvas.
    #[inline]
    pub fn contains_pixel(&self, x: u32, y: u32) -> bool {
        let coord = TileCoord::from_pixel(x, y);
        self.slot_of(coord).is_some_and(|slot| {
            self.tiles[slot].contains_pixel(x % TILE_SIZE, y % TILE_SIZE)
        })
    }

    /// `false`, not an error, for malformed or out-of-canvas rectangles.
    pub fn contains_rect(&self, x: u32, y: u32, size: u32) -> bool {
        let coord = TileCoord::from_pixel(x, y);
        let Some(slot) = self.slot_of(coord) else {
            return false;
        };
        match local_rect(coord, x, y, size) {
            Ok((lx, ly)) => self.tiles[slot].contains_rect(lx, ly, size),
            Err(_) => false,
        }
    }

    /// Exact equality: same canvas dimensions and bit-identical slots.
    pub fn is_equal(&self, other: &CompactGrid) -> bool {
        self.width == other.width && self.height == other.height && self.tiles == other.tiles
    }
}

impl TileRead for CompactGrid {
    #[inline]
    fn slots(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    fn tile(&self, slot: usize) -> &Tile {
        &self.tiles[slot]
    }

    #[inline]
    fn coord(&self, slot: usize) -> TileCoord {
        TileCoord::new(slot as u32 % self.width, slot as u32 / self.width)
    }

    #[inline]
    fn slot_at(&self, coord: TileCoord) -> Option<usize> {
        self.slot_of(coord)
    }
}
