//! Sparse tile store: a dense entry list plus a coordinate reverse index.
//!
//! Entries live in an unordered `Vec<PlacedTile>`; `CoordMap` maps each
//! coordinate to its slot. Removal is swap-remove with an index fixup for the
//! displaced entry, so insert/update/remove stay O(1) amortized.
//!
//! Invariant: no stored entry is ever empty. Clearing a tile to zero removes
//! it, which makes `len() == 0` the sole emptiness test.

use crate::coord::{PlacedTile, TileCoord};
use crate::coord_map::CoordMap;
use crate::error::GridError;
use crate::store::TileRead;
use crate::tile::Tile;

#[derive(Clone)]
pub struct SparseGrid {
    entries: Vec<PlacedTile>,
    index: CoordMap,
}

impl SparseGrid {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: Vec::with_capacity(cap),
            index: CoordMap::with_capacity(cap),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&PlacedTile> {
        self.entries.get(slot)
    }

    #[inline]
    pub fn entries(&self) -> &[PlacedTile] {
        &self.entries
    }

    /// A window of `count` entries starting at `offset`, clamped to the
    /// entry list. Entry order is unspecified and changes on removal.
    pub fn slice(&self, offset: usize, count: usize) -> &[PlacedTile] {
        let start = offset.min(self.entries.len());
        let end = offset.saturating_add(count).min(self.entries.len());
        &self.entries[start..end]
    }

    /// The entry at `coord`, if present.
    #[inline]
    pub fn entry_at(&self, coord: TileCoord) -> Option<&PlacedTile> {
        let slot = self.index.get(coord)? as usize;
        debug_assert_eq!(self.entries[slot].coord(), coord);
        Some(&self.entries[slot])
    }

    /// Set a `size`×`size` square at absolute pixel `(x, y)`, creating the
    /// tile entry on first touch. The square must not cross a tile boundary.
    pub fn set(&mut self, x: u32, y: u32, size: u32) -> Result<(), GridError> {
        let coord = TileCoord::from_pixel(x, y);
        match self.index.get(coord) {
            Some(slot) => self.entries[slot as usize].set_rect(x, y, size),
            None => {
                let mut entry = PlacedTile::new(coord);
                entry.set_rect(x, y, size)?;
                self.push_entry(entry);
                Ok(())
            }
        }
    }

    /// Clear a square. Returns `false` without touching anything when no
    /// tile exists at the coordinate; the rectangle is still validated.
    /// A tile cleared to empty is removed from the store.
    pub fn clear(&mut self, x: u32, y: u32, size: u32) -> Result<bool, GridError> {
        let coord = TileCoord::from_pixel(x, y);
        let Some(slot) = self.index.get(coord) else {
            let mut probe = PlacedTile::new(coord);
            probe.clear_rect(x, y, size)?;
            return Ok(false);
        };
        let slot = slot as usize;
        self.entries[slot].clear_rect(x, y, size)?;
        if self.entries[slot].is_empty() {
            self.take_slot(slot);
        }
        Ok(true)
    }

    /// OR a whole tile into the store. An empty tile is a no-op (the store
    /// never retains empty entries).
    pub fn set_tile(&mut self, tile: &PlacedTile) {
        self.merge_tile(tile.coord(), tile.tile());
    }

    /// Remove a whole tile's pixels. Returns `false` if the coordinate is
    /// absent. A tile cleared to empty is removed from the store.
    pub fn clear_tile(&mut self, tile: &PlacedTile) -> bool {
        self.subtract_tile(tile.coord(), tile.tile())
    }

    /// OR every entry of `other` into this store. Cost is proportional to
    /// `other`'s entry count, never to this store's size.
    pub fn set_from(&mut self, other: &impl TileRead) {
        self.entries.reserve(other.slots());
        self.index.reserve(other.slots());
        other.for_each_tile(|coord, tile| self.merge_tile(coord, tile));
    }

    /// Remove every pixel of `other` from this store.
    pub fn clear_from(&mut self, other: &impl TileRead) {
        other.for_each_tile(|coord, tile| {
            self.subtract_tile(coord, tile);
        });
    }

    /// Whether every pixel of `other` is present here.
    pub fn contains_all(&self, other: &impl TileRead) -> bool {
        let mut all = true;
        other.for_each_tile(|coord, tile| {
            all = all
                && self
                    .entry_at(coord)
                    .is_some_and(|entry| entry.tile().contains_tile(tile));
        });
        all
    }

    /// Remove each named tile from this store and OR it into `dest`,
    /// applied sequentially. Fails with `TileMissing` when a named tile is
    /// absent (including a coordinate named twice).
    pub fn move_to(&mut self, dest: &mut SparseGrid, coords: &[TileCoord]) -> Result<(), GridError> {
        for &coord in coords {
            let entry = self.take(coord).ok_or(GridError::TileMissing {
                x: coord.x,
                y: coord.y,
            })?;
            dest.set_tile(&entry);
        }
        Ok(())
    }

    #[inline]
    pub fn contains_pixel(&self, x: u32, y: u32) -> bool {
        self.entry_at(TileCoord::from_pixel(x, y))
            .is_some_and(|entry| entry.contains_pixel(x, y))
    }

    /// Whether the whole square is present. `false`, not an error, for
    /// malformed or boundary-crossing rectangles.
    #[inline]
    pub fn contains_rect(&self, x: u32, y: u32, size: u32) -> bool {
        self.entry_at(TileCoord::from_pixel(x, y))
            .is_some_and(|entry| entry.contains_rect(x, y, size))
    }

    /// Exact equality: the same coordinate set with bit-identical tiles,
    /// regardless of entry order.
    pub fn is_equal(&self, other: &SparseGrid) -> bool {
        self.len() == other.len()
            && self.entries.iter().all(|entry| {
                other
                    .entry_at(entry.coord())
                    .is_some_and(|theirs| theirs.tile() == entry.tile())
            })
    }

    fn merge_tile(&mut self, coord: TileCoord, tile: &Tile) {
        if tile.is_empty() {
            return;
        }
        match self.index.get(coord) {
            Some(slot) => {
                let entry = &mut self.entries[slot as usize];
                let merged = entry.tile().union(tile);
                *entry.tile_mut() = merged;
            }
            None => self.push_entry(PlacedTile::with_tile(coord, *tile)),
        }
    }

    fn subtract_tile(&mut self, coord: TileCoord, tile: &Tile) -> bool {
        let Some(slot) = self.index.get(coord) else {
            return false;
        };
        let slot = slot as usize;
        let entry = &mut self.entries[slot];
        let remaining = entry.tile().subtract(tile);
        *entry.tile_mut() = remaining;
        if entry.is_empty() {
            self.take_slot(slot);
        }
        true
    }

    fn push_entry(&mut self, entry: PlacedTile) {
        debug_assert!(!entry.is_empty(), "sparse store must not hold empty tiles");
        self.index.insert(entry.coord(), self.entries.len() as u32);
        self.entries.push(entry);
    }

    /// Remove the entry at `coord`, returning it.
    fn take(&mut self, coord: TileCoord) -> Option<PlacedTile> {
        let slot = self.index.remove(coord)? as usize;
        Some(self.swap_out(slot))
    }

    /// Remove the entry in `slot`, fixing up the index.
    fn take_slot(&mut self, slot: usize) {
        let removed = self.swap_out(slot);
        self.index.remove(removed.coord());
    }

    /// Swap-remove `slot` and repoint the displaced entry's index mapping.
    fn swap_out(&mut self, slot: usize) -> PlacedTile {
        let removed = self.entries.swap_remove(slot);
        if let Some(moved) = self.entries.get(slot) {
            self.index.insert(moved.coord(), slot as u32);
        }
        removed
    }
}

impl Default for SparseGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRead for SparseGrid {
    #[inline]
    fn slots(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn tile(&self, slot: usize) -> &Tile {
        self.entries[slot].tile()
    }

    #[inline]
    fn coord(&self, slot: usize) -> TileCoord {
        self.entries[slot].coord()
    }

    #[inline]
    fn slot_at(&self, coord: TileCoord) -> Option<usize> {
        self.index.get(coord).map(|slot| slot as usize)
    }

    /// Free for a sparse store: any live entry is non-empty.
    #[inline]
    fn seed_slot(&self) -> Option<usize> {
        if self.entries.is_empty() { None } else { Some(0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_creates_and_clear_removes_entries() {
        let mut grid = SparseGrid::new();
        assert!(grid.is_empty());

        grid.set(3, 3, 4).unwrap();
        assert_eq!(grid.len(), 1);
        assert!(grid.contains_rect(3, 3, 4));

        // Same tile again does not create a second entry.
        grid.set(10, 10, 2).unwrap();
        assert_eq!(grid.len(), 1);

        // Different tile does.
        grid.set(40, 3, 4).unwrap();
        assert_eq!(grid.len(), 2);

        assert!(grid.clear(3, 3, 4).unwrap());
        assert_eq!(grid.len(), 2, "tile still holds the 10,10 square");
        assert!(grid.clear(10, 10, 2).unwrap());
        assert_eq!(grid.len(), 1, "empty tile must be dropped");
        assert!(!grid.contains_pixel(10, 10));
    }

    #[test]
    fn clear_on_absent_tile_is_a_validated_no_op() {
        let mut grid = SparseGrid::new();
        assert_eq!(grid.clear(100, 100, 4), Ok(false));
        assert_eq!(
            grid.clear(100, 100, 0),
            Err(GridError::InvalidSize { size: 0 })
        );
        assert_eq!(
            grid.clear(14, 0, 4),
            Err(GridError::InvalidCoordinates { x: 14, y: 0 })
        );
    }

    #[test]
    fn swap_remove_fixup_keeps_index_valid() {
        let mut grid = SparseGrid::new();
        for i in 0..8u32 {
            grid.set(i * 16, 0, 8).unwrap();
        }
        // Remove the first entry; the last one is swapped into slot 0.
        assert!(grid.clear(0, 0, 8).unwrap());
        assert_eq!(grid.len(), 7);
        for i in 1..8u32 {
            assert!(grid.contains_rect(i * 16, 0, 8), "entry {i} lost");
        }
        // The displaced entry must still be reachable through the index.
        for entry in grid.entries() {
            assert_eq!(grid.entry_at(entry.coord()).unwrap().coord(), entry.coord());
        }
    }

    #[test]
    fn set_tile_merges_and_skips_empty() {
        let mut grid = SparseGrid::new();
        grid.set_tile(&PlacedTile::new(TileCoord::new(0, 0)));
        assert!(grid.is_empty(), "empty tiles are never stored");

        let mut a = PlacedTile::new(TileCoord::new(2, 2));
        a.set_rect(32, 32, 4).unwrap();
        let mut b = PlacedTile::new(TileCoord::new(2, 2));
        b.set_rect(40, 40, 4).unwrap();

        grid.set_tile(&a);
        grid.set_tile(&b);
        assert_eq!(grid.len(), 1);
        assert!(grid.contains_rect(32, 32, 4));
        assert!(grid.contains_rect(40, 40, 4));

        assert!(grid.clear_tile(&a));
        assert!(grid.contains_rect(40, 40, 4));
        assert!(grid.clear_tile(&b));
        assert!(grid.is_empty());
        assert!(!grid.clear_tile(&a));
    }

    #[test]
    fn move_to_transfers_and_reports_missing() {
        let mut src = SparseGrid::new();
        let mut dest = SparseGrid::new();
        src.set(0, 0, 4).unwrap();
        src.set(16, 0, 4).unwrap();
        dest.set(16, 4, 4).unwrap();

        src.move_to(&mut dest, &[TileCoord::new(0, 0), TileCoord::new(1, 0)])
            .unwrap();
        assert!(src.is_empty());
        assert_eq!(dest.len(), 2);
        assert!(dest.contains_rect(0, 0, 4));
        assert!(dest.contains_rect(16, 0, 4));
        assert!(dest.contains_rect(16, 4, 4), "merged, not replaced");

        assert_eq!(
            dest.move_to(&mut src, &[TileCoord::new(9, 9)]),
            Err(GridError::TileMissing { x: 9, y: 9 })
        );
    }

    #[test]
    fn is_equal_ignores_entry_order() {
        let mut a = SparseGrid::new();
        let mut b = SparseGrid::new();
        a.set(0, 0, 4).unwrap();
        a.set(32, 32, 4).unwrap();
        b.set(32, 32, 4).unwrap();
        b.set(0, 0, 4).unwrap();
        assert!(a.is_equal(&b));
        assert!(b.is_equal(&a));

        b.set(0, 4, 1).unwrap();
        assert!(!a.is_equal(&b));
    }

    #[test]
    fn slice_clamps_to_entry_list() {
        let mut grid = SparseGrid::new();
        for i in 0..5u32 {
            grid.set(i * 16, 0, 1).unwrap();
        }
        assert_eq!(grid.slice(0, 5).len(), 5);
        assert_eq!(grid.slice(3, 10).len(), 2);
        assert_eq!(grid.slice(9, 2).len(), 0);
    }
}
