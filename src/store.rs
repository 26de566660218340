//! The read-only seam shared by both tile stores.
//!
//! The connectivity engine and the bulk store operations only need "a set of
//! tiles addressable by coordinate": dense slot enumeration plus coordinate
//! lookup. Both `SparseGrid` and `CompactGrid` implement this.

use crate::coord::TileCoord;
use crate::tile::Tile;

pub trait TileRead {
    /// Number of addressable slots. Compact stores count every slot of the
    /// canvas, empty or not; sparse stores count only live entries.
    fn slots(&self) -> usize;

    /// The tile stored in `slot`. `slot` must be `< slots()`.
    fn tile(&self, slot: usize) -> &Tile;

    /// The coordinate of `slot`. `slot` must be `< slots()`.
    fn coord(&self, slot: usize) -> TileCoord;

    /// The slot holding `coord`, if any.
    fn slot_at(&self, coord: TileCoord) -> Option<usize>;

    /// Any slot holding a non-empty tile, or `None` for an empty store.
    ///
    /// The default is a linear scan; stores that can do better (a sparse
    /// store's first entry) override it. The choice does not affect
    /// connectivity results, only which pixel seeds the flood fill.
    fn seed_slot(&self) -> Option<usize> {
        (0..self.slots()).find(|&slot| !self.tile(slot).is_empty())
    }

    /// The tile stored at `coord`, if any.
    #[inline]
    fn tile_at(&self, coord: TileCoord) -> Option<&Tile> {
        self.slot_at(coord).map(|slot| self.tile(slot))
    }

    /// Visit every non-empty tile with its coordinate.
    fn for_each_tile<F: FnMut(TileCoord, &Tile)>(&self, mut f: F)
    where
        Self: Sized,
    {
        for slot in 0..self.slots() {
            let tile = self.tile(slot);
            if !tile.is_empty() {
                f(self.coord(slot), tile);
            }
        }
    }
}
