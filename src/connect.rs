//! Connectivity queries over a tile store.
//!
//! `is_connected` runs a bit-parallel flood fill: a per-slot frontier of
//! tiles grows by one-pixel dilation per visit, spilling across tile edges
//! into neighbor slots, always clipped against the actually stored pixels.
//! A worklist keeps each round touching only slots whose frontier changed.
//! `is_adjacent` is the cheap incremental form used before admitting a new
//! square: one dilation, at most five store lookups, no flood fill.
//!
//! Both queries are read-only and never fail except by propagating rectangle
//! validation from the primitives they call.

use crate::coord::{Direction, TileCoord, local_rect};
use crate::error::GridError;
use crate::store::TileRead;
use crate::tile::{GrownTile, Tile};

/// Re-materialize the spill in `dir` as a tile positioned at the receiving
/// neighbor's edge.
#[inline]
fn spill_tile(grown: &GrownTile, dir: Direction) -> Tile {
    match dir {
        Direction::Up => Tile::from_row(15, grown.up),
        Direction::Down => Tile::from_row(0, grown.down),
        Direction::Left => Tile::from_column(15, grown.left),
        Direction::Right => Tile::from_column(0, grown.right),
    }
}

#[inline]
fn spill_is_empty(grown: &GrownTile, dir: Direction) -> bool {
    match dir {
        Direction::Up => grown.up == 0,
        Direction::Down => grown.down == 0,
        Direction::Left => grown.left == 0,
        Direction::Right => grown.right == 0,
    }
}

/// Whether the store's on pixels form a single 4-connected region.
///
/// An empty store is vacuously connected. The seed pixel choice does not
/// affect the result; a flood fill from any pixel of a connected region
/// reaches the whole region.
pub fn is_connected(store: &impl TileRead) -> bool {
    let slots = store.slots();
    let Some(seed) = store.seed_slot() else {
        return true;
    };

    let mut frontier = vec![Tile::EMPTY; slots];
    frontier[seed] = store.tile(seed).first_pixel();

    let mut work = vec![seed];
    let mut queued = vec![false; slots];
    queued[seed] = true;
    let mut visits = 0usize;

    // The frontier only ever gains pixels and is bounded by the store's
    // total population, so the worklist drains in finitely many visits.
    while let Some(slot) = work.pop() {
        queued[slot] = false;
        visits += 1;
        let grown = frontier[slot].grow();

        // In-tile growth, clipped to pixels actually stored.
        let gained = grown
            .center
            .intersect(store.tile(slot))
            .subtract(&frontier[slot]);
        if !gained.is_empty() {
            frontier[slot] = frontier[slot].union(&gained);
            if !queued[slot] {
                queued[slot] = true;
                work.push(slot);
            }
        }

        // Edge spills into the four neighbor slots. A spill with no
        // receiving slot (off the map, or absent from a sparse store) drops.
        let coord = store.coord(slot);
        for dir in Direction::ALL {
            if spill_is_empty(&grown, dir) {
                continue;
            }
            let Some(neighbor) = coord.neighbor(dir) else {
                continue;
            };
            let Some(target) = store.slot_at(neighbor) else {
                continue;
            };
            let gained = spill_tile(&grown, dir)
                .intersect(store.tile(target))
                .subtract(&frontier[target]);
            if !gained.is_empty() {
                frontier[target] = frontier[target].union(&gained);
                if !queued[target] {
                    queued[target] = true;
                    work.push(target);
                }
            }
        }
    }

    log::trace!("flood fill reached fixed point after {visits} visits over {slots} slots");

    // Fixed point reached: connected iff the fill claimed every stored pixel.
    (0..slots).all(|slot| frontier[slot] == *store.tile(slot))
}

/// Whether a candidate `size`×`size` square at pixel `(x, y)` touches any
/// existing pixel of the store (overlap counts; diagonal contact does not).
///
/// The candidate must not cross a tile boundary. This is the O(1)-lookups
/// admission test; it agrees with re-running [`is_connected`] after adding
/// the candidate whenever the store already holds one connected region.
pub fn is_adjacent(
    store: &impl TileRead,
    x: u32,
    y: u32,
    size: u32,
) -> Result<bool, GridError> {
    let coord = TileCoord::from_pixel(x, y);
    let (lx, ly) = local_rect(coord, x, y, size)?;
    let mut candidate = Tile::EMPTY;
    candidate.set_rect(lx, ly, size)?;
    let grown = candidate.grow();

    if let Some(tile) = store.tile_at(coord)
        && tile.overlaps(&grown.center)
    {
        return Ok(true);
    }

    for dir in Direction::ALL {
        if spill_is_empty(&grown, dir) {
            continue;
        }
        let Some(neighbor) = coord.neighbor(dir) else {
            continue;
        };
        if let Some(tile) = store.tile_at(neighbor)
            && tile.overlaps(&spill_tile(&grown, dir))
        {
            return Ok(true);
        }
    }
    Ok(false)
}
