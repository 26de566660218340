//! The 16×16 bit tile primitive.
//!
//! A tile is 256 bits stored as one `u16` row per pixel row: bit `x` of
//! `rows[y]` is pixel `(x, y)`, with `y` growing downward. Row-per-word
//! storage keeps horizontal dilation a plain shift — a `u16` shift cannot
//! bleed into the adjacent row, so no edge mask is needed to stop wrap.

use crate::error::GridError;

/// Tile side length in pixels.
pub const TILE_SIZE: u32 = 16;

/// A 16×16 boolean pixel grid. Pure value type with no coordinate knowledge.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    rows: [u16; TILE_SIZE as usize],
}

/// Result of one-step 4-directional dilation: the grown in-bounds center plus
/// the four single-row/column spills that crossed the tile edge.
///
/// `up`/`down` are pixel rows destined for the neighbor's bottom/top row.
/// `left`/`right` are column masks (bit `y` = pixel row `y`) destined for the
/// neighbor's rightmost/leftmost column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrownTile {
    pub center: Tile,
    pub up: u16,
    pub down: u16,
    pub left: u16,
    pub right: u16,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        rows: [0; TILE_SIZE as usize],
    };

    pub const FULL: Tile = Tile {
        rows: [u16::MAX; TILE_SIZE as usize],
    };

    fn validate_rect(x: u32, y: u32, size: u32) -> Result<u16, GridError> {
        if size == 0 || size > TILE_SIZE {
            return Err(GridError::InvalidSize { size });
        }
        if x >= TILE_SIZE || y >= TILE_SIZE || x + size > TILE_SIZE || y + size > TILE_SIZE {
            return Err(GridError::InvalidCoordinates { x, y });
        }
        Ok((((1u32 << size) - 1) << x) as u16)
    }

    /// Set a `size`×`size` square with its top-left corner at `(x, y)`.
    /// The square must lie fully inside the tile; no clamping.
    pub fn set_rect(&mut self, x: u32, y: u32, size: u32) -> Result<(), GridError> {
        let mask = Self::validate_rect(x, y, size)?;
        for row in &mut self.rows[y as usize..(y + size) as usize] {
            *row |= mask;
        }
        Ok(())
    }

    /// Clear a `size`×`size` square with its top-left corner at `(x, y)`.
    pub fn clear_rect(&mut self, x: u32, y: u32, size: u32) -> Result<(), GridError> {
        let mask = Self::validate_rect(x, y, size)?;
        for row in &mut self.rows[y as usize..(y + size) as usize] {
            *row &= !mask;
        }
        Ok(())
    }

    #[inline]
    pub fn contains_pixel(&self, x: u32, y: u32) -> bool {
        if x >= TILE_SIZE || y >= TILE_SIZE {
            return false;
        }
        (self.rows[y as usize] >> x) & 1 == 1
    }

    /// Whether every pixel of the square is set. Returns `false` (not an
    /// error) for out-of-bounds rectangles so callers can pre-check cheaply.
    pub fn contains_rect(&self, x: u32, y: u32, size: u32) -> bool {
        let Ok(mask) = Self::validate_rect(x, y, size) else {
            return false;
        };
        self.rows[y as usize..(y + size) as usize]
            .iter()
            .all(|&row| row & mask == mask)
    }

    #[inline]
    pub fn contains_tile(&self, other: &Tile) -> bool {
        self.rows
            .iter()
            .zip(&other.rows)
            .all(|(&a, &b)| a & b == b)
    }

    #[inline]
    pub fn union(&self, other: &Tile) -> Tile {
        let mut rows = self.rows;
        for (row, &o) in rows.iter_mut().zip(&other.rows) {
            *row |= o;
        }
        Tile { rows }
    }

    #[inline]
    pub fn intersect(&self, other: &Tile) -> Tile {
        let mut rows = self.rows;
        for (row, &o) in rows.iter_mut().zip(&other.rows) {
            *row &= o;
        }
        Tile { rows }
    }

    /// AND-NOT: the pixels of `self` that are not in `other`.
    #[inline]
    pub fn subtract(&self, other: &Tile) -> Tile {
        let mut rows = self.rows;
        for (row, &o) in rows.iter_mut().zip(&other.rows) {
            *row &= !o;
        }
        Tile { rows }
    }

    #[inline]
    pub fn invert(&self) -> Tile {
        let mut rows = self.rows;
        for row in &mut rows {
            *row = !*row;
        }
        Tile { rows }
    }

    /// Whether any pixel is shared with `other`. This non-zero-AND test is
    /// the primitive behind every adjacency check.
    #[inline]
    pub fn overlaps(&self, other: &Tile) -> bool {
        self.rows.iter().zip(&other.rows).any(|(&a, &b)| a & b != 0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }

    #[inline]
    pub fn population(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    /// A tile holding exactly one of this tile's pixels, chosen
    /// deterministically (lowest non-empty row, then lowest set bit), or an
    /// empty tile. Used to seed the flood fill.
    pub fn first_pixel(&self) -> Tile {
        for (y, &row) in self.rows.iter().enumerate() {
            if row != 0 {
                let mut out = Tile::EMPTY;
                out.rows[y] = row & row.wrapping_neg();
                return out;
            }
        }
        Tile::EMPTY
    }

    /// A tile whose row `y` holds `bits` and is otherwise empty.
    #[inline]
    pub fn from_row(y: u32, bits: u16) -> Tile {
        debug_assert!(y < TILE_SIZE);
        let mut out = Tile::EMPTY;
        out.rows[y as usize] = bits;
        out
    }

    /// A tile whose column `x` holds `bits` (bit `y` of `bits` = row `y`) and
    /// is otherwise empty.
    pub fn from_column(x: u32, bits: u16) -> Tile {
        debug_assert!(x < TILE_SIZE);
        let mut out = Tile::EMPTY;
        for (y, row) in out.rows.iter_mut().enumerate() {
            *row = (((bits >> y) & 1) as u16) << x;
        }
        out
    }

    /// One-step 4-directional dilation. Pixels that grow past a tile edge
    /// land in the spill fields instead of wrapping.
    pub fn grow(&self) -> GrownTile {
        let n = TILE_SIZE as usize;
        let mut center = [0u16; TILE_SIZE as usize];
        for y in 0..n {
            let row = self.rows[y];
            let mut grown = row | (row << 1) | (row >> 1);
            if y > 0 {
                grown |= self.rows[y - 1];
            }
            if y < n - 1 {
                grown |= self.rows[y + 1];
            }
            center[y] = grown;
        }

        let mut left = 0u16;
        let mut right = 0u16;
        for (y, &row) in self.rows.iter().enumerate() {
            left |= (row & 1) << y;
            right |= ((row >> (TILE_SIZE - 1)) & 1) << y;
        }

        GrownTile {
            center: Tile { rows: center },
            up: self.rows[0],
            down: self.rows[n - 1],
            left,
            right,
        }
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tile(pop={})", self.population())?;
        for row in &self.rows {
            for x in 0..TILE_SIZE {
                f.write_str(if (row >> x) & 1 == 1 { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
