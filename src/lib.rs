//! Bit-parallel 16×16 tile grid with sparse/compact stores and 4-connectivity queries.

pub mod compact;
pub mod connect;
pub mod coord;
mod coord_map;
pub mod error;
pub mod sparse;
pub mod store;
pub mod tile;

pub use compact::CompactGrid;
pub use connect::{is_adjacent, is_connected};
pub use coord::{Direction, PlacedTile, TileCoord};
pub use error::GridError;
pub use sparse::SparseGrid;
pub use store::TileRead;
pub use tile::{GrownTile, TILE_SIZE, Tile};
