//! Error type shared by every fallible grid operation.

use thiserror::Error;

/// Caller contract violations. None of these are transient: every variant is
/// raised immediately and nothing is retried or clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Square size outside `1..=16`.
    #[error("invalid square size {size} (must be 1..=16)")]
    InvalidSize { size: u32 },

    /// Pixel coordinates out of range, a rectangle crossing a tile boundary,
    /// or an operation between two tiles placed at different coordinates.
    #[error("invalid coordinates ({x}, {y})")]
    InvalidCoordinates { x: u32, y: u32 },

    /// Removal or move of a tile that is not present in the store.
    #[error("no tile at tile coordinate ({x}, {y})")]
    TileMissing { x: u32, y: u32 },
}
