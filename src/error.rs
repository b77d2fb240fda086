//! Error type shared by construction, persistence and query.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeomoirError {
    /// The query point lies outside the root bound of the tree.
    #[error("Coordinate ({x}, {y}) is outside the bounds of the tree")]
    OutOfBounds { x: f32, y: f32 },

    /// A new country name would not fit into a one-byte label.
    #[error("Cannot register country '{name}': label table is limited to {capacity} entries")]
    LabelOverflow { name: String, capacity: usize },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Fewer bytes remain than the node being decoded requires.
    #[error("Truncated input: {needed} more byte(s) needed at offset {offset}")]
    TruncatedInput { offset: usize, needed: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[cfg(feature = "geojson")]
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GeomoirError>;
