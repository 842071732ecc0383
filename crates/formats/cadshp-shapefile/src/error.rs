//! Errors raised while decoding a shapefile dataset.

use thiserror::Error;

/// Errors that can occur when decoding a shapefile dataset.
#[derive(Debug, Error)]
pub enum ShapefileError {
    /// The dataset has no `.shp` part.
    #[error("Dataset '{dataset}' has no .shp file")]
    MissingShape {
        /// Base name of the dataset
        dataset: String,
    },

    /// The `.shp` part could not be parsed.
    #[error("Invalid shape data: {0}")]
    Shape(#[from] shapefile::Error),

    /// The `.dbf` part could not be parsed.
    #[error("Invalid attribute table: {0}")]
    Table(#[from] shapefile::dbase::Error),

    /// The blocking decode task panicked or was cancelled.
    #[error("Decoding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for shapefile decoding.
pub type ShapefileResult<T> = Result<T, ShapefileError>;
