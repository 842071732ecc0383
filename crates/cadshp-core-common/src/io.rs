//! Decoder trait for turning raw shapefile buffers into features.
//!
//! Decoders live in their own crates (see `cadshp-shapefile`) and only depend on this
//! crate, so the pipeline in `cadshp-core` can drive any of them.

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{DecodedDocument, ShapefileDataset};

/// Trait for decoding one shapefile dataset.
///
/// Implementations must accept datasets that lack optional roles and degrade
/// gracefully; only the geometry file is generally required.
#[async_trait]
pub trait ShapefileDecoder: Send + Sync {
    /// Decodes the dataset's buffers.
    ///
    /// # Arguments
    ///
    /// * `dataset` - The collected sidecar files of one base name
    ///
    /// # Returns
    ///
    /// The decoded document, normally a feature collection
    ///
    /// # Errors
    ///
    /// Returns an error when the buffers are malformed or a required role is missing.
    async fn decode(&self, dataset: &ShapefileDataset) -> Result<DecodedDocument>;
}
