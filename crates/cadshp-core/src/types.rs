//! Data types reported by imports.
//!
//! This module defines the summaries handed back to the caller once a run finishes,
//! and the per-dataset information shown by inspections.

use serde::Serialize;

/// Outcome of a finished import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Name of the root layer
    pub root_layer: String,
    /// Datasets written to the drawing
    pub datasets: usize,
    /// Features written, one leaf layer each
    pub features: usize,
    /// Layers created, root and intermediate layers included
    pub layers: usize,
    /// Entities created
    pub entities: usize,
    /// Geometry parts that produced no entity
    pub skipped_geometries: usize,
    /// Feature layers named by the fallback counter
    pub fallback_names: usize,
    /// Host paths of files with an unrecognized extension
    pub skipped_files: Vec<String>,
    /// Approved layer-name fields, in priority order
    pub name_fields: Vec<String>,
}

/// Information about a grouped and decoded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    /// Base name of the dataset
    pub name: String,
    /// Extensions of the files found for it
    pub roles: Vec<String>,
    /// Number of decoded features, `None` when the dataset was not a feature collection
    pub features: Option<usize>,
    /// Projection text from the `prj` file
    pub projection: Option<String>,
}
