//! ESRI shapefile decoder for `cadshp`.
//!
//! [`ShpDecoder`] reads the `shp`, `dbf`, `prj` and `cpg` parts of a
//! [`ShapefileDataset`](cadshp_core_common::ShapefileDataset) into a `GeoJSON`-shaped
//! feature collection. Index parts are ignored.

pub mod decoder;
pub mod error;
mod record;
mod shape;

pub use decoder::{ShpDecoder, decode_dataset};
pub use error::{ShapefileError, ShapefileResult};
