//! `cadshp-core` is the core library of the `cadshp` project, importing ESRI shapefile
//! datasets into a CAD drawing as a hierarchy of layers.
//!
//! This crate includes:
//! - **Grouping**: collecting loose workspace files into datasets by base name.
//! - **Decoding**: running a [`ShapefileDecoder`](cadshp_core_common::ShapefileDecoder)
//!   over every dataset and cataloguing the attribute fields.
//! - **Field selection**: asking which fields may name feature layers.
//! - **Assembly**: writing the root → dataset → feature layer hierarchy and mapping each
//!   feature's geometry to circles, lines and polylines.
//!
//! The [`operations`] module ties the stages together in an [`operations::ImportRun`].
//! Host applications plug in through the traits of `cadshp-core-common`; [`tree`] and
//! [`memory`] provide ready-made local and in-memory implementations.

pub mod assembler;
pub mod catalogue;
pub mod decoder;
pub mod error;
pub mod geometry;
pub mod grouper;
pub mod memory;
pub mod naming;
pub mod operations;
pub mod options;
pub mod progress;
pub mod selector;
#[cfg(test)]
mod testing;
pub mod tree;
pub mod types;
pub mod utils;
