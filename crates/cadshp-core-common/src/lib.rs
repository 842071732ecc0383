//! Common types and traits shared across `cadshp` crates.
//!
//! This crate provides the data model and collaborator traits that are shared between
//! `cadshp-core` and decoder implementation crates, preventing circular dependencies.

pub mod host;
pub mod io;
pub mod model;
pub mod roles;

// Re-export commonly used types
pub use host::{
    Drawing, EntityEditor, FieldPicker, Handle, ItemKind, LayerSpec, LayerTable, PickItem,
    Point3, PolylineFlags, Progress, PropertyObject, TreeItem, TypedProperty, WorkspaceTree,
};
pub use io::ShapefileDecoder;
pub use model::{
    AttributeValue, Attributes, DateValue, DecodedDocument, Feature, FeatureCollection,
    ShapefileDataset,
};
pub use roles::{FILE_ROLES, FileRole, RoleUsage};
