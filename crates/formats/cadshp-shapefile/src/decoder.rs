//! The shapefile decoder.

use std::io::Cursor;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use cadshp_core_common::{
    Attributes, DecodedDocument, Feature, FeatureCollection, FileRole, ShapefileDataset,
    ShapefileDecoder,
};
use log::{debug, info, warn};
use shapefile::ShapeReader;
use shapefile::dbase;

use crate::error::{ShapefileError, ShapefileResult};
use crate::record::record_attributes;
use crate::shape::shape_to_geometry;

/// Decodes shapefile datasets with the `shapefile` crate.
///
/// Parsing runs on the blocking thread pool. Every dataset decodes to a
/// [`DecodedDocument::FeatureCollection`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShpDecoder;

impl ShpDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ShapefileDecoder for ShpDecoder {
    async fn decode(&self, dataset: &ShapefileDataset) -> Result<DecodedDocument> {
        let dataset = dataset.clone();
        let collection = tokio::task::spawn_blocking(move || decode_dataset(&dataset))
            .await
            .map_err(ShapefileError::from)??;
        Ok(DecodedDocument::FeatureCollection(collection))
    }
}

/// Decodes one dataset synchronously.
///
/// # Errors
///
/// Returns [`ShapefileError::MissingShape`] without a `shp` part, and a parse error when
/// the `shp` or `dbf` part is malformed.
pub fn decode_dataset(dataset: &ShapefileDataset) -> ShapefileResult<FeatureCollection> {
    let name = dataset.name();
    let shp = dataset
        .get(FileRole::Shp)
        .ok_or_else(|| ShapefileError::MissingShape {
            dataset: name.to_string(),
        })?;

    let mut shape_reader = ShapeReader::new(Cursor::new(shp.clone()))?;
    let shapes = shape_reader
        .iter_shapes()
        .collect::<Result<Vec<_>, shapefile::Error>>()?;

    let (fields, records) = match dataset.get(FileRole::Dbf) {
        Some(dbf) => read_table(dbf)?,
        None => {
            debug!("Dataset '{name}' has no .dbf file, features have no attributes");
            (Vec::new(), Vec::new())
        },
    };
    if !records.is_empty() && records.len() != shapes.len() {
        warn!(
            "Dataset '{name}' has {} shape(s) but {} record(s)",
            shapes.len(),
            records.len()
        );
    }
    if let Some(cpg) = dataset.get(FileRole::Cpg) {
        info!(
            "Dataset '{name}' declares code page '{}'",
            String::from_utf8_lossy(cpg).trim()
        );
    }

    let features = shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            let attributes = records
                .get(index)
                .map(|record| record_attributes(&fields, record))
                .unwrap_or_else(Attributes::new);
            Feature::new(shape_to_geometry(shape), attributes)
        })
        .collect();

    let mut collection = FeatureCollection::new(features);
    if let Some(prj) = dataset.get(FileRole::Prj) {
        collection = collection.with_projection(String::from_utf8_lossy(prj).trim());
    }
    Ok(collection)
}

fn read_table(dbf: &Bytes) -> ShapefileResult<(Vec<String>, Vec<dbase::Record>)> {
    let mut reader = dbase::Reader::new(Cursor::new(dbf.clone()))?;
    let fields = reader
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();
    let records = reader.read()?;
    Ok((fields, records))
}
