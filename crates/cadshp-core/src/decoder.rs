//! Decoding stage: runs the decoder over every dataset and builds the catalogue.

use cadshp_core_common::{DecodedDocument, FeatureCollection, Progress, ShapefileDecoder};
use log::{debug, info, warn};

use crate::catalogue::AttributeCatalogue;
use crate::error::{DecodeError, Result};
use crate::grouper::DatasetSet;

/// Features decoded from one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDataset {
    /// Base name of the dataset.
    pub name: String,
    pub collection: FeatureCollection,
}

/// Result of the decoding stage.
#[derive(Debug, Clone, Default)]
pub struct DecodeOutput {
    /// Decoded datasets, in grouping order.
    pub datasets: Vec<DecodedDataset>,
    /// Attribute catalogue over every feature of every dataset.
    pub catalogue: AttributeCatalogue,
}

impl DecodeOutput {
    /// Total number of features over all datasets.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.datasets.iter().map(|d| d.collection.len()).sum()
    }
}

/// Decodes every dataset in order and catalogues their attributes.
///
/// Datasets that decode to anything other than a feature collection are logged and
/// left out. A decoder failure stops the stage: an import built from an unknown
/// subset of the datasets is not presented.
///
/// # Errors
///
/// Returns [`DecodeError::Failed`] naming the first dataset the decoder rejected.
pub async fn decode_datasets<D>(
    decoder: &D,
    datasets: &DatasetSet,
    date_format: &str,
    progress: &mut dyn Progress,
) -> Result<DecodeOutput>
where
    D: ShapefileDecoder + ?Sized,
{
    let mut output = DecodeOutput::default();

    for dataset in datasets.iter() {
        let name = dataset.name();
        progress.detail(name);
        let roles: Vec<String> = dataset.roles().map(|r| r.to_string()).collect();
        debug!("Decoding '{name}' from [{}]", roles.join(", "));

        let document = decoder
            .decode(dataset)
            .await
            .map_err(|e| DecodeError::Failed {
                dataset: name.to_string(),
                source: e.into(),
            })?;

        let collection = match document {
            DecodedDocument::FeatureCollection(collection) => collection,
            other => {
                warn!(
                    "Dataset '{name}' decoded to an unsupported GeoJSON type '{}', skipping",
                    other.kind()
                );
                continue;
            },
        };

        for feature in &collection.features {
            output
                .catalogue
                .record_attributes(&feature.attributes, date_format);
        }
        if let Some(projection) = &collection.projection {
            debug!("Dataset '{name}' projection: {projection}");
        }
        info!("Decoded {} feature(s) from '{name}'", collection.len());

        output.datasets.push(DecodedDataset {
            name: name.to_string(),
            collection,
        });
    }

    Ok(output)
}
