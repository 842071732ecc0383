//! Import operations.
//!
//! This module drives a whole import: grouping the workspace files into datasets,
//! decoding them, asking for the layer-name fields and writing the layer hierarchy
//! inside the host's write sessions. It also offers a read-only inspection that stops
//! after decoding.

use std::fmt;

use cadshp_core_common::{Drawing, FieldPicker, Progress, ShapefileDecoder, WorkspaceTree};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::assembler::{Assembler, AssemblyStats};
use crate::catalogue::AttributeCatalogue;
use crate::decoder::{DecodeOutput, decode_datasets};
use crate::error::{CadShpError, ConfigError, ContextExt, Result};
use crate::grouper::{DatasetSet, group_datasets};
use crate::naming::LayerIdCounter;
use crate::options::ImportOptions;
use crate::selector::{LayerNameCandidates, select_candidates};
use crate::types::{DatasetInfo, ImportSummary};

/// Phase of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportState {
    Idle,
    ReadingFiles,
    Decoding,
    SelectingFields,
    Writing,
    Done,
    Failed,
}

impl ImportState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportState::Idle => "idle",
            ImportState::ReadingFiles => "reading files",
            ImportState::Decoding => "decoding",
            ImportState::SelectingFields => "selecting fields",
            ImportState::Writing => "writing",
            ImportState::Done => "done",
            ImportState::Failed => "failed",
        }
    }

    /// Whether the run has finished, successfully or not.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportState::Done | ImportState::Failed)
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One import of a workspace tree into a drawing.
///
/// A run is single-use. It owns the fallback-name counter, so two runs never share
/// layer ids.
#[derive(Debug)]
pub struct ImportRun {
    options: ImportOptions,
    state: ImportState,
    counter: LayerIdCounter,
}

impl ImportRun {
    #[must_use]
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            state: ImportState::Idle,
            counter: LayerIdCounter::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ImportState {
        self.state
    }

    #[must_use]
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// The last fallback id handed out.
    #[must_use]
    pub fn counter(&self) -> LayerIdCounter {
        self.counter
    }

    /// Runs the import.
    ///
    /// # Arguments
    ///
    /// * `tree` - The workspace tree holding the shapefile parts.
    /// * `decoder` - Turns each dataset into a feature collection.
    /// * `picker` - Chooses the layer-name fields.
    /// * `drawing` - Receives the layers and entities.
    /// * `progress` - Receives phase, percentage and detail updates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RunReused`] when the run was already started, and the
    /// first fatal stage error otherwise. A failed run leaves every layer created so
    /// far in the drawing.
    pub async fn run<T, Dec, P, D>(
        &mut self,
        tree: &T,
        decoder: &Dec,
        picker: &mut P,
        drawing: &mut D,
        progress: &mut dyn Progress,
    ) -> Result<ImportSummary>
    where
        T: WorkspaceTree + ?Sized,
        Dec: ShapefileDecoder + ?Sized,
        P: FieldPicker + ?Sized,
        D: Drawing + ?Sized,
    {
        if self.state != ImportState::Idle {
            return Err(ConfigError::RunReused {
                state: self.state.to_string(),
            }
            .into());
        }

        info!("Starting import from '{}'", tree.origin());
        match self.execute(tree, decoder, picker, drawing, progress).await {
            Ok(summary) => {
                self.state = ImportState::Done;
                info!(
                    "Import completed: {} dataset(s), {} feature layer(s), {} entities",
                    summary.datasets, summary.features, summary.entities
                );
                Ok(summary)
            },
            Err(e) => {
                error!("Import from '{}' failed while {}: {e}", tree.origin(), self.state);
                debug!("{e:?}");
                self.state = ImportState::Failed;
                Err(e)
            },
        }
    }

    async fn execute<T, Dec, P, D>(
        &mut self,
        tree: &T,
        decoder: &Dec,
        picker: &mut P,
        drawing: &mut D,
        progress: &mut dyn Progress,
    ) -> Result<ImportSummary>
    where
        T: WorkspaceTree + ?Sized,
        Dec: ShapefileDecoder + ?Sized,
        P: FieldPicker + ?Sized,
        D: Drawing + ?Sized,
    {
        self.options.validate()?;

        self.state = ImportState::ReadingFiles;
        progress.begin("Reading files");
        let datasets = group_datasets(tree, progress).await?;
        info!("Found {} dataset(s)", datasets.len());

        self.state = ImportState::Decoding;
        progress.begin("Decoding shapefiles");
        let decoded = decode_datasets(decoder, &datasets, &self.options.date_format, progress)
            .await?;

        self.state = ImportState::SelectingFields;
        let candidates = select_candidates(picker, &decoded.catalogue).await?;

        self.state = ImportState::Writing;
        progress.begin("Writing layers");
        let root_name = self
            .options
            .root_name
            .clone()
            .unwrap_or_else(|| tree.origin().to_string());
        let stats = self
            .write(drawing, &root_name, &decoded, &candidates, progress)
            .await?;

        Ok(ImportSummary {
            root_layer: root_name,
            datasets: decoded.datasets.len(),
            features: stats.features,
            layers: stats.layers,
            entities: stats.entities,
            skipped_geometries: stats.skipped_geometries,
            fallback_names: stats.fallback_names,
            skipped_files: datasets.skipped().to_vec(),
            name_fields: candidates.iter().map(str::to_string).collect(),
        })
    }

    /// Runs the assembler inside the layer-update and edit sessions.
    ///
    /// Both sessions are closed on every path, the update session first.
    async fn write<D>(
        &mut self,
        drawing: &mut D,
        root_name: &str,
        decoded: &DecodeOutput,
        candidates: &LayerNameCandidates,
        progress: &mut dyn Progress,
    ) -> Result<AssemblyStats>
    where
        D: Drawing + ?Sized,
    {
        drawing
            .begin_update()
            .await
            .with_host_context("begin layer update")?;
        if let Err(e) = drawing.begin_edit().await.with_host_context("begin edit") {
            if let Err(close) = drawing.end_update().await {
                warn!("Failed to close the layer update: {close}");
            }
            return Err(e);
        }

        let work = Assembler::new(&self.options, candidates)
            .assemble(
                drawing,
                root_name,
                &decoded.datasets,
                &mut self.counter,
                progress,
            )
            .await;
        let update_closed = drawing
            .end_update()
            .await
            .with_host_context("end layer update");
        let edit_closed = drawing.end_edit().await.with_host_context("end edit");

        let stats = match work {
            Ok(stats) => stats,
            Err(e) => {
                log_close_failure(update_closed.err());
                log_close_failure(edit_closed.err());
                return Err(e);
            },
        };
        if let Err(e) = update_closed {
            log_close_failure(edit_closed.err());
            return Err(e);
        }
        edit_closed?;
        Ok(stats)
    }
}

fn log_close_failure(error: Option<CadShpError>) {
    if let Some(e) = error {
        warn!("{e}");
    }
}

/// Datasets and attribute catalogue of a workspace tree, without writing anything.
#[derive(Debug, Clone, Default)]
pub struct Inspection {
    pub datasets: Vec<DatasetInfo>,
    pub catalogue: AttributeCatalogue,
    /// Host paths of files with an unrecognized extension
    pub skipped_files: Vec<String>,
}

/// Groups and decodes a workspace tree.
///
/// # Errors
///
/// Returns the first tree or decode error.
pub async fn inspect<T, Dec>(
    tree: &T,
    decoder: &Dec,
    date_format: &str,
    progress: &mut dyn Progress,
) -> Result<Inspection>
where
    T: WorkspaceTree + ?Sized,
    Dec: ShapefileDecoder + ?Sized,
{
    progress.begin("Reading files");
    let datasets = group_datasets(tree, progress).await?;
    progress.begin("Decoding shapefiles");
    let decoded = decode_datasets(decoder, &datasets, date_format, progress).await?;
    Ok(Inspection {
        datasets: dataset_infos(&datasets, &decoded),
        catalogue: decoded.catalogue,
        skipped_files: datasets.skipped().to_vec(),
    })
}

fn dataset_infos(datasets: &DatasetSet, decoded: &DecodeOutput) -> Vec<DatasetInfo> {
    datasets
        .iter()
        .map(|dataset| {
            let collection = decoded
                .datasets
                .iter()
                .find(|d| d.name == dataset.name())
                .map(|d| &d.collection);
            DatasetInfo {
                name: dataset.name().to_string(),
                roles: dataset.roles().map(|r| r.to_string()).collect(),
                features: collection.map(|c| c.len()),
                projection: collection.and_then(|c| c.projection.clone()),
            }
        })
        .collect()
}
