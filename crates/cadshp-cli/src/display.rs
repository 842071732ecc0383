//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting imports and inspections in a human-readable format.

use tabled::{Table, Tabled};

use cadshp_core::memory::{LayerRecord, MemoryDrawing};
use cadshp_core::operations::Inspection;
use cadshp_core::types::ImportSummary;
use cadshp_core_common::FILE_ROLES;

/// Table row representation for displaying file role information.
#[derive(Tabled)]
pub struct RoleRow {
    /// File extension of the role.
    #[tabled(rename = "Extension")]
    pub extension: String,
    /// What the file holds.
    #[tabled(rename = "Description")]
    pub description: String,
    /// How the importer uses the file.
    #[tabled(rename = "Usage")]
    pub usage: String,
}

/// Table row representation for displaying a grouped dataset.
#[derive(Tabled)]
pub struct DatasetRow {
    #[tabled(rename = "Dataset")]
    pub name: String,
    /// Extensions found for the dataset.
    #[tabled(rename = "Files")]
    pub files: String,
    #[tabled(rename = "Features")]
    pub features: String,
    #[tabled(rename = "Projection")]
    pub projection: String,
}

/// Table row representation for displaying a catalogued field.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub name: String,
    /// Observed kinds with one example each.
    #[tabled(rename = "Examples")]
    pub examples: String,
}

/// Table row representation for displaying one created layer.
#[derive(Tabled)]
pub struct LayerRow {
    /// Layer name, indented by depth.
    #[tabled(rename = "Layer")]
    pub name: String,
    #[tabled(rename = "Entities")]
    pub entities: usize,
    #[tabled(rename = "Properties")]
    pub properties: usize,
    #[tabled(rename = "Hidden")]
    pub hidden: String,
}

/// Table row representation for a summary line.
#[derive(Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Builds one row per recognized file role.
#[must_use]
pub fn role_rows() -> Vec<RoleRow> {
    FILE_ROLES
        .iter()
        .map(|role| RoleRow {
            extension: role.extension().to_string(),
            description: role.description().to_string(),
            usage: role.usage().as_str().to_string(),
        })
        .collect()
}

/// Builds the layer rows of a drawing, depth first in creation order.
#[must_use]
pub fn layer_rows(drawing: &MemoryDrawing) -> Vec<LayerRow> {
    fn visit(drawing: &MemoryDrawing, layer: &LayerRecord, depth: usize, rows: &mut Vec<LayerRow>) {
        rows.push(LayerRow {
            name: format!("{}{}", "  ".repeat(depth), layer.name),
            entities: drawing.entities_on(layer.handle).count(),
            properties: layer.properties.len(),
            hidden: if layer.disabled { "Yes" } else { "No" }.to_string(),
        });
        for child in drawing.child_layers(layer.handle) {
            visit(drawing, child, depth + 1, rows);
        }
    }

    let mut rows = Vec::new();
    for top in drawing.top_layers() {
        visit(drawing, top, 0, &mut rows);
    }
    rows
}

/// Builds the summary rows of an import.
#[must_use]
pub fn summary_rows(summary: &ImportSummary) -> Vec<SummaryRow> {
    let row = |item: &str, value: String| SummaryRow {
        item: item.to_string(),
        value,
    };
    let fields = if summary.name_fields.is_empty() {
        "(none, numbered names)".to_string()
    } else {
        summary.name_fields.join(", ")
    };
    vec![
        row("Root layer", summary.root_layer.clone()),
        row("Datasets", summary.datasets.to_string()),
        row("Feature layers", summary.features.to_string()),
        row("Layers", summary.layers.to_string()),
        row("Entities", summary.entities.to_string()),
        row("Name fields", fields),
        row("Numbered names", summary.fallback_names.to_string()),
        row("Skipped geometries", summary.skipped_geometries.to_string()),
        row("Skipped files", summary.skipped_files.len().to_string()),
    ]
}

/// Display the recognized file roles.
pub fn display_roles() {
    let rows = role_rows();
    println!("\nFile Roles ({} total):\n", rows.len());
    println!("{}", Table::new(rows));
}

/// Display the layer hierarchy and summary of a finished import.
///
/// # Arguments
///
/// * `drawing` - The drawing the import wrote to
/// * `summary` - The summary returned by the import
pub fn display_import(drawing: &MemoryDrawing, summary: &ImportSummary) {
    let layers = layer_rows(drawing);
    if !layers.is_empty() {
        println!("\n=== Layers ===");
        println!("{}", Table::new(layers));
    }

    println!("\n=== Summary ===");
    println!("{}", Table::new(summary_rows(summary)));
}

/// Display grouped datasets and the attribute catalogue.
pub fn display_inspection(inspection: &Inspection) {
    println!("\n=== Datasets ===");
    let rows: Vec<DatasetRow> = inspection
        .datasets
        .iter()
        .map(|d| DatasetRow {
            name: d.name.clone(),
            files: d.roles.join(", "),
            features: d
                .features
                .map_or_else(|| "N/A".to_string(), |n| n.to_string()),
            projection: d.projection.clone().unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows));

    if !inspection.catalogue.is_empty() {
        println!("\n=== Fields ===");
        let rows: Vec<FieldRow> = inspection
            .catalogue
            .fields()
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                examples: f.hint(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if !inspection.skipped_files.is_empty() {
        println!("\nSkipped files: {}", inspection.skipped_files.join(", "));
    }
}
