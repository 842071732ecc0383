//! Command-line interface for `cadshp`, importing ESRI shapefiles into a CAD layer
//! hierarchy.
//!
//! This binary provides a thin host around the [`cadshp_core`] library: the workspace
//! tree is a local directory, the drawing is held in memory and the field picker is
//! either a preset list or a terminal prompt.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! It parses arguments, configures logging, and delegates to command handlers.
//!
//! # Available Commands
//!
//! - `import` - Import every shapefile dataset of a directory
//! - `inspect` - Show the datasets and attribute fields of a directory
//! - `roles` - List the recognized shapefile file roles

mod display;
mod prompt;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use cadshp_core::error::CadShpError;
use cadshp_core::memory::MemoryDrawing;
use cadshp_core::operations::{self, ImportRun};
use cadshp_core::options::{
    DEFAULT_DATE_FORMAT, DEFAULT_POINT_RADIUS, DEFAULT_SCALE, ImportOptions,
};
use cadshp_core::progress::LogProgress;
use cadshp_core::selector::{AllFieldsPicker, PresetPicker};
use cadshp_core::tree::LocalTree;
use cadshp_core_common::FieldPicker;
use cadshp_shapefile::ShpDecoder;

use crate::prompt::PromptPicker;

#[derive(Parser)]
#[command(
    name = "cadshp",
    version,
    about = "Import ESRI shapefiles into a CAD layer hierarchy",
    long_about = "cadshp groups the shapefile parts of a directory into datasets, decodes them and\n\
                  writes one layer per feature, named after the attribute fields you choose."
)]
/// Command-line arguments and options for the `cadshp` CLI.
///
/// This struct defines the top-level CLI interface, including global flags for
/// logging verbosity and the subcommand to execute.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `cadshp` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Imports every shapefile dataset found under a directory.
    ///
    /// Layers are named after the first usable value of the chosen fields; features
    /// without one get a running number.
    Import {
        /// Directory holding the shapefile parts.
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Fields that name feature layers, in priority order.
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["all_fields", "prompt"])]
        fields: Vec<String>,

        /// Offer every field, in catalogue order.
        #[arg(long, conflicts_with = "prompt")]
        all_fields: bool,

        /// Ask for the fields on the terminal.
        #[arg(long)]
        prompt: bool,

        /// Coordinate multiplier.
        #[arg(long, default_value_t = DEFAULT_SCALE)]
        scale: f64,

        /// Radius of the circles drawn for points.
        #[arg(long, default_value_t = DEFAULT_POINT_RADIUS)]
        point_radius: f64,

        /// strftime format used for date values.
        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        date_format: String,

        /// Name of the root layer (defaults to the directory name).
        #[arg(long, value_name = "NAME")]
        root_name: Option<String>,

        /// Create the layers visible instead of hidden.
        #[arg(long)]
        visible: bool,

        /// Write the resulting drawing as JSON.
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },

    /// Shows the datasets and attribute fields of a directory without importing.
    Inspect {
        /// Directory holding the shapefile parts.
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// strftime format used for date examples.
        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        date_format: String,
    },

    /// Lists the recognized shapefile file roles.
    Roles,
}

/// How the layer-name fields are chosen.
enum FieldSource {
    Preset(Vec<String>),
    All,
    Prompt,
}

/// Entry point for the `cadshp` command-line interface.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Import {
            input,
            fields,
            all_fields,
            prompt,
            scale,
            point_radius,
            date_format,
            root_name,
            visible,
            json,
        } => {
            let source = if prompt {
                FieldSource::Prompt
            } else if all_fields {
                FieldSource::All
            } else {
                FieldSource::Preset(fields)
            };
            let mut options = ImportOptions::default()
                .with_scale(scale)
                .with_point_radius(point_radius)
                .with_date_format(date_format)
                .with_hidden_layers(!visible);
            if let Some(name) = root_name {
                options = options.with_root_name(name);
            }
            handle_import(&input, options, source, json.as_deref()).await?;
        },
        Commands::Inspect { input, date_format } => {
            handle_inspect(&input, &date_format).await?;
        },
        Commands::Roles => display::display_roles(),
    }

    Ok(())
}

async fn handle_import(
    input: &Path,
    options: ImportOptions,
    source: FieldSource,
    json: Option<&Path>,
) -> Result<()> {
    info!("Importing {}", input.display());
    let tree = LocalTree::new(input);
    let mut picker: Box<dyn FieldPicker> = match source {
        FieldSource::Preset(fields) => Box::new(PresetPicker::new(fields)),
        FieldSource::All => Box::new(AllFieldsPicker),
        FieldSource::Prompt => Box::new(PromptPicker),
    };

    let mut drawing = MemoryDrawing::new();
    let mut run = ImportRun::new(options);
    let summary = run
        .run(
            &tree,
            &ShpDecoder::new(),
            picker.as_mut(),
            &mut drawing,
            &mut LogProgress::new(),
        )
        .await
        .map_err(report)?;

    display::display_import(&drawing, &summary);

    if let Some(path) = json {
        let text = serde_json::to_string_pretty(&drawing)?;
        tokio::fs::write(path, text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote drawing to {}", path.display());
    }
    Ok(())
}

async fn handle_inspect(input: &Path, date_format: &str) -> Result<()> {
    info!("Inspecting {}", input.display());
    let tree = LocalTree::new(input);
    let inspection = operations::inspect(
        &tree,
        &ShpDecoder::new(),
        date_format,
        &mut LogProgress::new(),
    )
    .await
    .map_err(report)?;
    display::display_inspection(&inspection);
    Ok(())
}

/// Turns an import error into the message shown to the user.
fn report(error: CadShpError) -> anyhow::Error {
    match error.recovery_suggestion() {
        Some(hint) => anyhow!("{}\nHint: {hint}", error.user_message()),
        None => anyhow!("{}", error.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_adds_hint() {
        let error = CadShpError::Config(cadshp_core::error::ConfigError::InvalidOption {
            option: "scale".to_string(),
            message: "must not be zero".to_string(),
        });
        let message = report(error).to_string();
        assert!(message.starts_with("Configuration error: Invalid scale option"));
        assert!(message.ends_with("Hint: Run with a valid --scale value."));
    }

    #[tokio::test]
    async fn test_handle_import_missing_directory() {
        let result = handle_import(
            Path::new("/nonexistent/cadshp-input"),
            ImportOptions::default(),
            FieldSource::Preset(Vec::new()),
            None,
        )
        .await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cadshp-input"));
    }

    #[tokio::test]
    async fn test_handle_import_empty_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let json = dir.path().join("drawing.json");
        handle_import(
            dir.path(),
            ImportOptions::default().with_root_name("empty"),
            FieldSource::All,
            Some(&json),
        )
        .await?;

        let dump: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json)?)?;
        assert_eq!(dump["layers"][0]["name"], "empty");
        assert_eq!(dump["entities"].as_array().map(Vec::len), Some(0));
        Ok(())
    }
}
