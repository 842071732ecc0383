//! Custom error types for `cadshp` imports.
//!
//! This module provides structured error handling using `thiserror`. Collaborator
//! traits report failures as `anyhow::Error`; the pipeline wraps them into the
//! domain-specific variants below so the caller learns which stage and which item
//! failed.

use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for `cadshp` imports.
///
/// Every variant is fatal for the run that produced it; recoverable problems
/// (unknown files, unsupported values or geometries) are logged instead.
#[derive(Debug, Error)]
pub enum CadShpError {
    /// Listing or reading the workspace tree failed
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The decoder rejected a dataset
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The field picker failed
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A drawing call failed
    #[error(transparent)]
    Host(#[from] HostError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic errors from dependencies
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while walking the workspace tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The import source could not be opened
    #[error("Failed to open import source '{origin}': {source}")]
    Root {
        /// Name of the import source
        origin: String,
        #[source]
        source: BoxedError,
    },

    /// A folder could not be listed
    #[error("Failed to list folder '{path}': {source}")]
    List {
        /// Host path of the folder
        path: String,
        #[source]
        source: BoxedError,
    },

    /// A file could not be read
    #[error("Failed to read file '{path}': {source}")]
    Read {
        /// Host path of the file
        path: String,
        #[source]
        source: BoxedError,
    },
}

/// Errors raised by the decoder.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The decoder failed on a dataset
    #[error("Failed to decode shapefile dataset '{dataset}': {source}")]
    Failed {
        /// Base name of the dataset
        dataset: String,
        #[source]
        source: BoxedError,
    },
}

/// Errors raised while asking the user for layer-name fields.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The picker failed or was dismissed abnormally
    #[error("Field selection failed: {source}")]
    Picker {
        #[source]
        source: BoxedError,
    },
}

/// Errors raised by the host drawing.
#[derive(Debug, Error)]
pub enum HostError {
    /// A drawing operation failed
    #[error("Drawing operation '{operation}' failed: {source}")]
    Operation {
        /// The operation that failed (e.g., "create layer")
        operation: String,
        #[source]
        source: BoxedError,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },

    /// An import run was started twice
    #[error("Import run already used (state: {state})")]
    RunReused {
        /// State the run was in
        state: String,
    },
}

/// Type alias for Results using `CadShpError`.
pub type Result<T> = std::result::Result<T, CadShpError>;

impl CadShpError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Tree(e) => e.to_string(),
            Self::Decode(DecodeError::Failed { dataset, source }) => {
                format!("Shapefile '{dataset}' could not be decoded: {source}")
            },
            Self::Selection(e) => e.to_string(),
            Self::Host(HostError::Operation { operation, source }) => {
                format!("The drawing rejected '{operation}': {source}")
            },
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Other(e) => format!("Error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Tree(TreeError::Root { .. }) => {
                Some("Check that the import folder exists and is readable.".to_string())
            },
            Self::Tree(_) => Some("Check file permissions in the import folder.".to_string()),
            Self::Decode(_) => Some(
                "Make sure every .shp file has a matching .dbf and is not truncated."
                    .to_string(),
            ),
            Self::Config(ConfigError::InvalidOption { option, .. }) => {
                Some(format!("Run with a valid --{option} value."))
            },
            _ => None,
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// Recoverable errors might be fixed by retrying with different options.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Selection(_))
    }
}

/// Extension trait for adding pipeline context to collaborator errors.
pub trait ContextExt<T> {
    /// Wrap a failed drawing call.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError::Operation`] if the underlying call fails.
    fn with_host_context(self, operation: &str) -> Result<T>;

    /// Wrap a failed folder listing.
    ///
    /// # Errors
    ///
    /// Returns a [`TreeError::List`] if the underlying call fails.
    fn with_list_context(self, path: &str) -> Result<T>;

    /// Wrap a failed file read.
    ///
    /// # Errors
    ///
    /// Returns a [`TreeError::Read`] if the underlying call fails.
    fn with_read_context(self, path: &str) -> Result<T>;
}

impl<T> ContextExt<T> for anyhow::Result<T> {
    fn with_host_context(self, operation: &str) -> Result<T> {
        self.map_err(|e| {
            CadShpError::Host(HostError::Operation {
                operation: operation.to_string(),
                source: e.into(),
            })
        })
    }

    fn with_list_context(self, path: &str) -> Result<T> {
        self.map_err(|e| {
            CadShpError::Tree(TreeError::List {
                path: path.to_string(),
                source: e.into(),
            })
        })
    }

    fn with_read_context(self, path: &str) -> Result<T> {
        self.map_err(|e| {
            CadShpError::Tree(TreeError::Read {
                path: path.to_string(),
                source: e.into(),
            })
        })
    }
}
