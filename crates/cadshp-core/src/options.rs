//! Options controlling how features are written into the drawing.

use chrono::format::{Item, StrftimeItems};

use crate::error::ConfigError;

/// Multiplier applied to every coordinate.
///
/// Coordinates are copied as-is; a geodesic transform is not part of the importer.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Radius of the circle drawn for a point feature.
pub const DEFAULT_POINT_RADIUS: f64 = 0.005;

/// Date format used for layer names, properties and catalogue examples.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Options of an import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Coordinate multiplier.
    pub scale: f64,
    /// Circle radius used for points.
    pub point_radius: f64,
    /// `strftime` format for dates.
    pub date_format: String,
    /// Name of the root layer; the tree origin is used when unset.
    pub root_name: Option<String>,
    /// Generated layers start disabled.
    pub hidden_layers: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            point_radius: DEFAULT_POINT_RADIUS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            root_name: None,
            hidden_layers: true,
        }
    }
}

impl ImportOptions {
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    #[must_use]
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_hidden_layers(mut self, hidden: bool) -> Self {
        self.hidden_layers = hidden;
        self
    }

    /// Checks the options before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] when the scale is zero or not finite,
    /// the point radius is not a positive number, the date format does not parse, or
    /// the root name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(invalid("scale", "must be a finite, non-zero number"));
        }
        if !self.point_radius.is_finite() || self.point_radius <= 0.0 {
            return Err(invalid("point-radius", "must be a positive number"));
        }
        if self.date_format.is_empty() {
            return Err(invalid("date-format", "must not be empty"));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(
                "date-format",
                &format!("'{}' is not a valid strftime format", self.date_format),
            ));
        }
        if self.root_name.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("root-name", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(option: &str, message: &str) -> ConfigError {
    ConfigError::InvalidOption {
        option: option.to_string(),
        message: message.to_string(),
    }
}
