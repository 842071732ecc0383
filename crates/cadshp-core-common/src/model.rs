//! Data model shared by the pipeline and the decoder implementations.
//!
//! Geometries use the `geojson` crate's tagged geometry value so decoders and the
//! geometry mapper agree on a single closed set of kinds. Attribute values are a closed
//! enum instead of a dynamically typed JSON value, which keeps every classification a
//! total function.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use bytes::Bytes;
use chrono::NaiveDate;
use geojson::Geometry;

use crate::roles::FileRole;

/// The sidecar files collected for one shapefile base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapefileDataset {
    name: String,
    files: BTreeMap<FileRole, Bytes>,
}

impl ShapefileDataset {
    /// Creates an empty dataset for the given base name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }

    /// The shared base name of the dataset's files.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores the bytes of one file, returning the bytes it replaced, if any.
    pub fn insert(&mut self, role: FileRole, bytes: Bytes) -> Option<Bytes> {
        self.files.insert(role, bytes)
    }

    /// Returns the bytes stored for a role.
    #[must_use]
    pub fn get(&self, role: FileRole) -> Option<&Bytes> {
        self.files.get(&role)
    }

    /// Returns `true` when a file was collected for the role.
    #[must_use]
    pub fn contains(&self, role: FileRole) -> bool {
        self.files.contains_key(&role)
    }

    /// The collected roles, in registry order.
    pub fn roles(&self) -> impl Iterator<Item = FileRole> + '_ {
        self.files.keys().copied()
    }

    /// Number of collected files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when no file has been collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Calendar date as stored in an attribute table.
///
/// The components are kept raw because tables routinely contain placeholders such as
/// `00000000`; [`DateValue::to_date`] tells whether they form a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValue {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateValue {
    #[must_use]
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Resolves the components to a calendar date, `None` when they do not form one.
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Formats the date with a `strftime` style format.
    ///
    /// Returns `None` when the date is invalid or the format cannot be rendered.
    #[must_use]
    pub fn format(&self, format: &str) -> Option<String> {
        let date = self.to_date()?;
        let mut out = String::new();
        write!(out, "{}", date.format(format)).ok()?;
        Some(out)
    }
}

/// A single attribute value of a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(DateValue),
    /// The table had no value for the field.
    Null,
    /// A value the decoder could not map, described for diagnostics.
    Unsupported(String),
}

impl AttributeValue {
    /// Short name of the value's kind, used in log messages.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            AttributeValue::Number(_) => "number",
            AttributeValue::Text(_) => "text",
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::Date(_) => "date",
            AttributeValue::Null => "null",
            AttributeValue::Unsupported(description) => description,
        }
    }
}

/// Ordered attribute map of a feature.
///
/// Fields keep the order of the attribute table. Inserting an existing field name
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, keeping the position of an existing field with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

/// One decoded feature: an optional geometry and its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub attributes: Attributes,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Option<Geometry>, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }
}

/// All features decoded from one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    /// Projection definition (WKT) when the dataset shipped one.
    pub projection: Option<String>,
}

impl FeatureCollection {
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            projection: None,
        }
    }

    #[must_use]
    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Top-level result of decoding a dataset, mirroring GeoJSON's top-level kinds.
///
/// Only [`DecodedDocument::FeatureCollection`] is imported; the other kinds are
/// reported and skipped by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedDocument {
    FeatureCollection(FeatureCollection),
    Feature(Feature),
    Geometry(Geometry),
}

impl DecodedDocument {
    /// GeoJSON name of the top-level kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedDocument::FeatureCollection(_) => "FeatureCollection",
            DecodedDocument::Feature(_) => "Feature",
            DecodedDocument::Geometry(_) => "Geometry",
        }
    }
}
