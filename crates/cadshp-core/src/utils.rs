//! Classification and formatting of attribute values.
//!
//! The catalogue, the layer-name rule and the layer properties all look at attribute
//! values through the same validity rules: numbers must be finite, text must be
//! non-empty and dates must form a real calendar date.

use std::fmt;

use cadshp_core_common::{AttributeValue, TypedProperty};

/// Kind of a usable attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Text,
    Boolean,
    Date,
}

impl ValueKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a number as the shortest decimal string (`120.5`, `3`, `-0.25`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    format!("{value}")
}

/// Extension trait interpreting [`AttributeValue`]s for the import.
///
/// # Examples
///
/// ```
/// use cadshp_core::utils::{AttributeValueExt, ValueKind};
/// use cadshp_core_common::AttributeValue;
///
/// let value = AttributeValue::Text("Lot 1".to_string());
/// assert_eq!(
///     value.catalogue_example("%Y"),
///     Some((ValueKind::Text, "\"Lot 1\"".to_string()))
/// );
/// assert_eq!(value.layer_name("%Y").as_deref(), Some("Lot 1"));
/// ```
pub trait AttributeValueExt {
    /// Kind and example text recorded in the attribute catalogue.
    ///
    /// Returns `None` for values that must not be catalogued.
    fn catalogue_example(&self, date_format: &str) -> Option<(ValueKind, String)>;

    /// Text the value contributes as a layer name, `None` when the value is unusable.
    fn layer_name(&self, date_format: &str) -> Option<String>;

    /// Converts the value into a typed layer property.
    fn to_property(&self, date_format: &str) -> TypedProperty;
}

impl AttributeValueExt for AttributeValue {
    fn catalogue_example(&self, date_format: &str) -> Option<(ValueKind, String)> {
        match self {
            AttributeValue::Number(n) if n.is_finite() => {
                Some((ValueKind::Number, format_number(*n)))
            },
            AttributeValue::Text(s) if !s.is_empty() => Some((ValueKind::Text, format!("\"{s}\""))),
            AttributeValue::Boolean(b) => Some((ValueKind::Boolean, b.to_string())),
            AttributeValue::Date(date) => date
                .format(date_format)
                .map(|text| (ValueKind::Date, text)),
            _ => None,
        }
    }

    fn layer_name(&self, date_format: &str) -> Option<String> {
        match self {
            AttributeValue::Number(n) if n.is_finite() => Some(format_number(*n)),
            AttributeValue::Text(s) if !s.is_empty() => Some(s.clone()),
            AttributeValue::Date(date) => date.format(date_format),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn to_property(&self, date_format: &str) -> TypedProperty {
        match self {
            AttributeValue::Number(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 =>
            {
                TypedProperty::Integer(*n as i64)
            },
            AttributeValue::Number(n) => TypedProperty::Float(*n),
            AttributeValue::Text(s) => TypedProperty::String(s.clone()),
            AttributeValue::Boolean(b) => TypedProperty::Bool(*b),
            AttributeValue::Date(date) => match date.format(date_format) {
                Some(text) => TypedProperty::String(text),
                None => TypedProperty::Untyped(format!(
                    "{:04}{:02}{:02}",
                    date.year, date.month, date.day
                )),
            },
            AttributeValue::Null => TypedProperty::Untyped(String::new()),
            AttributeValue::Unsupported(description) => {
                TypedProperty::Untyped(description.clone())
            },
        }
    }
}
