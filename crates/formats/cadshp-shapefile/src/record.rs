//! Conversion of dBASE records into attribute maps.

use cadshp_core_common::{AttributeValue, Attributes, DateValue};
use shapefile::dbase::{FieldValue, Record};

/// Converts one dBASE value.
pub(crate) fn field_to_attribute(value: &FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(text)) => AttributeValue::Text(text.trim_end().to_string()),
        FieldValue::Memo(text) => AttributeValue::Text(text.clone()),
        FieldValue::Numeric(Some(n)) => AttributeValue::Number(*n),
        FieldValue::Float(Some(n)) => AttributeValue::Number(f64::from(*n)),
        FieldValue::Integer(n) => AttributeValue::Number(f64::from(*n)),
        FieldValue::Double(n) | FieldValue::Currency(n) => AttributeValue::Number(*n),
        FieldValue::Logical(Some(b)) => AttributeValue::Boolean(*b),
        FieldValue::Date(Some(date)) => AttributeValue::Date(DateValue::new(
            i32::try_from(date.year()).unwrap_or(0),
            u32::try_from(date.month()).unwrap_or(0),
            u32::try_from(date.day()).unwrap_or(0),
        )),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Null,
        other => AttributeValue::Unsupported(format!("{other:?}")),
    }
}

/// Builds the attribute map of a record, in table field order.
pub(crate) fn record_attributes(fields: &[String], record: &Record) -> Attributes {
    fields
        .iter()
        .map(|name| {
            let value = record
                .get(name)
                .map_or(AttributeValue::Null, field_to_attribute);
            (name.as_str(), value)
        })
        .collect()
}
