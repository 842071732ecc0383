//! Catalogue of attribute fields observed across all decoded datasets.
//!
//! For every field name the catalogue remembers which kinds of values were seen and
//! one example per kind. It only exists to help the user choose layer-name fields.

use std::collections::HashMap;

use cadshp_core_common::{AttributeValue, Attributes};

use crate::utils::{AttributeValueExt, ValueKind};

/// Observed kinds and examples of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub name: String,
    /// One example per kind, in the order the kinds were first seen.
    pub examples: Vec<(ValueKind, String)>,
}

impl FieldSummary {
    /// Example recorded for a kind.
    #[must_use]
    pub fn example(&self, kind: ValueKind) -> Option<&str> {
        self.examples
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, example)| example.as_str())
    }

    /// Human readable list of kinds with their examples.
    ///
    /// ```
    /// use cadshp_core::catalogue::FieldSummary;
    /// use cadshp_core::utils::ValueKind;
    ///
    /// let summary = FieldSummary {
    ///     name: "zone".to_string(),
    ///     examples: vec![
    ///         (ValueKind::Number, "4".to_string()),
    ///         (ValueKind::Text, "\"R1\"".to_string()),
    ///     ],
    /// };
    /// assert_eq!(summary.hint(), "number: 4, text: \"R1\"");
    /// ```
    #[must_use]
    pub fn hint(&self) -> String {
        self.examples
            .iter()
            .map(|(kind, example)| format!("{kind}: {example}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Field name → observed kinds → example, in first-seen field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeCatalogue {
    fields: Vec<FieldSummary>,
    /// Field name → slot in `fields`.
    index: HashMap<String, usize>,
}

impl AttributeCatalogue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one attribute value.
    ///
    /// Values that fail classification (non-finite numbers, empty text, invalid dates,
    /// nulls and unsupported values) leave the catalogue untouched. The first example
    /// of each kind is kept.
    pub fn record(&mut self, name: &str, value: &AttributeValue, date_format: &str) {
        let Some((kind, example)) = value.catalogue_example(date_format) else {
            return;
        };

        let index = match self.index.get(name) {
            Some(index) => *index,
            None => {
                let index = self.fields.len();
                self.fields.push(FieldSummary {
                    name: name.to_string(),
                    examples: Vec::new(),
                });
                self.index.insert(name.to_string(), index);
                index
            },
        };
        let field = &mut self.fields[index];
        if field.example(kind).is_none() {
            field.examples.push((kind, example));
        }
    }

    /// Records every value of a feature's attribute map.
    pub fn record_attributes(&mut self, attributes: &Attributes, date_format: &str) {
        for (name, value) in attributes.iter() {
            self.record(name, value, date_format);
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSummary> {
        self.index.get(name).and_then(|index| self.fields.get(*index))
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSummary] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
