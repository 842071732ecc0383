//! Selection of the attribute fields that may name feature layers.

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use cadshp_core_common::{FieldPicker, PickItem};
use log::{info, warn};

use crate::catalogue::AttributeCatalogue;
use crate::error::{Result, SelectionError};

/// Title of the field selection prompt.
pub const PICKER_TITLE: &str = "Select the attribute fields used to name feature layers";

/// Grouping kind shown for every field item.
pub const FIELD_ITEM_KIND: &str = "field";

/// Field names approved as layer-name sources, in priority order.
///
/// An empty list is valid: every feature then gets a fallback name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerNameCandidates(Vec<String>);

impl LayerNameCandidates {
    /// Creates the list, dropping repeated names.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !names.contains(&field) {
                names.push(field);
            }
        }
        Self(names)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds one picker item per catalogued field.
#[must_use]
pub fn pick_items(catalogue: &AttributeCatalogue) -> Vec<PickItem> {
    catalogue
        .fields()
        .iter()
        .map(|field| PickItem {
            label: field.name.clone(),
            kind: FIELD_ITEM_KIND.to_string(),
            detail: field.hint(),
        })
        .collect()
}

/// Asks the user which fields may name layers.
///
/// Suspends until the picker answers. The answer keeps the picker's selection order.
///
/// # Errors
///
/// Returns [`SelectionError::Picker`] when the picker fails.
pub async fn select_candidates<P>(
    picker: &mut P,
    catalogue: &AttributeCatalogue,
) -> Result<LayerNameCandidates>
where
    P: FieldPicker + ?Sized,
{
    let items = pick_items(catalogue);
    let picked = picker
        .pick(PICKER_TITLE, items, true)
        .await
        .map_err(|e| SelectionError::Picker { source: e.into() })?;

    let candidates = LayerNameCandidates::new(picked.into_iter().map(|item| item.label));
    if candidates.is_empty() {
        info!("No layer-name fields selected, feature layers get numbered names");
    } else {
        let names: Vec<&str> = candidates.iter().collect();
        info!("Layer-name fields: {}", names.join(", "));
    }
    Ok(candidates)
}

/// Picker answering with a fixed, ordered list of field names.
///
/// Names that are not offered are reported and ignored.
#[derive(Debug, Clone, Default)]
pub struct PresetPicker {
    fields: Vec<String>,
}

impl PresetPicker {
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl FieldPicker for PresetPicker {
    async fn pick(
        &mut self,
        _title: &str,
        items: Vec<PickItem>,
        _multi_select: bool,
    ) -> AnyResult<Vec<PickItem>> {
        let mut picked = Vec::new();
        for field in &self.fields {
            match items.iter().find(|item| item.label == *field) {
                Some(item) => picked.push(item.clone()),
                None => warn!("Field '{field}' does not occur in any dataset, ignoring"),
            }
        }
        Ok(picked)
    }
}

/// Picker answering with every offered field, in catalogue order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllFieldsPicker;

#[async_trait]
impl FieldPicker for AllFieldsPicker {
    async fn pick(
        &mut self,
        _title: &str,
        items: Vec<PickItem>,
        _multi_select: bool,
    ) -> AnyResult<Vec<PickItem>> {
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CadShpError;
    use anyhow::anyhow;
    use cadshp_core_common::AttributeValue;

    fn catalogue() -> AttributeCatalogue {
        let mut catalogue = AttributeCatalogue::new();
        catalogue.record("name", &AttributeValue::Text("Lot 1".into()), "%Y");
        catalogue.record("area", &AttributeValue::Number(120.5), "%Y");
        catalogue.record("zone", &AttributeValue::Number(4.0), "%Y");
        catalogue.record("zone", &AttributeValue::Text("R1".into()), "%Y");
        catalogue
    }

    struct RecordingPicker {
        title: Option<String>,
        offered: Vec<PickItem>,
        answer: Vec<&'static str>,
    }

    #[async_trait]
    impl FieldPicker for RecordingPicker {
        async fn pick(
            &mut self,
            title: &str,
            items: Vec<PickItem>,
            multi_select: bool,
        ) -> AnyResult<Vec<PickItem>> {
            assert!(multi_select);
            self.title = Some(title.to_string());
            self.offered.clone_from(&items);
            Ok(self
                .answer
                .iter()
                .filter_map(|label| items.iter().find(|i| i.label == *label).cloned())
                .collect())
        }
    }

    struct FailingPicker;

    #[async_trait]
    impl FieldPicker for FailingPicker {
        async fn pick(
            &mut self,
            _title: &str,
            _items: Vec<PickItem>,
            _multi_select: bool,
        ) -> AnyResult<Vec<PickItem>> {
            Err(anyhow!("prompt closed"))
        }
    }

    #[test]
    fn test_pick_items_carry_hints() {
        let items = pick_items(&catalogue());
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].label, "zone");
        assert_eq!(items[2].kind, "field");
        assert_eq!(items[2].detail, "number: 4, text: \"R1\"");
    }

    #[test]
    fn test_candidates_drop_duplicates() {
        let candidates = LayerNameCandidates::new(["a", "b", "a"]);
        assert_eq!(candidates.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_selection_order_is_kept() -> Result<()> {
        let mut picker = RecordingPicker {
            title: None,
            offered: Vec::new(),
            answer: vec!["zone", "name"],
        };
        let candidates = select_candidates(&mut picker, &catalogue()).await?;
        assert_eq!(candidates.iter().collect::<Vec<_>>(), vec!["zone", "name"]);
        assert_eq!(picker.title.as_deref(), Some(PICKER_TITLE));
        assert_eq!(picker.offered.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_selection() -> Result<()> {
        let candidates = select_candidates(&mut PresetPicker::default(), &catalogue()).await?;
        assert!(candidates.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_preset_picker_ignores_unknown_fields() -> Result<()> {
        let mut picker = PresetPicker::new(["owner", "area", "name"]);
        let candidates = select_candidates(&mut picker, &catalogue()).await?;
        assert_eq!(candidates.iter().collect::<Vec<_>>(), vec!["area", "name"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_all_fields_picker() -> Result<()> {
        let candidates = select_candidates(&mut AllFieldsPicker, &catalogue()).await?;
        assert_eq!(
            candidates.iter().collect::<Vec<_>>(),
            vec!["name", "area", "zone"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_picker_failure() {
        let err = select_candidates(&mut FailingPicker, &catalogue())
            .await
            .unwrap_err();
        assert!(matches!(err, CadShpError::Selection(_)));
        assert!(err.to_string().contains("prompt closed"));
    }
}
