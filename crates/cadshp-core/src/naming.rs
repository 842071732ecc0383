//! Layer names of feature layers.

use cadshp_core_common::Attributes;

use crate::selector::LayerNameCandidates;
use crate::utils::AttributeValueExt;

/// Counter minting fallback layer names for one import run.
///
/// Owned by the run and handed to the assembler by reference, so separate runs never
/// share ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerIdCounter(u64);

impl LayerIdCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// The last id handed out, `0` before the first one.
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.0
    }

    /// Increments the counter and returns the new value.
    pub fn next_id(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// Derives the name of a feature layer.
///
/// The approved fields are tried in priority order; the first one holding a finite
/// number, non-empty text or valid date names the layer. When none does, the counter
/// is incremented and its new value becomes the name.
///
/// # Examples
///
/// ```
/// use cadshp_core::naming::{LayerIdCounter, derive_layer_name};
/// use cadshp_core::selector::LayerNameCandidates;
/// use cadshp_core_common::{AttributeValue, Attributes};
///
/// let attributes: Attributes = [("name", AttributeValue::Text("Lot 1".into()))]
///     .into_iter()
///     .collect();
/// let mut counter = LayerIdCounter::new();
///
/// let approved = LayerNameCandidates::new(["name"]);
/// assert_eq!(derive_layer_name(&attributes, &approved, &mut counter, "%Y"), "Lot 1");
///
/// let none = LayerNameCandidates::default();
/// assert_eq!(derive_layer_name(&attributes, &none, &mut counter, "%Y"), "1");
/// ```
pub fn derive_layer_name(
    attributes: &Attributes,
    candidates: &LayerNameCandidates,
    counter: &mut LayerIdCounter,
    date_format: &str,
) -> String {
    candidates
        .iter()
        .filter_map(|field| attributes.get(field))
        .find_map(|value| value.layer_name(date_format))
        .unwrap_or_else(|| counter.next_id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadshp_core_common::{AttributeValue, DateValue};

    const DATE_FORMAT: &str = "%Y-%m-%d";

    fn attributes() -> Attributes {
        [
            ("name", AttributeValue::Text(String::new())),
            ("area", AttributeValue::Number(120.5)),
            ("surveyed", AttributeValue::Date(DateValue::new(2019, 4, 30))),
            ("vacant", AttributeValue::Boolean(true)),
            ("broken", AttributeValue::Number(f64::NAN)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_first_usable_candidate_wins() {
        let mut counter = LayerIdCounter::new();
        let candidates = LayerNameCandidates::new(["missing", "name", "broken", "area", "surveyed"]);
        let name = derive_layer_name(&attributes(), &candidates, &mut counter, DATE_FORMAT);
        assert_eq!(name, "120.5");
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn test_date_candidate() {
        let mut counter = LayerIdCounter::new();
        let candidates = LayerNameCandidates::new(["surveyed", "area"]);
        let name = derive_layer_name(&attributes(), &candidates, &mut counter, DATE_FORMAT);
        assert_eq!(name, "2019-04-30");
    }

    #[test]
    fn test_booleans_do_not_name_layers() {
        let mut counter = LayerIdCounter::new();
        let candidates = LayerNameCandidates::new(["vacant"]);
        let name = derive_layer_name(&attributes(), &candidates, &mut counter, DATE_FORMAT);
        assert_eq!(name, "1");
    }

    #[test]
    fn test_fallback_increments_by_one_per_feature() {
        let mut counter = LayerIdCounter::new();
        let candidates = LayerNameCandidates::new(["name"]);
        for expected in 1..=3u64 {
            let before = counter.current();
            let name = derive_layer_name(&attributes(), &candidates, &mut counter, DATE_FORMAT);
            assert_eq!(name, (before + 1).to_string());
            assert_eq!(counter.current(), expected);
        }
    }

    #[test]
    fn test_repeated_derivation_is_stable() {
        let candidates = LayerNameCandidates::new(["area"]);
        let first = derive_layer_name(
            &attributes(),
            &candidates,
            &mut LayerIdCounter::new(),
            DATE_FORMAT,
        );
        let second = derive_layer_name(
            &attributes(),
            &candidates,
            &mut LayerIdCounter::new(),
            DATE_FORMAT,
        );
        assert_eq!(first, second);
    }
}
