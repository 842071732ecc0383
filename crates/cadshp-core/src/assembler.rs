//! Creation of the root → dataset → feature layer hierarchy.

use cadshp_core_common::{
    AttributeValue, Attributes, Drawing, Handle, LayerSpec, Progress, PropertyObject,
};
use log::{debug, info, warn};

use crate::decoder::DecodedDataset;
use crate::error::{ContextExt, Result};
use crate::geometry::{GeometryMapper, emit_primitives};
use crate::naming::{LayerIdCounter, derive_layer_name};
use crate::options::ImportOptions;
use crate::selector::LayerNameCandidates;
use crate::utils::AttributeValueExt;

/// Counts of what the assembler wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub layers: usize,
    pub features: usize,
    pub entities: usize,
    /// Geometry parts that produced no entity.
    pub skipped_geometries: usize,
    /// Feature layers named by the fallback counter.
    pub fallback_names: usize,
}

/// Converts a feature's attributes into layer properties, in field order.
///
/// Nulls and unsupported values are stored without a type tag and reported.
#[must_use]
pub fn feature_properties(attributes: &Attributes, date_format: &str) -> PropertyObject {
    attributes
        .iter()
        .map(|(name, value)| {
            match value {
                AttributeValue::Null => debug!("Field '{name}' is empty, stored untyped"),
                AttributeValue::Unsupported(description) => {
                    warn!("Field '{name}' holds an unsupported value ({description}), stored untyped");
                },
                _ => {},
            }
            (name.to_string(), value.to_property(date_format))
        })
        .collect()
}

/// Writes layers and entities for every decoded dataset.
///
/// Expects the caller to hold the layer-update and edit sessions open.
pub struct Assembler<'a> {
    options: &'a ImportOptions,
    candidates: &'a LayerNameCandidates,
    mapper: GeometryMapper,
}

impl<'a> Assembler<'a> {
    #[must_use]
    pub fn new(options: &'a ImportOptions, candidates: &'a LayerNameCandidates) -> Self {
        Self {
            options,
            candidates,
            mapper: GeometryMapper::from_options(options),
        }
    }

    /// Creates the whole hierarchy under a new root layer.
    ///
    /// Progress is reported as `index * 100 / total` when each dataset starts.
    ///
    /// # Errors
    ///
    /// Returns a host error as soon as a drawing call fails; layers created up to that
    /// point are left in the drawing.
    pub async fn assemble<D>(
        &self,
        drawing: &mut D,
        root_name: &str,
        datasets: &[DecodedDataset],
        counter: &mut LayerIdCounter,
        progress: &mut dyn Progress,
    ) -> Result<AssemblyStats>
    where
        D: Drawing + ?Sized,
    {
        let mut stats = AssemblyStats::default();
        let root = self
            .create_layer(drawing, root_name, Vec::new(), None, &mut stats)
            .await?;
        info!("Created root layer '{root_name}'");

        let total = datasets.len();
        for (index, dataset) in datasets.iter().enumerate() {
            progress.percent(percent(index, total));
            progress.detail(&dataset.name);

            let dataset_layer = self
                .create_layer(drawing, &dataset.name, Vec::new(), Some(root), &mut stats)
                .await?;

            for feature in &dataset.collection.features {
                let date_format = self.options.date_format.as_str();
                let properties = feature_properties(&feature.attributes, date_format);

                let before = counter.current();
                let name =
                    derive_layer_name(&feature.attributes, self.candidates, counter, date_format);
                if counter.current() != before {
                    stats.fallback_names += 1;
                }

                let layer = self
                    .create_layer(drawing, &name, properties, Some(dataset_layer), &mut stats)
                    .await?;
                stats.features += 1;

                let Some(geometry) = &feature.geometry else {
                    debug!("Feature layer '{name}' has no geometry");
                    continue;
                };
                let plan = self.mapper.plan(geometry);
                stats.skipped_geometries += plan.skipped;
                let handles = emit_primitives(drawing, layer, plan.primitives).await?;
                stats.entities += handles.len();
            }

            info!(
                "Wrote dataset '{}' ({} feature layer(s))",
                dataset.name,
                dataset.collection.len()
            );
        }
        if total > 0 {
            progress.percent(100);
        }

        Ok(stats)
    }

    async fn create_layer<D>(
        &self,
        drawing: &mut D,
        name: &str,
        properties: PropertyObject,
        parent: Option<Handle>,
        stats: &mut AssemblyStats,
    ) -> Result<Handle>
    where
        D: Drawing + ?Sized,
    {
        let spec = LayerSpec {
            name: name.to_string(),
            properties,
            disabled: self.options.hidden_layers,
        };
        let handle = drawing
            .create_layer(spec)
            .await
            .with_host_context("create layer")?;
        if let Some(parent) = parent {
            drawing
                .set_layer_ref(handle, parent)
                .await
                .with_host_context("set layer parent")?;
        }
        stats.layers += 1;
        Ok(handle)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percent(index: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (index * 100 / total) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::memory::{FailurePoint, MemoryDrawing};
    use crate::progress::SilentProgress;
    use cadshp_core_common::{
        DateValue, EntityEditor, Feature, FeatureCollection, LayerTable, Point3, TypedProperty,
    };
    use geojson::{Geometry, Value};
    use std::time::{Duration, Instant};

    struct PercentLog(Vec<u32>);

    impl Progress for PercentLog {
        fn begin(&mut self, _label: &str) {}

        fn percent(&mut self, value: u32) {
            self.0.push(value);
        }

        fn detail(&mut self, _text: &str) {}
    }

    fn point_feature(x: f64, y: f64, attributes: &[(&str, AttributeValue)]) -> Feature {
        Feature::new(
            Some(Geometry::new(Value::Point(vec![x, y]))),
            attributes.iter().cloned().collect(),
        )
    }

    fn dataset(name: &str, features: Vec<Feature>) -> DecodedDataset {
        DecodedDataset {
            name: name.to_string(),
            collection: FeatureCollection::new(features),
        }
    }

    async fn open(drawing: &mut MemoryDrawing) -> anyhow::Result<()> {
        drawing.begin_update().await?;
        drawing.begin_edit().await
    }

    #[test]
    fn test_feature_properties_are_typed() {
        let attributes: Attributes = [
            ("id", AttributeValue::Number(7.0)),
            ("area", AttributeValue::Number(120.5)),
            ("name", AttributeValue::Text("Lot 1".into())),
            ("vacant", AttributeValue::Boolean(false)),
            ("built", AttributeValue::Date(DateValue::new(1990, 6, 1))),
            ("broken", AttributeValue::Date(DateValue::new(1990, 2, 30))),
            ("note", AttributeValue::Null),
            ("blob", AttributeValue::Unsupported("binary".into())),
        ]
        .into_iter()
        .collect();

        let properties = feature_properties(&attributes, "%Y-%m-%d");
        let values: Vec<&TypedProperty> = properties.iter().map(|(_, v)| v).collect();
        assert_eq!(
            values,
            vec![
                &TypedProperty::Integer(7),
                &TypedProperty::Float(120.5),
                &TypedProperty::String("Lot 1".into()),
                &TypedProperty::Bool(false),
                &TypedProperty::String("1990-06-01".into()),
                &TypedProperty::Untyped("19900230".into()),
                &TypedProperty::Untyped(String::new()),
                &TypedProperty::Untyped("binary".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_three_level_hierarchy() -> anyhow::Result<()> {
        let options = ImportOptions::default().with_scale(2.0);
        let candidates = LayerNameCandidates::new(["name"]);
        let datasets = vec![
            dataset(
                "parcels",
                vec![point_feature(
                    1.0,
                    2.0,
                    &[("name", AttributeValue::Text("Lot 1".into()))],
                )],
            ),
            dataset("wells", vec![point_feature(3.0, 4.0, &[])]),
        ];

        let mut drawing = MemoryDrawing::new();
        open(&mut drawing).await?;
        let mut counter = LayerIdCounter::new();
        let mut progress = PercentLog(Vec::new());
        let stats = Assembler::new(&options, &candidates)
            .assemble(&mut drawing, "survey", &datasets, &mut counter, &mut progress)
            .await?;

        assert_eq!(stats.layers, 5);
        assert_eq!(stats.features, 2);
        assert_eq!(stats.entities, 2);
        assert_eq!(stats.fallback_names, 1);
        assert_eq!(progress.0, vec![0, 50, 100]);

        let root = drawing.layer_named("survey").unwrap();
        assert!(root.parent.is_none());
        assert!(root.disabled);
        let dataset_names: Vec<&str> = drawing
            .child_layers(root.handle)
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(dataset_names, vec!["parcels", "wells"]);

        let wells = drawing.layer_named("wells").unwrap();
        let leaf = drawing.child_layers(wells.handle).next().unwrap();
        assert_eq!(leaf.name, "1");
        let entity = drawing.entities_on(leaf.handle).next().unwrap();
        assert_eq!(
            entity.primitive,
            Primitive::Circle {
                center: Point3::new(6.0, 8.0, 0.0),
                radius: 0.005,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_feature_without_geometry_still_gets_a_layer() -> anyhow::Result<()> {
        let options = ImportOptions::default().with_hidden_layers(false);
        let candidates = LayerNameCandidates::default();
        let datasets = vec![dataset(
            "notes",
            vec![Feature::new(None, Attributes::default())],
        )];

        let mut drawing = MemoryDrawing::new();
        open(&mut drawing).await?;
        let stats = Assembler::new(&options, &candidates)
            .assemble(
                &mut drawing,
                "root",
                &datasets,
                &mut LayerIdCounter::new(),
                &mut SilentProgress,
            )
            .await?;

        assert_eq!(stats.layers, 3);
        assert_eq!(stats.entities, 0);
        assert!(drawing.entities().is_empty());
        assert!(drawing.layers().iter().all(|l| !l.disabled));
        Ok(())
    }

    #[tokio::test]
    async fn test_counter_is_shared_across_datasets() -> anyhow::Result<()> {
        let options = ImportOptions::default();
        let candidates = LayerNameCandidates::default();
        let datasets = vec![
            dataset("a", vec![point_feature(0.0, 0.0, &[]), point_feature(1.0, 1.0, &[])]),
            dataset("b", vec![point_feature(2.0, 2.0, &[])]),
        ];

        let mut drawing = MemoryDrawing::new();
        open(&mut drawing).await?;
        let mut counter = LayerIdCounter::new();
        Assembler::new(&options, &candidates)
            .assemble(&mut drawing, "root", &datasets, &mut counter, &mut SilentProgress)
            .await?;

        let b = drawing.layer_named("b").unwrap();
        let names: Vec<&str> = drawing
            .child_layers(b.handle)
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["3"]);
        assert_eq!(counter.current(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_large_collection_assembles_in_linear_time() -> anyhow::Result<()> {
        const FEATURES: usize = 50_000;
        let options = ImportOptions::default();
        let candidates = LayerNameCandidates::new(["id"]);
        let features = (0..FEATURES)
            .map(|i| {
                let id = AttributeValue::Number(i as f64);
                point_feature(i as f64, 0.0, &[("id", id)])
            })
            .collect();
        let datasets = vec![dataset("points", features)];

        let mut drawing = MemoryDrawing::new();
        open(&mut drawing).await?;
        let started = Instant::now();
        let stats = Assembler::new(&options, &candidates)
            .assemble(
                &mut drawing,
                "root",
                &datasets,
                &mut LayerIdCounter::new(),
                &mut SilentProgress,
            )
            .await?;
        let elapsed = started.elapsed();

        assert_eq!(stats.features, FEATURES);
        assert_eq!(stats.entities, FEATURES);
        let points = drawing.layer_named("points").unwrap();
        assert_eq!(drawing.child_layers(points.handle).count(), FEATURES);
        let last = drawing.layer_named("49999").unwrap();
        assert_eq!(drawing.entities_on(last.handle).count(), 1);
        assert!(
            elapsed < Duration::from_secs(30),
            "assembling {FEATURES} features took {elapsed:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_host_failure_stops_assembly() -> anyhow::Result<()> {
        let options = ImportOptions::default();
        let candidates = LayerNameCandidates::default();
        let datasets = vec![dataset("a", vec![point_feature(0.0, 0.0, &[])])];

        let mut drawing = MemoryDrawing::new().with_failure(FailurePoint::Layer(2));
        open(&mut drawing).await?;
        let result = Assembler::new(&options, &candidates)
            .assemble(
                &mut drawing,
                "root",
                &datasets,
                &mut LayerIdCounter::new(),
                &mut SilentProgress,
            )
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("create layer"));
        assert_eq!(drawing.layers().len(), 1);
        Ok(())
    }
}
