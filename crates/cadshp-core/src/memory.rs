//! In-memory drawing.
//!
//! [`MemoryDrawing`] implements both host traits on plain vectors. The CLI imports
//! into it and dumps it as JSON; tests use it to inspect the produced hierarchy and
//! to inject failures at chosen points.
//!
//! Handles, names and `$layer` targets are indexed so that lookups and
//! back-references stay constant time on large imports.

use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use cadshp_core_common::{
    EntityEditor, Handle, LayerSpec, LayerTable, Point3, PolylineFlags, PropertyObject,
};
use serde::Serialize;

use crate::geometry::Primitive;

/// Session call recorded by the drawing, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    BeginUpdate,
    EndUpdate,
    BeginEdit,
    EndEdit,
}

/// Call that should fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    BeginUpdate,
    EndUpdate,
    BeginEdit,
    EndEdit,
    /// The n-th layer creation, counted from 1.
    Layer(usize),
    /// The n-th entity creation, counted from 1.
    Entity(usize),
}

/// Position of a handle in the layer or entity list.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Layer(usize),
    Entity(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerRecord {
    pub handle: Handle,
    pub name: String,
    pub properties: PropertyObject,
    pub disabled: bool,
    /// Target of the `$layer` back-reference.
    pub parent: Option<Handle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub handle: Handle,
    pub primitive: Primitive,
    pub layer: Option<Handle>,
}

/// Drawing document held in memory.
#[derive(Debug, Default, Serialize)]
pub struct MemoryDrawing {
    layers: Vec<LayerRecord>,
    entities: Vec<EntityRecord>,
    #[serde(skip)]
    slots: HashMap<Handle, Slot>,
    /// First layer of each name.
    #[serde(skip)]
    names: HashMap<String, usize>,
    /// Child layer slots per parent layer, in creation order.
    #[serde(skip)]
    children: HashMap<Handle, Vec<usize>>,
    /// Entity slots per layer, in creation order.
    #[serde(skip)]
    attached: HashMap<Handle, Vec<usize>>,
    #[serde(skip)]
    events: Vec<SessionEvent>,
    #[serde(skip)]
    next_handle: u64,
    #[serde(skip)]
    update_open: bool,
    #[serde(skip)]
    edit_open: bool,
    #[serde(skip)]
    failures: Vec<FailurePoint>,
}

impl MemoryDrawing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the given call fail.
    #[must_use]
    pub fn with_failure(mut self, point: FailurePoint) -> Self {
        self.failures.push(point);
        self
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerRecord] {
        &self.layers
    }

    #[must_use]
    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    #[must_use]
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    #[must_use]
    pub fn layer(&self, handle: Handle) -> Option<&LayerRecord> {
        match self.slots.get(&handle) {
            Some(Slot::Layer(index)) => self.layers.get(*index),
            _ => None,
        }
    }

    #[must_use]
    pub fn entity(&self, handle: Handle) -> Option<&EntityRecord> {
        match self.slots.get(&handle) {
            Some(Slot::Entity(index)) => self.entities.get(*index),
            _ => None,
        }
    }

    /// First layer with the given name.
    #[must_use]
    pub fn layer_named(&self, name: &str) -> Option<&LayerRecord> {
        self.names.get(name).and_then(|index| self.layers.get(*index))
    }

    /// Layers without a parent.
    pub fn top_layers(&self) -> impl Iterator<Item = &LayerRecord> {
        self.layers.iter().filter(|l| l.parent.is_none())
    }

    /// Layers whose `$layer` points at `parent`, in creation order.
    pub fn child_layers(&self, parent: Handle) -> impl Iterator<Item = &LayerRecord> {
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|index| self.layers.get(*index))
    }

    /// Entities attached to `layer`, in creation order.
    pub fn entities_on(&self, layer: Handle) -> impl Iterator<Item = &EntityRecord> {
        self.attached
            .get(&layer)
            .into_iter()
            .flatten()
            .filter_map(|index| self.entities.get(*index))
    }

    /// Whether no session is left open.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.update_open && !self.edit_open
    }

    fn injected(&self, point: FailurePoint) -> Result<()> {
        if self.failures.contains(&point) {
            bail!("injected failure at {point:?}");
        }
        Ok(())
    }

    fn mint(&mut self) -> Handle {
        self.next_handle += 1;
        Handle(self.next_handle)
    }

    fn add_entity(&mut self, primitive: Primitive) -> Result<Handle> {
        if !self.edit_open {
            bail!("no edit session is open");
        }
        self.injected(FailurePoint::Entity(self.entities.len() + 1))?;
        let handle = self.mint();
        self.slots.insert(handle, Slot::Entity(self.entities.len()));
        self.entities.push(EntityRecord {
            handle,
            primitive,
            layer: None,
        });
        Ok(handle)
    }
}

/// Moves `index` from the list of `old` to the end of the list of `new`.
fn relink(lists: &mut HashMap<Handle, Vec<usize>>, old: Option<Handle>, new: Handle, index: usize) {
    if let Some(list) = old.and_then(|old| lists.get_mut(&old)) {
        list.retain(|i| *i != index);
    }
    lists.entry(new).or_default().push(index);
}

#[async_trait]
impl LayerTable for MemoryDrawing {
    async fn begin_update(&mut self) -> Result<()> {
        self.injected(FailurePoint::BeginUpdate)?;
        if self.update_open {
            bail!("layer update already open");
        }
        self.update_open = true;
        self.events.push(SessionEvent::BeginUpdate);
        Ok(())
    }

    async fn end_update(&mut self) -> Result<()> {
        if !self.update_open {
            bail!("no layer update is open");
        }
        self.update_open = false;
        self.events.push(SessionEvent::EndUpdate);
        self.injected(FailurePoint::EndUpdate)
    }

    async fn create_layer(&mut self, spec: LayerSpec) -> Result<Handle> {
        if !self.update_open {
            bail!("layer table is not open for update");
        }
        self.injected(FailurePoint::Layer(self.layers.len() + 1))?;
        let handle = self.mint();
        let index = self.layers.len();
        self.slots.insert(handle, Slot::Layer(index));
        self.names.entry(spec.name.clone()).or_insert(index);
        self.layers.push(LayerRecord {
            handle,
            name: spec.name,
            properties: spec.properties,
            disabled: spec.disabled,
            parent: None,
        });
        Ok(handle)
    }
}

#[async_trait]
impl EntityEditor for MemoryDrawing {
    async fn begin_edit(&mut self) -> Result<()> {
        self.injected(FailurePoint::BeginEdit)?;
        if self.edit_open {
            bail!("edit session already open");
        }
        self.edit_open = true;
        self.events.push(SessionEvent::BeginEdit);
        Ok(())
    }

    async fn end_edit(&mut self) -> Result<()> {
        if !self.edit_open {
            bail!("no edit session is open");
        }
        self.edit_open = false;
        self.events.push(SessionEvent::EndEdit);
        self.injected(FailurePoint::EndEdit)
    }

    async fn add_circle(&mut self, center: Point3, radius: f64) -> Result<Handle> {
        self.add_entity(Primitive::Circle { center, radius })
    }

    async fn add_line(&mut self, start: Point3, end: Point3) -> Result<Handle> {
        self.add_entity(Primitive::Line { start, end })
    }

    async fn add_polyline(
        &mut self,
        vertices: Vec<Point3>,
        flags: PolylineFlags,
    ) -> Result<Handle> {
        self.add_entity(Primitive::Polyline { vertices, flags })
    }

    async fn set_layer_ref(&mut self, item: Handle, layer: Handle) -> Result<()> {
        if !self.edit_open {
            bail!("no edit session is open");
        }
        if self.layer(layer).is_none() {
            bail!("unknown layer {}", layer.0);
        }
        if item == layer {
            bail!("layer {} cannot reference itself", layer.0);
        }
        match self.slots.get(&item).copied() {
            Some(Slot::Layer(index)) => {
                let record = &mut self.layers[index];
                let old = record.parent.replace(layer);
                relink(&mut self.children, old, layer, index);
            },
            Some(Slot::Entity(index)) => {
                let record = &mut self.entities[index];
                let old = record.layer.replace(layer);
                relink(&mut self.attached, old, layer, index);
            },
            None => bail!("unknown item {}", item.0),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> LayerSpec {
        LayerSpec {
            name: name.to_string(),
            properties: Vec::new(),
            disabled: true,
        }
    }

    #[tokio::test]
    async fn test_creation_requires_open_sessions() {
        let mut drawing = MemoryDrawing::new();
        assert!(drawing.create_layer(spec("a")).await.is_err());
        assert!(
            drawing
                .add_circle(Point3::new(0.0, 0.0, 0.0), 1.0)
                .await
                .is_err()
        );
        assert!(drawing.end_update().await.is_err());
    }

    #[tokio::test]
    async fn test_hierarchy_and_events() -> Result<()> {
        let mut drawing = MemoryDrawing::new();
        drawing.begin_update().await?;
        drawing.begin_edit().await?;

        let root = drawing.create_layer(spec("root")).await?;
        let child = drawing.create_layer(spec("child")).await?;
        drawing.set_layer_ref(child, root).await?;
        let circle = drawing
            .add_circle(Point3::new(1.0, 2.0, 0.0), 0.5)
            .await?;
        drawing.set_layer_ref(circle, child).await?;

        drawing.end_update().await?;
        drawing.end_edit().await?;

        assert_eq!(drawing.top_layers().count(), 1);
        assert_eq!(drawing.child_layers(root).next().map(|l| l.handle), Some(child));
        assert_eq!(drawing.entities_on(child).count(), 1);
        assert!(drawing.is_idle());
        assert_eq!(
            drawing.events(),
            &[
                SessionEvent::BeginUpdate,
                SessionEvent::BeginEdit,
                SessionEvent::EndUpdate,
                SessionEvent::EndEdit,
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_layer_ref_moves_between_layers() -> Result<()> {
        let mut drawing = MemoryDrawing::new();
        drawing.begin_update().await?;
        drawing.begin_edit().await?;

        let first = drawing.create_layer(spec("first")).await?;
        let second = drawing.create_layer(spec("second")).await?;
        let child = drawing.create_layer(spec("child")).await?;
        drawing.create_layer(spec("first")).await?;
        let line = drawing
            .add_line(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0))
            .await?;

        drawing.set_layer_ref(child, first).await?;
        drawing.set_layer_ref(line, first).await?;
        drawing.set_layer_ref(child, second).await?;
        drawing.set_layer_ref(line, second).await?;

        assert_eq!(drawing.child_layers(first).count(), 0);
        assert_eq!(drawing.entities_on(first).count(), 0);
        assert_eq!(drawing.child_layers(second).next().map(|l| l.handle), Some(child));
        assert_eq!(drawing.entity(line).and_then(|e| e.layer), Some(second));
        assert_eq!(drawing.layer_named("first").map(|l| l.handle), Some(first));
        assert!(drawing.layer(line).is_none());
        assert!(drawing.set_layer_ref(Handle(99), first).await.is_err());
        assert!(drawing.set_layer_ref(child, line).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_injected_entity_failure() -> Result<()> {
        let mut drawing = MemoryDrawing::new().with_failure(FailurePoint::Entity(2));
        drawing.begin_edit().await?;
        drawing
            .add_line(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0))
            .await?;
        let err = drawing
            .add_line(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Entity(2)"));
        assert_eq!(drawing.entities().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_json_dump_skips_session_state() -> Result<()> {
        let mut drawing = MemoryDrawing::new();
        drawing.begin_update().await?;
        drawing.create_layer(spec("root")).await?;
        drawing.end_update().await?;

        let json = serde_json::to_value(&drawing)?;
        assert_eq!(json["layers"][0]["name"], "root");
        assert_eq!(json["layers"][0]["disabled"], true);
        assert!(json.get("events").is_none());
        Ok(())
    }
}
