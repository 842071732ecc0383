//! Collaborator traits implemented by the host application.
//!
//! The importer never touches the host directly. It enumerates files through a
//! [`WorkspaceTree`], writes layers and entities through a [`Drawing`], asks the user
//! through a [`FieldPicker`] and reports through [`Progress`]. Every call that may
//! suspend is an async method so the host stays responsive while an import runs.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

/// Opaque handle of a layer or an entity in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Handle(pub u64);

/// A drawing coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Creation flags of a 3D polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PolylineFlags {
    /// The polyline is a closed ring.
    pub closed: bool,
}

impl PolylineFlags {
    pub const OPEN: Self = Self { closed: false };
    pub const CLOSED: Self = Self { closed: true };
}

/// A layer attribute value tagged with the host's property type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedProperty {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
    /// Stored without a type tag.
    Untyped(String),
}

/// Extended attributes attached to a layer, in field order.
pub type PropertyObject = Vec<(String, TypedProperty)>;

/// Everything the host needs to create one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub name: String,
    pub properties: PropertyObject,
    /// Layer starts hidden.
    pub disabled: bool,
}

/// The layer table of the host document.
#[async_trait]
pub trait LayerTable: Send {
    /// Opens the layer-update transaction.
    async fn begin_update(&mut self) -> Result<()>;

    /// Closes the layer-update transaction.
    async fn end_update(&mut self) -> Result<()>;

    /// Creates a layer and returns its handle.
    async fn create_layer(&mut self, spec: LayerSpec) -> Result<Handle>;
}

/// The entity editor of the host document.
#[async_trait]
pub trait EntityEditor: Send {
    /// Opens the edit session.
    async fn begin_edit(&mut self) -> Result<()>;

    /// Closes the edit session.
    async fn end_edit(&mut self) -> Result<()>;

    async fn add_circle(&mut self, center: Point3, radius: f64) -> Result<Handle>;

    async fn add_line(&mut self, start: Point3, end: Point3) -> Result<Handle>;

    async fn add_polyline(&mut self, vertices: Vec<Point3>, flags: PolylineFlags)
    -> Result<Handle>;

    /// Sets the `$layer` back-reference of a layer or entity.
    async fn set_layer_ref(&mut self, item: Handle, layer: Handle) -> Result<()>;
}

/// A host document offering both the layer table and the entity editor.
pub trait Drawing: LayerTable + EntityEditor {}

impl<T: LayerTable + EntityEditor + ?Sized> Drawing for T {}

/// Kind of an item in the workspace tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    File,
}

/// An entry of the host's virtual file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    /// Display name including the extension.
    pub name: String,
    /// Host specific locator of the item.
    pub path: String,
    pub kind: ItemKind,
}

impl TreeItem {
    #[must_use]
    pub fn folder(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: ItemKind::Folder,
        }
    }

    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: ItemKind::File,
        }
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }
}

/// The host's virtual file tree the import reads from.
#[async_trait]
pub trait WorkspaceTree: Send + Sync {
    /// Name of the import source, used for the root layer.
    fn origin(&self) -> &str;

    /// The folder the import starts from.
    async fn root(&self) -> Result<TreeItem>;

    /// Lists the direct children of a folder.
    async fn children(&self, folder: &TreeItem) -> Result<Vec<TreeItem>>;

    /// Reads the whole content of a file.
    async fn read(&self, file: &TreeItem) -> Result<Bytes>;
}

/// One selectable entry of a picker prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    /// Grouping shown next to the label.
    pub kind: String,
    /// Free form hint text.
    pub detail: String,
}

/// Interactive selection prompt.
#[async_trait]
pub trait FieldPicker: Send {
    /// Shows the items and returns the chosen ones in the order they were selected.
    async fn pick(
        &mut self,
        title: &str,
        items: Vec<PickItem>,
        multi_select: bool,
    ) -> Result<Vec<PickItem>>;
}

/// Progress reporting of a running import.
pub trait Progress: Send {
    /// Starts a new indeterminate phase.
    fn begin(&mut self, label: &str);

    /// Switches to determinate progress.
    fn percent(&mut self, value: u32);

    /// Updates the detail line.
    fn detail(&mut self, text: &str);
}
