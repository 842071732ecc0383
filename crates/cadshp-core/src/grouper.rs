//! Grouping of loose workspace files into shapefile datasets.

use cadshp_core_common::{FileRole, Progress, ShapefileDataset, WorkspaceTree};
use log::{debug, warn};

use crate::error::{ContextExt, Result, TreeError};

/// Datasets collected from a workspace tree, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DatasetSet {
    datasets: Vec<ShapefileDataset>,
    skipped: Vec<String>,
}

impl DatasetSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dataset for a base name, creating it on first sight.
    pub fn entry(&mut self, name: &str) -> &mut ShapefileDataset {
        let index = match self.datasets.iter().position(|d| d.name() == name) {
            Some(index) => index,
            None => {
                self.datasets.push(ShapefileDataset::new(name));
                self.datasets.len() - 1
            },
        };
        &mut self.datasets[index]
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ShapefileDataset> {
        self.datasets.iter().find(|d| d.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapefileDataset> {
        self.datasets.iter()
    }

    /// Host paths of the files that were skipped.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Splits a file name into base name and extension.
///
/// The extension is always the last three characters; one trailing `.` is removed
/// from the base name. Names shorter than three characters have no extension.
///
/// # Examples
///
/// ```
/// use cadshp_core::grouper::split_file_name;
///
/// assert_eq!(split_file_name("parcels.shp"), Some(("parcels", "shp")));
/// assert_eq!(split_file_name("roads.v2.dbf"), Some(("roads.v2", "dbf")));
/// assert_eq!(split_file_name("ab"), None);
/// ```
#[must_use]
pub fn split_file_name(name: &str) -> Option<(&str, &str)> {
    let (split, _) = name.char_indices().rev().nth(2)?;
    let (base, extension) = name.split_at(split);
    Some((base.strip_suffix('.').unwrap_or(base), extension))
}

/// Walks the whole tree and collects every recognized file into its dataset.
///
/// Folders are descended depth-first in listing order. Files with an unrecognized
/// extension are logged and skipped. The traversal completes before this function
/// returns, so every dataset holds all of its sibling files.
///
/// # Errors
///
/// Returns a [`TreeError`] when the root cannot be opened, a folder cannot be listed
/// or a file cannot be read.
pub async fn group_datasets<T>(tree: &T, progress: &mut dyn Progress) -> Result<DatasetSet>
where
    T: WorkspaceTree + ?Sized,
{
    let root = tree.root().await.map_err(|e| TreeError::Root {
        origin: tree.origin().to_string(),
        source: e.into(),
    })?;

    let mut set = DatasetSet::new();
    let mut pending = vec![root];
    while let Some(item) = pending.pop() {
        if item.is_folder() {
            let children = tree.children(&item).await.with_list_context(&item.path)?;
            pending.extend(children.into_iter().rev());
            continue;
        }

        progress.detail(&item.name);
        let role = split_file_name(&item.name)
            .and_then(|(base, extension)| Some((base, FileRole::from_extension(extension)?)));
        let Some((base, role)) = role else {
            let extension = split_file_name(&item.name).map_or("", |(_, ext)| ext);
            warn!(
                "Unsupported file extension '{extension}', skipping {}",
                item.path
            );
            set.skipped.push(item.path);
            continue;
        };

        let content = tree.read(&item).await.with_read_context(&item.path)?;
        debug!("Collected {} ({} bytes) for dataset '{base}'", item.path, content.len());
        if set.entry(base).insert(role, content).is_some() {
            warn!("Dataset '{base}' already had a .{role} file, replaced by {}", item.path);
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use crate::testing::{capture_logs, logged};
    use crate::tree::MemoryTree;
    use bytes::Bytes;
    use log::Level;

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("parcels.shp"), Some(("parcels", "shp")));
        assert_eq!(split_file_name("parcelsshp"), Some(("parcels", "shp")));
        assert_eq!(split_file_name("a.b.c.prj"), Some(("a.b.c", "prj")));
        assert_eq!(split_file_name("notes.txt"), Some(("notes", "txt")));
        assert_eq!(split_file_name("shp"), Some(("", "shp")));
        assert_eq!(split_file_name("xy"), None);
        assert_eq!(split_file_name("straße.dbf"), Some(("straße", "dbf")));
    }

    #[test]
    fn test_dataset_set_keeps_first_seen_order() {
        let mut set = DatasetSet::new();
        set.entry("roads");
        set.entry("parcels");
        set.entry("roads");
        let names: Vec<&str> = set.iter().map(ShapefileDataset::name).collect();
        assert_eq!(names, vec!["roads", "parcels"]);
    }

    #[tokio::test]
    async fn test_siblings_merge_into_one_dataset() -> Result<()> {
        let tree = MemoryTree::new("import")
            .with_file("parcels.shp", "shp")
            .with_file("roads.shp", "roads")
            .with_file("parcels.dbf", "dbf")
            .with_file("parcels.prj", "prj");

        let set = group_datasets(&tree, &mut SilentProgress).await?;
        assert_eq!(set.len(), 2);
        let parcels = set.get("parcels").unwrap();
        assert_eq!(parcels.len(), 3);
        assert_eq!(parcels.get(FileRole::Dbf), Some(&Bytes::from("dbf")));
        assert!(set.get("roads").unwrap().contains(FileRole::Shp));
        Ok(())
    }

    #[tokio::test]
    async fn test_nested_folders_share_base_names() -> Result<()> {
        let tree = MemoryTree::new("import")
            .with_file("geometry/parcels.shp", "shp")
            .with_file("tables/parcels.dbf", "dbf");

        let set = group_datasets(&tree, &mut SilentProgress).await?;
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("parcels").unwrap().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unrecognized_extension_is_skipped() -> Result<()> {
        capture_logs();
        let tree = MemoryTree::new("import")
            .with_file("parcels.shp", "shp")
            .with_file("parcels.xml", "<xml/>")
            .with_file("README.md", "# hi")
            .with_file("PARCELS.SHP", "upper");

        let set = group_datasets(&tree, &mut SilentProgress).await?;
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("parcels").unwrap().len(), 1);
        assert_eq!(set.skipped(), &["parcels.xml", "README.md", "PARCELS.SHP"]);
        for path in set.skipped() {
            assert_eq!(logged(Level::Warn, &format!("skipping {path}")), 1, "{path}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_tree() -> Result<()> {
        let tree = MemoryTree::new("import");
        let set = group_datasets(&tree, &mut SilentProgress).await?;
        assert!(set.is_empty());
        Ok(())
    }
}
