//! Workspace trees backed by the local filesystem or by memory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use cadshp_core_common::{TreeItem, WorkspaceTree};

/// A workspace tree rooted at a local directory.
///
/// Children are listed in file-name order so repeated imports of the same folder
/// produce the same layer order.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
    origin: String,
}

impl LocalTree {
    /// Creates a tree rooted at `root`; the origin is the directory's name.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let origin = root
            .file_name()
            .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self { root, origin }
    }

    fn item(path: &Path, is_dir: bool) -> TreeItem {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let locator = path.to_string_lossy().into_owned();
        if is_dir {
            TreeItem::folder(name, locator)
        } else {
            TreeItem::file(name, locator)
        }
    }
}

#[async_trait]
impl WorkspaceTree for LocalTree {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn root(&self) -> Result<TreeItem> {
        let metadata = tokio::fs::metadata(&self.root)
            .await
            .with_context(|| format!("cannot access {}", self.root.display()))?;
        Ok(Self::item(&self.root, metadata.is_dir()))
    }

    async fn children(&self, folder: &TreeItem) -> Result<Vec<TreeItem>> {
        let mut entries = tokio::fs::read_dir(&folder.path).await?;
        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let is_dir = entry.file_type().await?.is_dir();
            items.push(Self::item(&entry.path(), is_dir));
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn read(&self, file: &TreeItem) -> Result<Bytes> {
        let content = tokio::fs::read(&file.path).await?;
        Ok(Bytes::from(content))
    }
}

/// An in-memory workspace tree built from `/`-separated paths.
///
/// Folders are implied by the paths; children keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    origin: String,
    files: Vec<(String, Bytes)>,
}

impl MemoryTree {
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            files: Vec::new(),
        }
    }

    /// Adds a file at a `/`-separated path below the root.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }
}

#[async_trait]
impl WorkspaceTree for MemoryTree {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn root(&self) -> Result<TreeItem> {
        Ok(TreeItem::folder(self.origin.clone(), ""))
    }

    async fn children(&self, folder: &TreeItem) -> Result<Vec<TreeItem>> {
        if !folder.is_folder() {
            bail!("'{}' is not a folder", folder.path);
        }
        let prefix = if folder.path.is_empty() {
            String::new()
        } else {
            format!("{}/", folder.path)
        };

        let mut items: Vec<TreeItem> = Vec::new();
        for (path, _) in &self.files {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    let dir_path = format!("{prefix}{dir}");
                    if !items.iter().any(|item| item.path == dir_path) {
                        items.push(TreeItem::folder(dir, dir_path));
                    }
                },
                None => items.push(TreeItem::file(rest, path.clone())),
            }
        }
        Ok(items)
    }

    async fn read(&self, file: &TreeItem) -> Result<Bytes> {
        self.files
            .iter()
            .find(|(path, _)| *path == file.path)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| anyhow!("no such file: {}", file.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadshp_core_common::ItemKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_tree_lists_folders_once() -> Result<()> {
        let tree = MemoryTree::new("survey")
            .with_file("roads.shp", "a")
            .with_file("zones/parcels.shp", "b")
            .with_file("zones/parcels.dbf", "c");

        let root = tree.root().await?;
        let children = tree.children(&root).await?;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], TreeItem::file("roads.shp", "roads.shp"));
        assert_eq!(children[1], TreeItem::folder("zones", "zones"));

        let nested = tree.children(&children[1]).await?;
        let names: Vec<&str> = nested.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["parcels.shp", "parcels.dbf"]);
        assert_eq!(tree.read(&nested[1]).await?, Bytes::from("c"));
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_tree_missing_file() {
        let tree = MemoryTree::new("survey");
        let result = tree.read(&TreeItem::file("x.shp", "x.shp")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_local_tree() -> Result<()> {
        let temp_dir = TempDir::new()?;
        std::fs::create_dir(temp_dir.path().join("nested"))?;
        std::fs::write(temp_dir.path().join("b.dbf"), b"dbf")?;
        std::fs::write(temp_dir.path().join("a.shp"), b"shp")?;
        std::fs::write(temp_dir.path().join("nested").join("c.prj"), b"prj")?;

        let tree = LocalTree::new(temp_dir.path());
        let root = tree.root().await?;
        assert_eq!(root.kind, ItemKind::Folder);
        assert_eq!(tree.origin(), root.name);

        let children = tree.children(&root).await?;
        let names: Vec<&str> = children.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.shp", "b.dbf", "nested"]);
        assert!(children[2].is_folder());
        assert_eq!(tree.read(&children[0]).await?, Bytes::from_static(b"shp"));
        Ok(())
    }

    #[tokio::test]
    async fn test_local_tree_missing_root() {
        let tree = LocalTree::new("/definitely/not/here");
        assert!(tree.root().await.is_err());
    }
}
