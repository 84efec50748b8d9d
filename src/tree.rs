use crate::domain::FileNode;
use crate::error::{TreeError, TreeResult};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lists the subdirectories of one directory.
pub(crate) type Lister = fn(&Path) -> io::Result<Vec<PathBuf>>;

/// Directory tree rooted at a canonical path.
///
/// All nodes live in a flat path index; parent and child links are keys into
/// that index, so the tree is the only owner of its nodes.
#[derive(Debug, Clone)]
pub struct FileTree {
    root: PathBuf,
    nodes: HashMap<PathBuf, FileNode>,
    package_marker: String,
    lister: Lister,
}

impl FileTree {
    /// Builds the tree, listing directories `depth` levels below the first one.
    ///
    /// The root and its immediate subdirectories are always listed. Every
    /// level inside the budget is marked expanded; the first level past it is
    /// present but collapsed and unlisted.
    pub fn build_from_path(
        path: impl AsRef<Path>,
        depth: usize,
        package_marker: &str,
    ) -> TreeResult<Self> {
        Self::build_with_lister(path, depth, package_marker, list_subdirectories)
    }

    pub(crate) fn build_with_lister(
        path: impl AsRef<Path>,
        depth: usize,
        package_marker: &str,
        lister: Lister,
    ) -> TreeResult<Self> {
        let path = path.as_ref();
        let root = fs::canonicalize(path).map_err(|source| TreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_dir = root.is_dir();
        let mut node = FileNode::new(root.clone(), is_dir, has_marker(&root, package_marker));
        node.expanded = true;

        let mut tree = Self {
            root: root.clone(),
            nodes: HashMap::from([(root.clone(), node)]),
            package_marker: package_marker.to_string(),
            lister,
        };
        tree.build_subtree(&root, depth);
        debug!(root = %root.display(), depth, nodes = tree.len(), "built file tree");
        Ok(tree)
    }

    /// Lists `path` again with a depth budget of one.
    ///
    /// Children already in the tree keep their state and are not duplicated;
    /// only directories that appeared since the last listing are added.
    pub fn expand_path(&mut self, path: &Path) -> TreeResult<()> {
        let node = self
            .nodes
            .get(path)
            .ok_or_else(|| TreeError::NotFound(path.to_path_buf()))?;
        if !node.is_dir {
            return Err(TreeError::NotADirectory(path.to_path_buf()));
        }

        let before = node.children.len();
        self.build_subtree(path, 1);
        let added = self.nodes.get(path).map_or(0, |n| n.children.len() - before);
        debug!(path = %path.display(), added, "expanded path");
        Ok(())
    }

    pub fn root(&self) -> &FileNode {
        &self.nodes[&self.root]
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, path: &Path) -> Option<&FileNode> {
        self.nodes.get(path)
    }

    pub(crate) fn get_mut(&mut self, path: &Path) -> Option<&mut FileNode> {
        self.nodes.get_mut(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Pre-order walk over every materialized node, ignoring `expanded`.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter::new(self, false)
    }

    /// Pre-order walk over nodes reachable through expanded ancestors only.
    pub fn visible(&self) -> TreeIter<'_> {
        TreeIter::new(self, true)
    }

    fn build_subtree(&mut self, dir: &Path, depth: usize) {
        let Some(node) = self.nodes.get(dir) else {
            return;
        };
        if !node.is_dir {
            return;
        }
        let child_depth = node.depth + 1;

        let entries = match (self.lister)(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    path = %dir.display(),
                    error = %err,
                    "failed to list directory, branch left unexplored"
                );
                return;
            }
        };

        if let Some(node) = self.nodes.get_mut(dir) {
            node.explored = true;
        }

        for child_path in entries {
            if self.nodes.contains_key(&child_path) {
                continue;
            }

            let mut child = FileNode::new(
                child_path.clone(),
                true,
                has_marker(&child_path, &self.package_marker),
            );
            child.expanded = depth > 0;
            child.parent = Some(dir.to_path_buf());
            child.depth = child_depth;
            self.nodes.insert(child_path.clone(), child);
            if let Some(parent) = self.nodes.get_mut(dir) {
                parent.children.push(child_path.clone());
            }

            if depth > 0 {
                self.build_subtree(&child_path, depth - 1);
            }
        }
    }
}

fn has_marker(dir: &Path, marker: &str) -> bool {
    dir.join(marker).is_file()
}

/// Non-hidden subdirectories of `dir`, in directory-listing order.
/// Symlinks are not followed so every path stays canonical.
fn list_subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let is_dir = entry
            .file_type()
            .map(|file_type| file_type.is_dir())
            .unwrap_or(false);
        if is_dir {
            out.push(dir.join(entry.file_name()));
        }
    }
    Ok(out)
}

/// Iterative pre-order traversal. Children are pushed in reverse path order
/// so they pop in ascending order.
pub struct TreeIter<'a> {
    tree: &'a FileTree,
    stack: Vec<&'a Path>,
    visible_only: bool,
}

impl<'a> TreeIter<'a> {
    fn new(tree: &'a FileTree, visible_only: bool) -> Self {
        Self {
            tree,
            stack: vec![tree.root.as_path()],
            visible_only,
        }
    }
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = self.stack.pop()?;
            let Some(node) = self.tree.nodes.get(path) else {
                continue;
            };

            let children = if self.visible_only {
                node.sorted_visible_children()
            } else {
                node.sorted_children()
            };
            self.stack.extend(children.into_iter().rev());
            return Some(node);
        }
    }
}
