use crate::domain::SelectedPackage;
use crate::tree::FileTree;
use std::path::{Component, Path};

/// Every marked node, in full pre-order traversal order.
pub fn collect_selected(tree: &FileTree) -> Vec<SelectedPackage> {
    tree.iter()
        .filter(|node| node.is_package)
        .map(|node| SelectedPackage {
            path: node.full_path.clone(),
            tags: vec![module_tag(tree.root_path(), &node.full_path)],
        })
        .collect()
}

/// Dotted module name for `path`, relative to the project root.
pub fn module_tag(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join(".")
    }
}
