use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One directory in the browsed project.
///
/// Children are owned by the [`crate::tree::FileTree`] index and referenced
/// here by path, as is the parent. Discovery order is kept in `children`;
/// presentation order is always computed by sorting on path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub full_path: PathBuf,
    pub is_dir: bool,
    pub expanded: bool,
    pub is_package: bool,
    pub parent: Option<PathBuf>,
    pub children: Vec<PathBuf>,
    pub depth: usize,
    /// Set once the directory has been listed successfully.
    pub explored: bool,
}

impl FileNode {
    pub fn new(full_path: PathBuf, is_dir: bool, is_package: bool) -> Self {
        Self {
            full_path,
            is_dir,
            expanded: false,
            is_package,
            parent: None,
            children: Vec::new(),
            depth: 0,
            explored: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn visible_children(&self) -> &[PathBuf] {
        if self.expanded { &self.children } else { &[] }
    }

    pub fn sorted_visible_children(&self) -> Vec<&Path> {
        sorted_paths(self.visible_children())
    }

    pub fn sorted_children(&self) -> Vec<&Path> {
        sorted_paths(&self.children)
    }

    pub fn name(&self) -> String {
        self.full_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.full_path.display().to_string())
    }
}

fn sorted_paths(paths: &[PathBuf]) -> Vec<&Path> {
    let mut sorted: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
    sorted.sort();
    sorted
}

/// A directory the user confirmed as a package boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedPackage {
    pub path: PathBuf,
    pub tags: Vec<String>,
}

impl fmt::Display for SelectedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.path.display(), self.tags.join(","))
    }
}

/// Discrete navigation input, decoupled from whatever produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Expand,
    Collapse,
    ToggleSelect,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    QuitNoSave,
    QuitSave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Saved(Vec<SelectedPackage>),
    Discarded,
}

pub const KEY_BINDING_LEGEND: [(&str, &str); 6] = [
    ("Ctrl + c", "Exit without saving"),
    ("Ctrl + s", "Save packages"),
    ("Enter", "Mark/unmark package"),
    ("Up/Down", "Navigate"),
    ("Right", "Expand"),
    ("Left", "Collapse"),
];
