use crate::domain::{Command, ExitCode, FileNode};
use crate::error::{TreeError, TreeResult};
use crate::tree::FileTree;
use std::path::{Path, PathBuf};

/// Cursor over the visible rows of a [`FileTree`].
///
/// Movement only follows parent, child and sibling links. `cursor_row` is kept
/// in step for viewport scrolling but never decides what is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    selected: PathBuf,
    cursor_row: usize,
}

impl Navigator {
    pub fn new(tree: &FileTree) -> Self {
        Self {
            selected: tree.root().full_path.clone(),
            cursor_row: 0,
        }
    }

    pub fn selected(&self) -> &Path {
        &self.selected
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    /// Applies one command. Returns the exit signal for `Confirm` and `Cancel`.
    pub fn update(
        &mut self,
        tree: &mut FileTree,
        command: Command,
    ) -> TreeResult<Option<ExitCode>> {
        match command {
            Command::Up => self.move_up(tree)?,
            Command::Down => self.move_down(tree)?,
            Command::Expand => self.selected_node_mut(tree)?.expanded = true,
            Command::Collapse => self.selected_node_mut(tree)?.expanded = false,
            Command::ToggleSelect => {
                let node = self.selected_node_mut(tree)?;
                node.is_package = !node.is_package;
            }
            Command::Confirm => return Ok(Some(ExitCode::QuitSave)),
            Command::Cancel => return Ok(Some(ExitCode::QuitNoSave)),
        }
        Ok(None)
    }

    pub fn selected_node<'a>(&self, tree: &'a FileTree) -> TreeResult<&'a FileNode> {
        tree.get(&self.selected)
            .ok_or_else(|| TreeError::ConsistencyViolation(self.selected.clone()))
    }

    fn selected_node_mut<'a>(&self, tree: &'a mut FileTree) -> TreeResult<&'a mut FileNode> {
        tree.get_mut(&self.selected)
            .ok_or_else(|| TreeError::ConsistencyViolation(self.selected.clone()))
    }

    fn move_down(&mut self, tree: &FileTree) -> TreeResult<()> {
        let node = self.selected_node(tree)?;

        if let Some(first) = node.sorted_visible_children().first() {
            self.selected = first.to_path_buf();
            self.cursor_row += 1;
            return Ok(());
        }
        if node.is_root() {
            return Ok(());
        }

        // Climb until some ancestor has a following sibling.
        let mut current = node;
        let next = loop {
            if let Some(next) = next_sibling(tree, current)? {
                break Some(next);
            }
            match &current.parent {
                Some(parent) => current = lookup(tree, parent)?,
                None => break None,
            }
        };

        if let Some(next) = next {
            self.selected = next.to_path_buf();
            self.cursor_row += 1;
        }
        Ok(())
    }

    fn move_up(&mut self, tree: &FileTree) -> TreeResult<()> {
        let node = self.selected_node(tree)?;

        if let Some(prev) = prev_sibling(tree, node)? {
            let mut current = lookup(tree, prev)?;
            loop {
                let Some(last) = current.sorted_visible_children().last().copied() else {
                    break;
                };
                current = lookup(tree, last)?;
            }
            self.selected = current.full_path.clone();
            self.cursor_row = self.cursor_row.saturating_sub(1);
        } else if let Some(parent) = &node.parent {
            self.selected = parent.clone();
            self.cursor_row = self.cursor_row.saturating_sub(1);
        }
        Ok(())
    }
}

fn lookup<'a>(tree: &'a FileTree, path: &Path) -> TreeResult<&'a FileNode> {
    tree.get(path)
        .ok_or_else(|| TreeError::ConsistencyViolation(path.to_path_buf()))
}

/// Previous and next visible siblings of `node`, in path order.
///
/// A node missing from its parent's child list means the tree is corrupt and
/// yields [`TreeError::ConsistencyViolation`].
pub fn siblings<'a>(
    tree: &'a FileTree,
    node: &FileNode,
) -> TreeResult<(Option<&'a Path>, Option<&'a Path>)> {
    let Some(parent_path) = &node.parent else {
        return Ok((None, None));
    };
    let parent = lookup(tree, parent_path)?;
    let sorted = parent.sorted_visible_children();
    if sorted.is_empty() {
        return Ok((None, None));
    }

    let index = sorted
        .iter()
        .position(|path| *path == node.full_path)
        .ok_or_else(|| TreeError::ConsistencyViolation(node.full_path.clone()))?;

    let prev = index.checked_sub(1).map(|i| sorted[i]);
    let next = sorted.get(index + 1).copied();
    Ok((prev, next))
}

pub fn prev_sibling<'a>(tree: &'a FileTree, node: &FileNode) -> TreeResult<Option<&'a Path>> {
    Ok(siblings(tree, node)?.0)
}

pub fn next_sibling<'a>(tree: &'a FileTree, node: &FileNode) -> TreeResult<Option<&'a Path>> {
    Ok(siblings(tree, node)?.1)
}
