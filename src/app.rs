use crate::collector::collect_selected;
use crate::domain::{Command, ExitCode, FileNode, SessionOutcome};
use crate::navigator::Navigator;
use crate::tree::FileTree;
use anyhow::Result;
use std::collections::BTreeSet;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone)]
pub enum BackendTask {
    LoadChanges {
        root: PathBuf,
        head: Option<String>,
        base: String,
    },
}

#[derive(Debug, Clone)]
pub enum BackendEvent {
    ChangesLoaded { changed: BTreeSet<PathBuf> },
    Error { context: String, message: String },
}

pub struct App {
    pub tree: FileTree,
    pub navigator: Navigator,
    pub changed: BTreeSet<PathBuf>,
    pub logs: Vec<String>,
    pub busy: bool,
    exit: Option<ExitCode>,
    list_scroll: usize,
}

impl App {
    pub fn new(tree: FileTree) -> Self {
        let navigator = Navigator::new(&tree);
        Self {
            tree,
            navigator,
            changed: BTreeSet::new(),
            logs: Vec::new(),
            busy: false,
            exit: None,
            list_scroll: 0,
        }
    }

    /// Feeds one command through the session.
    ///
    /// Expanding a directory that was never listed lists it first; everything
    /// else goes straight to the navigator.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        if command == Command::Expand {
            self.load_selected_if_unexplored()?;
        }

        if let Some(code) = self.navigator.update(&mut self.tree, command)? {
            info!(?code, "session finished");
            self.exit = Some(code);
            return Ok(());
        }

        if command == Command::ToggleSelect {
            let node = self.navigator.selected_node(&self.tree)?;
            let verb = if node.is_package { "marked" } else { "unmarked" };
            let line = format!("{verb} package: {}", node.full_path.display());
            debug!(
                path = %node.full_path.display(),
                is_package = node.is_package,
                "toggled package"
            );
            self.log(line);
        }
        Ok(())
    }

    pub fn should_quit(&self) -> bool {
        self.exit.is_some()
    }

    /// Consumes the session. Anything but an explicit save discards.
    pub fn finish(self) -> SessionOutcome {
        match self.exit {
            Some(ExitCode::QuitSave) => SessionOutcome::Saved(collect_selected(&self.tree)),
            Some(ExitCode::QuitNoSave) | None => SessionOutcome::Discarded,
        }
    }

    pub fn visible_rows(&self) -> Vec<&FileNode> {
        self.tree.visible().collect()
    }

    pub fn is_selected(&self, node: &FileNode) -> bool {
        node.full_path == self.navigator.selected()
    }

    pub fn marked_count(&self) -> usize {
        self.tree.iter().filter(|node| node.is_package).count()
    }

    pub fn set_changed(&mut self, changed: BTreeSet<PathBuf>) {
        self.log(format!("changed files: {}", changed.len()));
        self.changed = changed;
    }

    /// Whether any changed path lies at or under `path`.
    pub fn contains_changes(&self, path: &Path) -> bool {
        self.changed
            .range::<Path, _>((Bound::Included(path), Bound::Unbounded))
            .next()
            .is_some_and(|changed| changed.starts_with(path))
    }

    pub fn log(&mut self, line: String) {
        self.logs.push(line);
        if self.logs.len() > MAX_LOG_LINES {
            let to_trim = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(0..to_trim);
        }
    }

    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }

    pub fn list_scroll(&self) -> usize {
        self.list_scroll
    }

    /// Keeps the cursor row inside a viewport of `viewport_rows` lines.
    pub fn sync_list_scroll(&mut self, viewport_rows: usize) {
        let len = self.tree.visible().count();
        let row = self.navigator.cursor_row();
        let rows = viewport_rows.max(1);

        if row < self.list_scroll {
            self.list_scroll = row;
        } else if row >= self.list_scroll + rows {
            self.list_scroll = row + 1 - rows;
        }

        let max_offset = len.saturating_sub(rows);
        if self.list_scroll > max_offset {
            self.list_scroll = max_offset;
        }
    }

    fn load_selected_if_unexplored(&mut self) -> Result<()> {
        let node = self.navigator.selected_node(&self.tree)?;
        if !node.is_dir || node.explored {
            return Ok(());
        }

        let path = node.full_path.clone();
        self.tree.expand_path(&path)?;
        let explored = self.tree.get(&path).is_some_and(|node| node.explored);
        if !explored {
            self.log(format!("cannot read directory: {}", path.display()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SelectedPackage;
    use crate::tree::tests::fixture;
    use pretty_assertions::assert_eq;

    fn app_for(dirs: &[&str], depth: usize) -> (App, tempfile::TempDir) {
        let temp = fixture(dirs);
        let tree = FileTree::build_from_path(temp.path(), depth, "package.yml").expect("build");
        (App::new(tree), temp)
    }

    fn apply_all(app: &mut App, commands: &[Command]) {
        for command in commands {
            app.apply(*command).expect("apply");
        }
    }

    #[test]
    fn expanding_unlisted_directory_loads_its_children() {
        let (mut app, _temp) = app_for(&["a/b/c"], 0);
        apply_all(&mut app, &[Command::Down]);
        assert!(app.tree.get(app.navigator.selected()).expect("a").children.is_empty());

        apply_all(&mut app, &[Command::Expand, Command::Down]);
        let root = app.tree.root_path().to_path_buf();
        assert_eq!(app.navigator.selected(), root.join("a/b"));
        assert!(app.tree.get(&root.join("a/b/c")).is_some());
    }

    #[test]
    fn confirm_returns_marked_packages() {
        let (mut app, _temp) = app_for(&["api", "web"], 1);
        apply_all(
            &mut app,
            &[Command::Down, Command::Down, Command::ToggleSelect],
        );
        assert_eq!(app.marked_count(), 1);
        assert!(app.last_log().is_some_and(|line| line.starts_with("marked package")));

        apply_all(&mut app, &[Command::Confirm]);
        assert!(app.should_quit());
        let web = app.tree.root_path().join("web");
        assert_eq!(
            app.finish(),
            SessionOutcome::Saved(vec![SelectedPackage {
                path: web,
                tags: vec!["web".to_string()],
            }])
        );
    }

    #[test]
    fn cancel_discards_even_with_marked_nodes() {
        let (mut app, _temp) = app_for(&["api"], 1);
        apply_all(
            &mut app,
            &[Command::Down, Command::ToggleSelect, Command::Cancel],
        );
        assert!(app.should_quit());
        assert_eq!(app.finish(), SessionOutcome::Discarded);
    }

    #[test]
    fn session_without_exit_signal_discards() {
        let (app, _temp) = app_for(&["api"], 1);
        assert!(!app.should_quit());
        assert_eq!(app.finish(), SessionOutcome::Discarded);
    }

    #[test]
    fn changed_paths_mark_containing_directories() {
        let (mut app, _temp) = app_for(&["lib/core", "lib/util", "web"], 1);
        let root = app.tree.root_path().to_path_buf();
        app.set_changed(BTreeSet::from([root.join("lib/core/mod.rs")]));

        assert!(app.contains_changes(&root));
        assert!(app.contains_changes(&root.join("lib")));
        assert!(app.contains_changes(&root.join("lib/core")));
        assert!(!app.contains_changes(&root.join("lib/util")));
        assert!(!app.contains_changes(&root.join("web")));
    }

    #[test]
    fn list_scroll_moves_only_at_view_edges() {
        let dirs: Vec<String> = (0..20).map(|i| format!("dir-{i:02}")).collect();
        let refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
        let (mut app, _temp) = app_for(&refs, 1);

        for _ in 0..10 {
            app.apply(Command::Down).expect("down");
        }
        app.sync_list_scroll(5);
        assert_eq!(app.list_scroll(), 6);

        app.apply(Command::Up).expect("up");
        app.sync_list_scroll(5);
        assert_eq!(app.list_scroll(), 6);

        for _ in 0..4 {
            app.apply(Command::Up).expect("up");
        }
        app.sync_list_scroll(5);
        assert_eq!(app.list_scroll(), 5);
    }

    #[test]
    fn log_is_bounded() {
        let (mut app, _temp) = app_for(&[], 1);
        for i in 0..(MAX_LOG_LINES + 10) {
            app.log(format!("line-{i}"));
        }
        assert_eq!(app.logs.len(), MAX_LOG_LINES);
        assert_eq!(app.logs[0], "line-10");
    }
}
