use crate::app::{App, BackendEvent};
use crate::domain::Command;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

pub(crate) fn handle_backend_event(app: &mut App, event: BackendEvent) {
    app.busy = false;
    match event {
        BackendEvent::ChangesLoaded { changed } => app.set_changed(changed),
        BackendEvent::Error { context, message } => {
            warn!(%context, %message, "backend task failed");
            app.log(format!("error[{context}]: {message}"));
        }
    }
}

pub(crate) fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if let Some(command) = command_for_key(key) {
        app.apply(command)?;
    }
    Ok(())
}

pub(crate) fn command_for_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers == KeyModifiers::CONTROL {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Cancel),
            KeyCode::Char('s') => Some(Command::Confirm),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Cancel),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::ToggleSelect),
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Down),
        KeyCode::Right | KeyCode::Char('l') => Some(Command::Expand),
        KeyCode::Left | KeyCode::Char('h') => Some(Command::Collapse),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileTree;
    use crate::tree::tests::fixture;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn control_keys_end_the_session() {
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(Command::Confirm)
        );
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Cancel)
        );
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn arrows_and_vim_keys_navigate() {
        assert_eq!(command_for_key(key(KeyCode::Up)), Some(Command::Up));
        assert_eq!(command_for_key(key(KeyCode::Char('j'))), Some(Command::Down));
        assert_eq!(command_for_key(key(KeyCode::Right)), Some(Command::Expand));
        assert_eq!(command_for_key(key(KeyCode::Char('h'))), Some(Command::Collapse));
        assert_eq!(command_for_key(key(KeyCode::Enter)), Some(Command::ToggleSelect));
        assert_eq!(command_for_key(key(KeyCode::Tab)), None);
    }

    #[test]
    fn key_events_drive_the_session() {
        let temp = fixture(&["api"]);
        let tree = FileTree::build_from_path(temp.path(), 1, "package.yml").expect("build");
        let mut app = App::new(tree);

        for code in [KeyCode::Down, KeyCode::Enter] {
            handle_key_event(&mut app, key(code)).expect("key");
        }
        assert_eq!(app.marked_count(), 1);

        handle_key_event(&mut app, key(KeyCode::Esc)).expect("esc");
        assert!(app.should_quit());
    }

    #[test]
    fn backend_events_update_changes_and_log_errors() {
        let temp = fixture(&[]);
        let tree = FileTree::build_from_path(temp.path(), 1, "package.yml").expect("build");
        let mut app = App::new(tree);
        app.busy = true;

        handle_backend_event(
            &mut app,
            BackendEvent::ChangesLoaded {
                changed: BTreeSet::from([PathBuf::from("/repo/a.rs")]),
            },
        );
        assert!(!app.busy);
        assert_eq!(app.changed.len(), 1);

        handle_backend_event(
            &mut app,
            BackendEvent::Error {
                context: "changes".to_string(),
                message: "boom".to_string(),
            },
        );
        assert_eq!(app.last_log(), Some("error[changes]: boom"));
    }
}
