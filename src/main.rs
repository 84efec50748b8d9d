mod app;
mod backend;
mod cli;
mod collector;
mod config;
mod domain;
mod error;
mod handlers;
mod infra;
mod logging;
mod navigator;
mod terminal;
mod tree;
mod ui;

use crate::app::{App, BackendEvent, BackendTask};
use crate::backend::worker_loop;
use crate::cli::{Cli, Settings};
use crate::config::AppConfig;
use crate::domain::SessionOutcome;
use crate::handlers::{handle_backend_event, handle_key_event};
use crate::infra::{ChangeOracle, GitCli};
use crate::terminal::{Tui, restore_terminal, setup_terminal};
use crate::tree::FileTree;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match AppConfig::load_or_default() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load config, using defaults: {err:#}");
            AppConfig::default()
        }
    };
    let settings = cli.settings(&config);

    if let Some(log_path) = cli.log_file.clone().or_else(logging::default_log_path)
        && let Err(err) = logging::init_global(&log_path)
    {
        eprintln!("logging disabled: {err:#}");
    }

    let tree = FileTree::build_from_path(&settings.root, settings.depth, &settings.package_marker)
        .with_context(|| format!("failed to open project root {}", settings.root.display()))?;
    info!(
        root = %tree.root_path().display(),
        depth = settings.depth,
        nodes = tree.len(),
        "session started"
    );

    let mut terminal = setup_terminal()?;
    let run_result = run_app(&mut terminal, App::new(tree), &settings).await;
    restore_terminal(&mut terminal)?;

    match run_result {
        Ok(outcome) => {
            if let Some(text) = render_outcome(&outcome, cli.json)? {
                println!("{text}");
            }
        }
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    mut app: App,
    settings: &Settings,
) -> Result<SessionOutcome> {
    let oracle: Arc<dyn ChangeOracle> = Arc::new(GitCli::default());
    let (task_tx, task_rx) = mpsc::unbounded_channel::<BackendTask>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<BackendEvent>();

    tokio::spawn(worker_loop(oracle, task_rx, event_tx));

    if settings.show_changed {
        app.busy = true;
        task_tx
            .send(BackendTask::LoadChanges {
                root: app.tree.root_path().to_path_buf(),
                head: settings.head.clone(),
                base: settings.base_ref.clone(),
            })
            .map_err(|err| anyhow::anyhow!("failed to dispatch task: {err}"))?;
    }

    while !app.should_quit() {
        while let Ok(event) = event_rx.try_recv() {
            handle_backend_event(&mut app, event);
        }

        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(100)).context("event poll failed")?
            && let Event::Key(key) = event::read().context("event read failed")?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(&mut app, key)?;
        }
    }

    Ok(app.finish())
}

fn render_outcome(outcome: &SessionOutcome, json: bool) -> Result<Option<String>> {
    let SessionOutcome::Saved(packages) = outcome else {
        return Ok(None);
    };

    if json {
        let body =
            serde_json::to_string_pretty(packages).context("failed to serialize selection")?;
        return Ok(Some(body));
    }

    Ok(Some(
        packages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SelectedPackage;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn saved() -> SessionOutcome {
        SessionOutcome::Saved(vec![
            SelectedPackage {
                path: PathBuf::from("/repo/core"),
                tags: vec!["core".to_string()],
            },
            SelectedPackage {
                path: PathBuf::from("/repo/web/api"),
                tags: vec!["web.api".to_string()],
            },
        ])
    }

    #[test]
    fn discarded_session_prints_nothing() {
        assert_eq!(
            render_outcome(&SessionOutcome::Discarded, true).expect("render"),
            None
        );
    }

    #[test]
    fn saved_session_prints_one_line_per_package() {
        let text = render_outcome(&saved(), false).expect("render");
        assert_eq!(
            text.as_deref(),
            Some("/repo/core\tcore\n/repo/web/api\tweb.api")
        );
    }

    #[test]
    fn saved_session_json_lists_paths_and_tags() {
        let text = render_outcome(&saved(), true)
            .expect("render")
            .expect("output");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value[1]["path"], "/repo/web/api");
        assert_eq!(value[1]["tags"][0], "web.api");
    }
}
