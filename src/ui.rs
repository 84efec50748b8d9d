use crate::app::App;
use crate::domain::{FileNode, KEY_BINDING_LEGEND};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_tree(frame, app, outer[0]);
    draw_status_bar(frame, app, outer[1]);
    draw_footer(frame, outer[2]);
}

fn draw_tree(frame: &mut Frame, app: &mut App, area: Rect) {
    let viewport_rows = area.height.saturating_sub(2) as usize;
    app.sync_list_scroll(viewport_rows);

    let items: Vec<ListItem> = app
        .visible_rows()
        .into_iter()
        .map(|node| ListItem::new(node_line(app, node)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Packages ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    let mut state = ListState::default()
        .with_offset(app.list_scroll())
        .with_selected(Some(app.navigator.cursor_row()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn node_line(app: &App, node: &FileNode) -> Line<'static> {
    let selected = app.is_selected(node);
    let mut spans = Vec::new();

    spans.push(Span::raw("  ".repeat(node.depth)));
    if selected {
        spans.push(Span::styled(
            "-> ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    let name = node.name();
    if node.is_package {
        spans.push(Span::styled(
            format!("[Package] {name}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    } else if selected {
        spans.push(Span::styled(
            name,
            Style::default().add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw(name));
    }

    if let Some(marker) = expansion_marker(node) {
        spans.push(Span::styled(marker, Style::default().fg(Color::Cyan)));
    }
    if app.contains_changes(&node.full_path) {
        spans.push(Span::styled(" *", Style::default().fg(Color::LightRed)));
    }

    Line::from(spans)
}

fn expansion_marker(node: &FileNode) -> Option<&'static str> {
    if !node.is_empty() && node.expanded {
        Some(" ∨")
    } else if !node.is_empty() || (node.is_dir && !node.explored) {
        Some(" >")
    } else {
        None
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let busy = if app.busy { "LOADING" } else { "READY" };
    let text = Line::from(vec![
        Span::styled(
            format!(" {busy} "),
            if app.busy {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            },
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} marked", app.marked_count()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            app.last_log().unwrap_or_default().to_string(),
            Style::default().fg(Color::Gray),
        ),
    ]);

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Left), area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let spans: Vec<Span> = KEY_BINDING_LEGEND
        .iter()
        .flat_map(|(binding, description)| {
            [
                Span::styled(
                    *binding,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(": {description}  ")),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Command;
    use crate::tree::FileTree;
    use crate::tree::tests::fixture;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).expect("terminal");
        terminal.draw(|frame| draw(frame, app)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn selected_package_is_highlighted_with_marker() {
        let temp = fixture(&["core/api", "web"]);
        let tree = FileTree::build_from_path(temp.path(), 0, "package.yml").expect("build");
        let mut app = App::new(tree);
        app.apply(Command::Down).expect("down");
        app.apply(Command::ToggleSelect).expect("toggle");

        let screen = render(&mut app);
        assert!(screen.contains("-> [Package] core >"));
        assert!(screen.contains("web"));
        assert!(screen.contains("Ctrl + s"));
        assert!(screen.contains("1 marked"));
    }

    #[test]
    fn unexplored_directory_shows_collapsed_marker_only_when_listable() {
        let mut node = FileNode::new("/repo/a".into(), true, false);
        assert_eq!(expansion_marker(&node), Some(" >"));

        node.explored = true;
        assert_eq!(expansion_marker(&node), None);

        node.children.push("/repo/a/b".into());
        assert_eq!(expansion_marker(&node), Some(" >"));
        node.expanded = true;
        assert_eq!(expansion_marker(&node), Some(" ∨"));
    }
}
