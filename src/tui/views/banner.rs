//! Banner, input line, and status line

use crate::tui::app::state::{Mode, View};
use crate::tui::app::App;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Top banner: view title, scope summary, filter and selection counts.
pub fn render_banner(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();

    let mut title_spans = vec![
        Span::styled("argonaut", Style::default().fg(theme.banner_title)),
        Span::raw("  "),
        Span::styled(
            app.current_view().title(),
            theme.banner_label_style(),
        ),
    ];
    if app.current_view() == View::Apps && !app.selections.selected_apps.is_empty() {
        title_spans.push(Span::styled(
            format!("  [{} checked]", app.selections.selected_apps.len()),
            Style::default().fg(theme.table_checked),
        ));
    }
    if app.current_view() == View::Tree {
        if let Some(name) = &app.ui.tree_app_name {
            title_spans.push(Span::styled(
                format!("  {}", name),
                Style::default().fg(theme.banner_value),
            ));
        }
        if !app.tree.filter().is_empty() {
            title_spans.push(Span::styled(
                format!(
                    "  /{} ({}/{})",
                    app.tree.filter(),
                    app.tree.current_match_number(),
                    app.tree.match_count()
                ),
                Style::default().fg(theme.search_prompt),
            ));
        }
    }

    let mut scope_spans: Vec<Span> = Vec::new();
    for (label, set) in [
        ("clusters", &app.selections.scope_clusters),
        ("namespaces", &app.selections.scope_namespaces),
        ("projects", &app.selections.scope_projects),
        ("appsets", &app.selections.scope_app_sets),
    ] {
        if !set.is_empty() {
            let mut names: Vec<&str> = set.iter().map(String::as_str).collect();
            names.sort();
            scope_spans.push(Span::styled(
                format!("{}: ", label),
                Style::default().fg(theme.text_dim),
            ));
            scope_spans.push(Span::styled(
                names.join(","),
                Style::default().fg(theme.banner_scope),
            ));
            scope_spans.push(Span::raw("  "));
        }
    }
    if !app.ui.active_filter.is_empty() {
        scope_spans.push(Span::styled(
            format!("filter: {}", app.ui.active_filter),
            Style::default().fg(theme.search_prompt),
        ));
    }
    if scope_spans.is_empty() {
        scope_spans.push(Span::styled(
            "all scopes",
            Style::default().fg(theme.text_dim),
        ));
    }

    let lines = vec![
        Line::from(title_spans),
        Line::from(scope_spans),
        Line::default(),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Search or command editor line.
pub fn render_input_line(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let line = match app.mode() {
        Mode::Search => Line::from(vec![
            Span::styled("/", Style::default().fg(theme.search_prompt)),
            Span::styled(
                app.ui.search_query.clone(),
                Style::default().fg(theme.banner_value),
            ),
            Span::styled("█", Style::default().fg(theme.search_prompt)),
        ]),
        Mode::Command => Line::from(vec![
            Span::styled(":", Style::default().fg(theme.command_prompt)),
            Span::styled(
                app.ui.command.clone(),
                Style::default().fg(theme.banner_value),
            ),
            Span::styled("█", Style::default().fg(theme.command_prompt)),
        ]),
        _ => Line::default(),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Bottom status line: transient message or key hints.
pub fn render_status_line(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let line = match app.status() {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.banner_scope),
        )),
        None => {
            let hints = match app.current_view() {
                View::Tree => "space select  s sync  ctrl+d delete  d diff  / search  ? help",
                View::Apps => {
                    "enter resources  space check  s sync  R rollback  d diff  / search  ? help"
                }
                _ => "enter drill down  esc up  / search  : command  ? help",
            };
            Line::from(Span::styled(hints, Style::default().fg(theme.text_dim)))
        }
    };
    f.render_widget(Paragraph::new(line), area);
}
