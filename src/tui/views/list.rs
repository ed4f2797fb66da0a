//! List view rendering
//!
//! Scalar lists (clusters, namespaces, projects, appsets) render as plain
//! rows; the Apps view renders a table with sync/health columns and check
//! marks for the multi-select set.

use crate::tui::app::{App, ListEntry};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

pub fn render_list(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme().clone();
    let items = app.visible_items();
    let viewport = app.list_viewport_height();
    app.list_nav.set_item_count(items.len());
    app.list_nav.set_viewport_height(viewport);
    app.list_nav.set_cursor(app.selected_idx());
    let offset = app.list_nav.scroll_offset();

    let is_apps = items.iter().any(|i| matches!(i, ListEntry::App(_)));

    let header = if is_apps {
        Row::new(vec![
            Cell::from(""),
            Cell::from("NAME"),
            Cell::from("SYNC"),
            Cell::from("HEALTH"),
            Cell::from("PROJECT"),
            Cell::from("CLUSTER"),
            Cell::from("NAMESPACE"),
        ])
        .style(theme.table_header_style())
    } else {
        Row::new(vec![Cell::from("NAME")]).style(theme.table_header_style())
    };

    let rows: Vec<Row> = items
        .iter()
        .enumerate()
        .skip(offset)
        .take(viewport)
        .map(|(i, entry)| {
            let row = match entry {
                ListEntry::Name(name) => Row::new(vec![Cell::from(name.clone())]),
                ListEntry::App(a) => {
                    let checked = app.selections.selected_apps.contains(&a.name);
                    let mark = if checked { "●" } else { " " };
                    Row::new(vec![
                        Cell::from(Span::styled(
                            mark,
                            Style::default().fg(theme.table_checked),
                        )),
                        Cell::from(a.name.clone()),
                        Cell::from(Span::styled(
                            a.sync_status.clone(),
                            theme.status_style(&a.sync_status),
                        )),
                        Cell::from(Span::styled(
                            a.health_status.clone(),
                            theme.status_style(&a.health_status),
                        )),
                        Cell::from(a.project.clone()),
                        Cell::from(a.cluster_label.clone()),
                        Cell::from(a.namespace.clone()),
                    ])
                }
            };
            if i == app.selected_idx() {
                row.style(theme.table_selected_style())
            } else {
                row
            }
        })
        .collect();

    let widths: Vec<Constraint> = if is_apps {
        vec![
            Constraint::Length(1),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Min(14),
            Constraint::Min(12),
        ]
    } else {
        vec![Constraint::Min(20)]
    };

    let title = format!(
        " {} ({}) ",
        app.current_view().title(),
        items.len()
    );
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_border))
            .title(title),
    );
    f.render_widget(table, area);
}
