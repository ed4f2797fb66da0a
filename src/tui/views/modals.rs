//! Modal dialog rendering

use crate::tui::app::rendering::centered_rect;
use crate::tui::app::state::{Mode, RollbackPhase, MULTI_TARGET};
use crate::tui::app::App;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

fn modal_block<'a>(title: &'a str, app: &App) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme().modal_border))
}

fn render_modal(f: &mut Frame, area: Rect, app: &App, title: &str, lines: Vec<Line>) {
    let rect = centered_rect(60, 50, area);
    f.render_widget(Clear, rect);
    let paragraph = Paragraph::new(lines)
        .block(modal_block(title, app))
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(paragraph, rect);
}

fn toggle_line(app: &App, key: char, label: &str, on: bool) -> Line<'static> {
    let theme = app.theme();
    Line::from(vec![
        Span::styled(
            format!("[{}] ", key),
            Style::default().fg(theme.command_prompt),
        ),
        Span::raw(format!("{}: ", label)),
        Span::styled(
            if on { "on" } else { "off" }.to_string(),
            if on {
                Style::default().fg(theme.modal_success)
            } else {
                Style::default().fg(theme.text_dim)
            },
        ),
    ])
}

fn button_line(app: &App, buttons: [&str; 2], selected: usize) -> Line<'static> {
    let theme = app.theme();
    let mut spans = Vec::new();
    for (i, label) in buttons.iter().enumerate() {
        let style = if i == selected {
            Style::default()
                .fg(theme.modal_confirm)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(theme.text_dim)
        };
        spans.push(Span::styled(format!("  {}  ", label), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn error_line(app: &App, error: &Option<String>) -> Vec<Line<'static>> {
    match error {
        Some(e) => vec![
            Line::default(),
            Line::from(Span::styled(e.clone(), app.theme().modal_error_style())),
        ],
        None => Vec::new(),
    }
}

pub fn render_loading(f: &mut Frame, area: Rect, app: &App, message: &str) {
    render_modal(
        f,
        area,
        app,
        "Working",
        vec![Line::default(), Line::from(message.to_string())],
    );
}

pub fn render_confirm_sync(f: &mut Frame, area: Rect, app: &App) {
    let Some(modal) = app.modals.confirm_sync.as_ref() else {
        return;
    };
    let target_desc = if modal.target == MULTI_TARGET {
        format!("{} selected applications", app.selections.selected_apps.len())
    } else {
        modal.target.clone()
    };
    let mut lines = vec![
        Line::default(),
        Line::from(format!("Sync {}?", target_desc)),
        Line::default(),
        toggle_line(app, 'p', "prune", modal.prune),
        toggle_line(app, 'w', "watch", modal.watch),
        Line::default(),
        button_line(app, ["Sync", "Cancel"], modal.selected_button),
    ];
    if modal.loading {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Syncing...".to_string(),
            Style::default().fg(app.theme().status_progressing),
        )));
    }
    lines.extend(error_line(app, &modal.error));
    render_modal(f, area, app, "Confirm Sync", lines);
}

pub fn render_rollback(f: &mut Frame, area: Rect, app: &App) {
    let Some(rb) = app.rollback.as_ref() else {
        return;
    };
    let theme = app.theme();

    if rb.loading {
        render_modal(
            f,
            area,
            app,
            "Rollback",
            vec![
                Line::default(),
                Line::from(format!("Loading history for {}...", rb.app_name)),
            ],
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    match rb.phase {
        RollbackPhase::List => {
            lines.push(Line::from(format!("Deployment history for {}", rb.app_name)));
            lines.push(Line::default());
            if rb.rows.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No deployment history".to_string(),
                    Style::default().fg(theme.text_dim),
                )));
            }
            let offset = app.rollback_nav.scroll_offset();
            let page = app.rollback_page_size();
            for (i, row) in rb.rows.iter().enumerate().skip(offset).take(page) {
                let revision: String = row.revision.chars().take(8).collect();
                let when = row
                    .deployed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let text = format!("#{:<4} {:<10} {:<17} {}", row.id, revision, when, row.source);
                let style = if i == rb.selected_idx {
                    Style::default().bg(theme.table_selected_bg)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(text, style)));
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "enter select  esc cancel".to_string(),
                Style::default().fg(theme.text_dim),
            )));
        }
        RollbackPhase::Confirm => {
            let revision = rb
                .rows
                .get(rb.selected_idx)
                .map(|r| r.revision.chars().take(8).collect::<String>())
                .unwrap_or_default();
            lines.push(Line::default());
            lines.push(Line::from(format!(
                "Roll back {} to revision {}?",
                rb.app_name, revision
            )));
            lines.push(Line::default());
            lines.push(toggle_line(app, 'p', "prune", rb.prune));
            lines.push(toggle_line(app, 'w', "watch", rb.watch));
            lines.push(Line::default());
            lines.push(button_line(app, ["Yes", "Cancel"], rb.confirm_selected));
        }
    }
    lines.extend(error_line(app, &rb.error));
    render_modal(f, area, app, "Rollback", lines);
}

pub fn render_app_delete(f: &mut Frame, area: Rect, app: &App) {
    let Some(modal) = app.modals.app_delete.as_ref() else {
        return;
    };
    let theme = app.theme();
    let target_desc = if modal.target == MULTI_TARGET {
        format!("{} selected applications", app.selections.selected_apps.len())
    } else {
        modal.target.clone()
    };
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "DELETE APPLICATION".to_string(),
            theme.modal_warning_style(),
        )),
        Line::default(),
        Line::from(target_desc),
        Line::default(),
        toggle_line(app, 'c', "cascade", modal.cascade),
        Line::from(vec![
            Span::styled("[p] ", Style::default().fg(theme.command_prompt)),
            Span::raw("propagation: "),
            Span::styled(
                modal.policy.as_str().to_string(),
                Style::default().fg(theme.banner_scope),
            ),
        ]),
        Line::default(),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled(
                "y",
                Style::default()
                    .fg(theme.modal_confirm)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" to confirm, "),
            Span::styled(
                "Esc",
                Style::default()
                    .fg(theme.modal_cancel)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" to cancel"),
        ]),
    ];
    if modal.loading {
        lines.push(Line::from("Deleting..."));
    }
    lines.extend(error_line(app, &modal.error));
    render_modal(f, area, app, "Confirm Delete", lines);
}

pub fn render_resource_delete(f: &mut Frame, area: Rect, app: &App) {
    let Some(modal) = app.modals.resource_delete.as_ref() else {
        return;
    };
    let theme = app.theme();
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Delete {} resource(s)", modal.targets.len()),
            theme.modal_warning_style(),
        )),
        Line::default(),
    ];
    for target in modal.targets.iter().take(8) {
        lines.push(Line::from(format!(
            "{} {}/{}",
            target.kind, target.namespace, target.name
        )));
    }
    if modal.targets.len() > 8 {
        lines.push(Line::from(Span::styled(
            format!("...and {} more", modal.targets.len() - 8),
            Style::default().fg(theme.text_dim),
        )));
    }
    lines.push(Line::default());
    lines.push(toggle_line(app, 'c', "cascade", modal.cascade));
    lines.push(Line::from(vec![
        Span::styled("[p] ", Style::default().fg(theme.command_prompt)),
        Span::raw("propagation: "),
        Span::styled(
            modal.policy.as_str().to_string(),
            Style::default().fg(theme.banner_scope),
        ),
    ]));
    lines.push(toggle_line(app, 'f', "force", modal.force));
    lines.push(Line::default());
    lines.push(Line::from("Press y to confirm, Esc to cancel"));
    if modal.loading {
        lines.push(Line::from("Deleting..."));
    }
    lines.extend(error_line(app, &modal.error));
    render_modal(f, area, app, "Confirm Resource Delete", lines);
}

pub fn render_resource_sync(f: &mut Frame, area: Rect, app: &App) {
    let Some(modal) = app.modals.resource_sync.as_ref() else {
        return;
    };
    let theme = app.theme();
    let mut lines = vec![
        Line::from(format!("Sync {} resource(s)", modal.targets.len())),
        Line::default(),
    ];
    for target in modal.targets.iter().take(8) {
        lines.push(Line::from(format!(
            "{} {}/{}",
            target.kind, target.namespace, target.name
        )));
    }
    if modal.targets.len() > 8 {
        lines.push(Line::from(Span::styled(
            format!("...and {} more", modal.targets.len() - 8),
            Style::default().fg(theme.text_dim),
        )));
    }
    lines.push(Line::default());
    lines.push(toggle_line(app, 'p', "prune", modal.prune));
    lines.push(toggle_line(app, 'f', "force", modal.force));
    lines.push(Line::default());
    lines.push(button_line(app, ["Sync", "Cancel"], modal.selected_button));
    if modal.loading {
        lines.push(Line::from("Syncing..."));
    }
    lines.extend(error_line(app, &modal.error));
    render_modal(f, area, app, "Confirm Resource Sync", lines);
}

pub fn render_no_diff(f: &mut Frame, area: Rect, app: &App) {
    render_modal(
        f,
        area,
        app,
        "Diff",
        vec![
            Line::default(),
            Line::from("No differences found"),
            Line::default(),
            Line::from(Span::styled(
                "press any key".to_string(),
                Style::default().fg(app.theme().text_dim),
            )),
        ],
    );
}

pub fn render_k9s_picker(f: &mut Frame, area: Rect, app: &App) {
    let Some(modal) = app.modals.k9s_pending.as_ref() else {
        return;
    };
    let theme = app.theme();
    let mut lines = vec![
        Line::from(format!(
            "Select context for {} {}/{}",
            modal.kind, modal.namespace, modal.name
        )),
        Line::default(),
    ];
    for (i, ctx) in modal.contexts.iter().enumerate() {
        let style = if i == modal.selected {
            Style::default().bg(theme.table_selected_bg)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(ctx.clone(), style)));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "enter launch  esc cancel".to_string(),
        Style::default().fg(theme.text_dim),
    )));
    render_modal(f, area, app, "Open in k9s", lines);
}

pub fn render_k9s_error(f: &mut Frame, area: Rect, app: &App) {
    let message = app
        .modals
        .k9s_error
        .clone()
        .unwrap_or_else(|| "k9s failed to launch".to_string());
    render_modal(
        f,
        area,
        app,
        "k9s Error",
        vec![
            Line::default(),
            Line::from(Span::styled(message, app.theme().modal_error_style())),
            Line::default(),
            Line::from("Press Enter to dismiss"),
        ],
    );
}

pub fn render_default_view_warning(f: &mut Frame, area: Rect, app: &App) {
    let message = app
        .modals
        .default_view_warning
        .clone()
        .unwrap_or_default();
    render_modal(
        f,
        area,
        app,
        "Configuration Warning",
        vec![
            Line::default(),
            Line::from(Span::styled(message, app.theme().modal_warning_style())),
            Line::default(),
            Line::from("Press Enter to continue"),
        ],
    );
}

pub fn render_error(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let (title, hint) = match app.mode() {
        Mode::ConnectionError => (
            "Connection Error",
            "l view logs  esc retry  q quit",
        ),
        Mode::AuthRequired => (
            "Authentication Required",
            "Run `argocd login` and restart.  l view logs  q quit",
        ),
        _ => {
            if app.apps_loaded {
                ("Error", "l view logs  q dismiss")
            } else {
                ("Error", "l view logs  q quit")
            }
        }
    };
    let message = app.modals.error_message.clone().unwrap_or_default();
    render_modal(
        f,
        area,
        app,
        title,
        vec![
            Line::default(),
            Line::from(Span::styled(message, theme.modal_error_style())),
            Line::default(),
            Line::from(Span::styled(
                hint.to_string(),
                Style::default().fg(theme.text_dim),
            )),
        ],
    );
}

pub fn render_upgrade(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let lines = match app.mode() {
        Mode::UpgradeError => vec![
            Line::default(),
            Line::from(Span::styled(
                app.modals.upgrade_error.clone().unwrap_or_default(),
                theme.modal_error_style(),
            )),
        ],
        Mode::UpgradeSuccess => vec![
            Line::default(),
            Line::from(Span::styled(
                format!("argonaut {} is up to date", env!("CARGO_PKG_VERSION")),
                Style::default().fg(theme.modal_success),
            )),
        ],
        _ => {
            let upgrade = app.modals.upgrade.as_ref();
            vec![
                Line::default(),
                Line::from(format!(
                    "A new version is available: {}",
                    upgrade
                        .and_then(|u| u.latest.clone())
                        .unwrap_or_default()
                )),
                Line::from(format!(
                    "Current version: {}",
                    upgrade
                        .map(|u| u.current.clone())
                        .unwrap_or_default()
                )),
                Line::default(),
                Line::from("Install with: cargo install argonaut"),
            ]
        }
    };
    let mut lines = lines;
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Press Enter to dismiss".to_string(),
        Style::default().fg(theme.text_dim),
    )));
    render_modal(f, area, app, "Upgrade", lines);
}

pub fn render_core_detected(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    render_modal(
        f,
        area,
        app,
        "ArgoCD Core Detected",
        vec![
            Line::default(),
            Line::from(Span::styled(
                "No ArgoCD API server is configured.".to_string(),
                theme.modal_warning_style(),
            )),
            Line::from("argonaut needs the API server to operate applications."),
            Line::default(),
            Line::from("Set ARGOCD_SERVER or run `argocd login`, then restart."),
            Line::default(),
            Line::from(Span::styled(
                "q quit".to_string(),
                Style::default().fg(theme.text_dim),
            )),
        ],
    );
}
