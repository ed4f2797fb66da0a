//! Full-screen diff view

use crate::services::diff::DiffLineKind;
use crate::tui::app::App;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render_diff(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let Some(diff) = app.diff.as_ref() else {
        return;
    };

    let viewport = area.height.saturating_sub(2) as usize;
    let offset = app.diff_scroll.min(diff.lines.len().saturating_sub(1));

    let lines: Vec<Line> = diff
        .lines
        .iter()
        .skip(offset)
        .take(viewport.max(1))
        .map(|l| {
            let style = match l.kind {
                DiffLineKind::Header => Style::default()
                    .fg(theme.banner_title)
                    .add_modifier(Modifier::BOLD),
                DiffLineKind::Added => Style::default().fg(theme.status_healthy),
                DiffLineKind::Removed => Style::default().fg(theme.status_degraded),
                DiffLineKind::Context => Style::default().fg(theme.text_primary),
            };
            Line::from(Span::styled(l.text.clone(), style))
        })
        .collect();

    let title = format!(" {} (q to close) ", diff.title);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_border)),
    );
    f.render_widget(paragraph, area);
}
