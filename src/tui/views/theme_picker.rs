//! Theme picker modal

use crate::tui::app::rendering::centered_rect;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

pub fn render_theme_picker(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let rect = centered_rect(40, 50, area);
    f.render_widget(Clear, rect);

    let cursor = app.theme_nav.cursor();
    let mut lines: Vec<Line> = vec![Line::default()];
    for (i, name) in Theme::available().iter().enumerate() {
        let style = if i == cursor {
            Style::default().bg(theme.table_selected_bg)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("  {}  ", name), style)));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel".to_string(),
        Style::default().fg(theme.text_dim),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Theme ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_border)),
    );
    f.render_widget(paragraph, rect);
}
