//! Help overlay

use crate::tui::app::rendering::centered_rect;
use crate::tui::app::App;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const BINDINGS: &[(&str, &str)] = &[
    ("enter", "drill down / open resources"),
    ("esc", "back up one level / close modal"),
    ("j k / arrows", "move cursor"),
    ("g G", "jump to top / bottom"),
    ("space", "check app or resource for batch ops"),
    ("/", "search current view"),
    (":", "command line"),
    ("s", "sync (app or resource)"),
    ("R", "rollback"),
    ("d", "diff"),
    ("r", "open resource tree"),
    ("ctrl+d", "delete (app or resource)"),
    ("K", "open in k9s"),
    ("h l", "collapse / expand tree node"),
    ("H L", "collapse / expand all"),
    ("n N", "next / previous search match"),
    ("ZZ ZQ", "quit"),
    ("ctrl+c", "quit"),
];

const COMMANDS: &[&str] = &[
    ":clusters :namespaces :projects :apps :appsets",
    ":sync [app]  :diff [app]  :rollback [app]  :delete [app]",
    ":refresh [app]  :refresh! [app]  :resources [app]",
    ":sort health|sync asc|desc  :theme  :logs  :up  :all  :q",
];

pub fn render_help(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let rect = centered_rect(70, 80, area);
    f.render_widget(Clear, rect);

    let mut lines: Vec<Line> = vec![Line::default()];
    for (key, desc) in BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<14}", key),
                Style::default().fg(theme.command_prompt),
            ),
            Span::raw(desc.to_string()),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "  Commands".to_string(),
        theme.table_header_style(),
    )));
    for cmd in COMMANDS {
        lines.push(Line::from(Span::styled(
            format!("  {}", cmd),
            Style::default().fg(theme.text_dim),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_border)),
    );
    f.render_widget(paragraph, rect);
}
