//! Tree panel rendering

use crate::tui::app::App;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render_tree(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme().clone();
    let inner_width = area.width.saturating_sub(2) as usize;
    let viewport = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = if app.tree_loading && app.tree.visible_count() == 0 {
        vec![Line::from("Loading resources...")]
    } else {
        app.tree.render_lines(&theme, inner_width)
    };

    // Keep the cursor's rendered line inside the viewport
    let selected_line = app.tree.selected_line_index();
    let total = lines.len();
    let mut offset = app.tree_scroll;
    if selected_line < offset {
        offset = selected_line;
    } else if viewport > 0 && selected_line >= offset + viewport {
        offset = selected_line + 1 - viewport;
    }
    if total > 0 {
        offset = offset.min(total.saturating_sub(1));
    }
    app.tree_scroll = offset;

    let visible: Vec<Line> = lines.into_iter().skip(offset).take(viewport.max(1)).collect();

    let title = format!(
        " Resources ({} selected) ",
        app.tree.selection_count()
    );
    let paragraph = Paragraph::new(visible).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_border))
            .title(title),
    );
    f.render_widget(paragraph, area);
}
