//! Layout math and render entry point
//!
//! Semantic layout: banner on top, the active panel in the middle, an input
//! line while an editor is open, a status line at the bottom, and modal
//! overlays centered above everything.

use super::core::App;
use super::state::{Mode, View};
use crate::tui::views;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

const BORDER_LINES: usize = 2;
const BANNER_LINES: usize = 3;
const STATUS_LINES: usize = 1;

impl App {
    /// Rows available to the list panel body.
    pub(crate) fn list_viewport_height(&self) -> usize {
        let overhead = BORDER_LINES + BANNER_LINES + self.input_lines() + STATUS_LINES + 1;
        (self.term_rows as usize).saturating_sub(overhead).max(1)
    }

    /// Rows available to the tree panel body.
    pub(crate) fn tree_viewport_height(&self) -> usize {
        let overhead = BORDER_LINES + BANNER_LINES + self.input_lines() + STATUS_LINES;
        (self.term_rows as usize).saturating_sub(overhead).max(1)
    }

    pub(crate) fn theme_page_size(&self) -> usize {
        (self.term_rows as usize).saturating_sub(8).max(1)
    }

    pub(crate) fn rollback_page_size(&self) -> usize {
        // Modal takes roughly 60% of the terminal height
        let modal_height = self.term_rows as usize * 60 / 100;
        modal_height.saturating_sub(6).max(1)
    }

    pub(crate) fn diff_page_size(&self) -> usize {
        (self.term_rows as usize).saturating_sub(6).max(1)
    }

    fn input_lines(&self) -> usize {
        match self.mode {
            Mode::Search | Mode::Command => 1,
            _ => 0,
        }
    }

    /// Render one frame.
    pub fn render(&mut self, f: &mut Frame) {
        let area = f.area();
        self.term_cols = area.width;
        self.term_rows = area.height;

        // Diff mode takes the whole screen
        if self.mode == Mode::Diff {
            views::diff::render_diff(f, area, self);
            return;
        }

        let mut constraints = vec![
            Constraint::Length(BANNER_LINES as u16),
            Constraint::Min(1),
        ];
        if self.input_lines() > 0 {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Length(STATUS_LINES as u16));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        views::banner::render_banner(f, chunks[0], self);

        let body = chunks[1];
        match self.nav.view {
            View::Tree => {
                // With a resource confirmation open, only the affected
                // selections keep their highlight
                let desaturate = matches!(
                    self.mode,
                    Mode::ConfirmResourceDelete | Mode::ConfirmResourceSync
                );
                self.tree.set_desaturate(desaturate);
                views::tree::render_tree(f, body, self)
            }
            _ => views::list::render_list(f, body, self),
        }

        let mut next = 2;
        if self.input_lines() > 0 {
            views::banner::render_input_line(f, chunks[next], self);
            next += 1;
        }
        views::banner::render_status_line(f, chunks[next], self);

        // Modal overlays
        match self.mode {
            Mode::Help => views::help::render_help(f, area, self),
            Mode::Theme => views::theme_picker::render_theme_picker(f, area, self),
            Mode::ConfirmSync => views::modals::render_confirm_sync(f, area, self),
            Mode::Rollback => views::modals::render_rollback(f, area, self),
            Mode::ConfirmAppDelete => views::modals::render_app_delete(f, area, self),
            Mode::ConfirmResourceDelete => views::modals::render_resource_delete(f, area, self),
            Mode::ConfirmResourceSync => views::modals::render_resource_sync(f, area, self),
            Mode::NoDiff => views::modals::render_no_diff(f, area, self),
            Mode::K9sContextSelect => views::modals::render_k9s_picker(f, area, self),
            Mode::K9sError => views::modals::render_k9s_error(f, area, self),
            Mode::DefaultViewWarning => views::modals::render_default_view_warning(f, area, self),
            Mode::Error | Mode::ConnectionError | Mode::AuthRequired => {
                views::modals::render_error(f, area, self)
            }
            Mode::Upgrade | Mode::UpgradeError | Mode::UpgradeSuccess => {
                views::modals::render_upgrade(f, area, self)
            }
            Mode::CoreDetected => views::modals::render_core_detected(f, area, self),
            _ => {}
        }

        // Diff loading spinner overlays Normal mode while the diff computes
        if self.diff.as_ref().is_some_and(|d| d.loading) {
            views::modals::render_loading(f, area, self, "Computing diff...");
        }
    }
}

/// Centered rect helper shared by the modal renderers.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
