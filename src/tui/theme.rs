//! Theme and styling definitions
//!
//! Centralized color and style definitions. Themes are selected by name in
//! the theme picker; only the name is persisted to the config file.

use anyhow::Result;
use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    // Banner colors
    pub banner_label: Color,
    pub banner_value: Color,
    pub banner_scope: Color,
    pub banner_title: Color,

    // Status colors (sync + health states share the palette)
    pub status_healthy: Color,
    pub status_progressing: Color,
    pub status_degraded: Color,
    pub status_unknown: Color,

    // Table colors
    pub table_header: Color,
    pub table_selected_bg: Color,
    pub table_checked: Color,

    // Text colors
    pub text_primary: Color,
    pub text_dim: Color,

    // Tree highlights
    pub tree_selected_bg: Color,
    pub tree_cursor_selected_bg: Color,
    pub tree_match_bg: Color,
    pub tree_match_current_bg: Color,
    pub tree_flash_bg: Color,

    // Input colors
    pub command_prompt: Color,
    pub search_prompt: Color,

    // Modal colors
    pub modal_border: Color,
    pub modal_warning: Color,
    pub modal_error: Color,
    pub modal_success: Color,
    pub modal_confirm: Color,
    pub modal_cancel: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            banner_label: Color::Cyan,
            banner_value: Color::White,
            banner_scope: Color::Yellow,
            banner_title: Color::Cyan,

            status_healthy: Color::Green,
            status_progressing: Color::Yellow,
            status_degraded: Color::Red,
            status_unknown: Color::Gray,

            table_header: Color::Cyan,
            table_selected_bg: Color::DarkGray,
            table_checked: Color::Magenta,

            text_primary: Color::White,
            text_dim: Color::Gray,

            tree_selected_bg: Color::Blue,
            tree_cursor_selected_bg: Color::Magenta,
            tree_match_bg: Color::Yellow,
            tree_match_current_bg: Color::LightYellow,
            tree_flash_bg: Color::Green,

            command_prompt: Color::Yellow,
            search_prompt: Color::Yellow,

            modal_border: Color::Cyan,
            modal_warning: Color::Yellow,
            modal_error: Color::Red,
            modal_success: Color::Green,
            modal_confirm: Color::Green,
            modal_cancel: Color::Red,
        }
    }
}

impl Theme {
    /// Names of the built-in themes, in picker order.
    pub fn available() -> &'static [&'static str] {
        &["default", "dracula", "nord", "gruvbox", "solarized-dark"]
    }

    /// Load a built-in theme by name.
    pub fn named(name: &str) -> Result<Theme> {
        match name {
            "default" => Ok(Theme::default()),
            "dracula" => Ok(Theme::dracula()),
            "nord" => Ok(Theme::nord()),
            "gruvbox" => Ok(Theme::gruvbox()),
            "solarized-dark" => Ok(Theme::solarized_dark()),
            other => Err(anyhow::anyhow!("unknown theme: {}", other)),
        }
    }

    fn dracula() -> Theme {
        Theme {
            banner_label: Color::Rgb(139, 233, 253),
            banner_value: Color::Rgb(248, 248, 242),
            banner_scope: Color::Rgb(241, 250, 140),
            banner_title: Color::Rgb(189, 147, 249),
            status_healthy: Color::Rgb(80, 250, 123),
            status_progressing: Color::Rgb(241, 250, 140),
            status_degraded: Color::Rgb(255, 85, 85),
            status_unknown: Color::Rgb(98, 114, 164),
            table_header: Color::Rgb(189, 147, 249),
            table_selected_bg: Color::Rgb(68, 71, 90),
            table_checked: Color::Rgb(255, 121, 198),
            text_primary: Color::Rgb(248, 248, 242),
            text_dim: Color::Rgb(98, 114, 164),
            tree_selected_bg: Color::Rgb(68, 71, 90),
            tree_cursor_selected_bg: Color::Rgb(189, 147, 249),
            tree_match_bg: Color::Rgb(241, 250, 140),
            tree_match_current_bg: Color::Rgb(255, 184, 108),
            tree_flash_bg: Color::Rgb(80, 250, 123),
            command_prompt: Color::Rgb(241, 250, 140),
            search_prompt: Color::Rgb(241, 250, 140),
            modal_border: Color::Rgb(189, 147, 249),
            modal_warning: Color::Rgb(255, 184, 108),
            modal_error: Color::Rgb(255, 85, 85),
            modal_success: Color::Rgb(80, 250, 123),
            modal_confirm: Color::Rgb(80, 250, 123),
            modal_cancel: Color::Rgb(255, 85, 85),
        }
    }

    fn nord() -> Theme {
        Theme {
            banner_label: Color::Rgb(136, 192, 208),
            banner_value: Color::Rgb(236, 239, 244),
            banner_scope: Color::Rgb(235, 203, 139),
            banner_title: Color::Rgb(129, 161, 193),
            status_healthy: Color::Rgb(163, 190, 140),
            status_progressing: Color::Rgb(235, 203, 139),
            status_degraded: Color::Rgb(191, 97, 106),
            status_unknown: Color::Rgb(76, 86, 106),
            table_header: Color::Rgb(129, 161, 193),
            table_selected_bg: Color::Rgb(59, 66, 82),
            table_checked: Color::Rgb(180, 142, 173),
            text_primary: Color::Rgb(216, 222, 233),
            text_dim: Color::Rgb(76, 86, 106),
            tree_selected_bg: Color::Rgb(67, 76, 94),
            tree_cursor_selected_bg: Color::Rgb(129, 161, 193),
            tree_match_bg: Color::Rgb(235, 203, 139),
            tree_match_current_bg: Color::Rgb(208, 135, 112),
            tree_flash_bg: Color::Rgb(163, 190, 140),
            command_prompt: Color::Rgb(235, 203, 139),
            search_prompt: Color::Rgb(235, 203, 139),
            modal_border: Color::Rgb(129, 161, 193),
            modal_warning: Color::Rgb(235, 203, 139),
            modal_error: Color::Rgb(191, 97, 106),
            modal_success: Color::Rgb(163, 190, 140),
            modal_confirm: Color::Rgb(163, 190, 140),
            modal_cancel: Color::Rgb(191, 97, 106),
        }
    }

    fn gruvbox() -> Theme {
        Theme {
            banner_label: Color::Rgb(131, 165, 152),
            banner_value: Color::Rgb(235, 219, 178),
            banner_scope: Color::Rgb(250, 189, 47),
            banner_title: Color::Rgb(211, 134, 155),
            status_healthy: Color::Rgb(184, 187, 38),
            status_progressing: Color::Rgb(250, 189, 47),
            status_degraded: Color::Rgb(251, 73, 52),
            status_unknown: Color::Rgb(146, 131, 116),
            table_header: Color::Rgb(131, 165, 152),
            table_selected_bg: Color::Rgb(60, 56, 54),
            table_checked: Color::Rgb(211, 134, 155),
            text_primary: Color::Rgb(235, 219, 178),
            text_dim: Color::Rgb(146, 131, 116),
            tree_selected_bg: Color::Rgb(80, 73, 69),
            tree_cursor_selected_bg: Color::Rgb(177, 98, 134),
            tree_match_bg: Color::Rgb(250, 189, 47),
            tree_match_current_bg: Color::Rgb(254, 128, 25),
            tree_flash_bg: Color::Rgb(184, 187, 38),
            command_prompt: Color::Rgb(250, 189, 47),
            search_prompt: Color::Rgb(250, 189, 47),
            modal_border: Color::Rgb(131, 165, 152),
            modal_warning: Color::Rgb(250, 189, 47),
            modal_error: Color::Rgb(251, 73, 52),
            modal_success: Color::Rgb(184, 187, 38),
            modal_confirm: Color::Rgb(184, 187, 38),
            modal_cancel: Color::Rgb(251, 73, 52),
        }
    }

    fn solarized_dark() -> Theme {
        Theme {
            banner_label: Color::Rgb(42, 161, 152),
            banner_value: Color::Rgb(238, 232, 213),
            banner_scope: Color::Rgb(181, 137, 0),
            banner_title: Color::Rgb(38, 139, 210),
            status_healthy: Color::Rgb(133, 153, 0),
            status_progressing: Color::Rgb(181, 137, 0),
            status_degraded: Color::Rgb(220, 50, 47),
            status_unknown: Color::Rgb(88, 110, 117),
            table_header: Color::Rgb(38, 139, 210),
            table_selected_bg: Color::Rgb(7, 54, 66),
            table_checked: Color::Rgb(211, 54, 130),
            text_primary: Color::Rgb(147, 161, 161),
            text_dim: Color::Rgb(88, 110, 117),
            tree_selected_bg: Color::Rgb(7, 54, 66),
            tree_cursor_selected_bg: Color::Rgb(108, 113, 196),
            tree_match_bg: Color::Rgb(181, 137, 0),
            tree_match_current_bg: Color::Rgb(203, 75, 22),
            tree_flash_bg: Color::Rgb(133, 153, 0),
            command_prompt: Color::Rgb(181, 137, 0),
            search_prompt: Color::Rgb(181, 137, 0),
            modal_border: Color::Rgb(38, 139, 210),
            modal_warning: Color::Rgb(181, 137, 0),
            modal_error: Color::Rgb(220, 50, 47),
            modal_success: Color::Rgb(133, 153, 0),
            modal_confirm: Color::Rgb(133, 153, 0),
            modal_cancel: Color::Rgb(220, 50, 47),
        }
    }

    /// Foreground style for a sync or health status string.
    pub fn status_style(&self, status: &str) -> Style {
        let color = match status.to_lowercase().as_str() {
            "healthy" | "synced" | "running" => self.status_healthy,
            "progressing" | "pending" | "outofsync" | "suspended" => self.status_progressing,
            "degraded" | "error" | "failed" => self.status_degraded,
            _ => self.status_unknown,
        };
        Style::default().fg(color)
    }

    pub fn banner_label_style(&self) -> Style {
        Style::default()
            .fg(self.banner_label)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_header_style(&self) -> Style {
        Style::default()
            .fg(self.table_header)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_selected_style(&self) -> Style {
        Style::default().bg(self.table_selected_bg)
    }

    pub fn modal_warning_style(&self) -> Style {
        Style::default()
            .fg(self.modal_warning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn modal_error_style(&self) -> Style {
        Style::default()
            .fg(self.modal_error)
            .add_modifier(Modifier::BOLD)
    }
}
