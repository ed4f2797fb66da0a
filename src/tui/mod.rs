//! TUI module
//!
//! Terminal setup and the single-threaded event loop. Each iteration draws a
//! frame, takes at most one input event, drains the message channel, and
//! executes any follow-up commands the handlers produced. All mutation of
//! the model happens here; workers only post messages back.

pub mod app;
mod external;
pub mod navigator;
pub mod theme;
pub mod treeview;
pub mod views;

pub use app::App;
pub use theme::Theme;

use crate::api::ArgoClient;
use crate::config::Config;
use crate::tui::app::{dispatch_command, Command, ExternalRequest};
use crate::watcher::{AppsWatcher, TreeWatchers};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Run the TUI until the user quits.
pub async fn run_tui(
    client: Option<ArgoClient>,
    config: Config,
    theme: Theme,
    theme_name: String,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut apps_watcher = AppsWatcher::new();
    let mut tree_watchers = TreeWatchers::new();

    let core_mode = client.is_none();
    let mut app = App::new(config, theme, theme_name, core_mode);

    if let Some(client) = &client {
        apps_watcher.start(client.clone(), None, tx.clone());
    }

    loop {
        terminal.draw(|f| app.render(f))?;
        app.tick(Instant::now());

        let mut quit = false;

        // Input events (non-blocking poll keeps the loop ticking)
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) == Some(true) {
                        quit = true;
                    }
                }
                Event::Resize(cols, rows) => app.resize(cols, rows),
                _ => {}
            }
        }

        // Watch events and command results
        while let Ok(msg) = rx.try_recv() {
            app.handle_msg(msg);
        }

        // Follow-up commands from handlers
        for cmd in app.take_commands() {
            match cmd {
                Command::RestartAppsWatch { project } => {
                    if let Some(client) = &client {
                        apps_watcher.restart_for_scope(client.clone(), project, tx.clone());
                    }
                }
                Command::CloseTree => {
                    tree_watchers.cancel_all();
                    app.set_tree_session(tree_watchers.session());
                }
                Command::OpenTree { apps } => {
                    if let Some(client) = &client {
                        for item in apps {
                            tree_watchers.start_for(client.clone(), item, tx.clone());
                        }
                        app.set_tree_session(tree_watchers.session());
                    }
                }
                Command::External(req) => {
                    run_with_terminal_released(&mut terminal, &req, &mut app)?;
                }
                other => {
                    if let Some(client) = &client {
                        dispatch_command(client.clone(), other, tx.clone());
                    }
                }
            }
        }

        if quit {
            break;
        }
    }

    tracing::debug!("TUI shutting down");
    apps_watcher.stop();
    tree_watchers.cancel_all();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(message) = app.fatal_error() {
        anyhow::bail!("startup failed: {}", message);
    }
    Ok(())
}

/// Hand the terminal to a foreground process, then re-enter the TUI.
fn run_with_terminal_released(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    req: &ExternalRequest,
    app: &mut App,
) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let result = external::run_external(req);

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    if let Err(e) = result {
        match req {
            ExternalRequest::K9s { .. } => app.report_k9s_error(e.to_string()),
            ExternalRequest::Pager { .. } => app.report_status(format!("Pager failed: {}", e)),
        }
    }
    Ok(())
}
