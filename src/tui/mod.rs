mod app;
mod board;
mod event;

use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self as ct_event, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use crate::board::BoardState;
use crate::store::JsonFileStore;
use crate::watch;
use app::App;
use event::KeyAction;

/// Run the interactive board until the user quits. With a store, every
/// change is written through and external rewrites of the file are
/// picked up.
pub fn run(board: BoardState, store: Option<JsonFileStore>, poll_interval: u64) -> Result<()> {
    let watcher = match store.as_ref().and_then(|s| s.path()) {
        Some(path) => Some(watch::watch_store(path)?),
        None => None,
    };
    let mut app = App::new(board, store);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let rx = watcher.as_ref().map(|(_, rx)| rx);
    let result = run_loop(&mut terminal, &mut app, rx, poll_interval);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: Option<&Receiver<()>>,
    poll_interval: u64,
) -> Result<()> {
    let poll_duration = Duration::from_millis(poll_interval);

    loop {
        terminal.draw(|frame| board::render(frame, app))?;

        if ct_event::poll(poll_duration)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    match event::handle_key(app, key) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Refresh => app.refresh(),
                        KeyAction::Continue => {}
                    }
                }
            }
        }

        // Check for file changes (non-blocking)
        if let Some(rx) = rx {
            if watch::wait_for_change(rx, Duration::ZERO) {
                watch::drain_events(rx);
                log::debug!("store changed on disk, reloading");
                app.refresh();
            }
        }
    }
}
