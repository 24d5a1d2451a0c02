//! `lingo` - TUI chat client for an AI study backend.
//!
//! Entry point for the application.

use std::time::Duration;

use clap::Parser;
use ratatui::crossterm::event::{self, Event, KeyEventKind};

use lingo::app::App;
use lingo::cli::Args;
use lingo::tui::TerminalEventGuard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize the terminal with crossterm backend
    let mut terminal = ratatui::init();

    // Run the application
    let result = run_app(&mut terminal, args);

    // Restore the terminal
    ratatui::restore();

    result
}

fn run_app(terminal: &mut ratatui::DefaultTerminal, args: Args) -> anyhow::Result<()> {
    // Enable bracketed paste so multi-line pastes arrive as one event.
    // The guard ensures cleanup even if the application panics.
    //
    // IMPORTANT: This must be initialized inside run_app (after ratatui
    // sets up the terminal) because terminal initialization can reset
    // terminal flags.
    let _event_guard = TerminalEventGuard::new();

    let mut app = App::new(args.backend);

    // Main event loop
    loop {
        // Render the UI
        // IMPORTANT: Layout calculation must happen inside the draw closure
        // to ensure it uses the exact same area as rendering
        terminal.draw(|frame| {
            app.update_layout(frame.area());
            app.render(frame);
        })?;

        // Poll for events with a short timeout
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                }
                // Bracketed paste events (multi-line paste)
                Event::Paste(text) => {
                    app.handle_paste(&text);
                }
                _ => {}
            }
        }

        // Apply chat replies, upload outcomes, and search results
        app.process_events();

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
