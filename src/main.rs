//! Taiwan Weather Dashboard - current weather for the region nearest you
//!
//! A terminal UI application that shows current conditions, advice and a short
//! forecast for Taiwan's 22 cities and counties.

use std::io;
use std::panic;
use std::process;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use twweather::app::App;
use twweather::cli::{Cli, StartupConfig};
use twweather::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments before touching the terminal
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    // Logging is best effort; the dashboard runs without it
    if let Err(e) = logging::init(config.log_file.clone()) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);

    // Initial render to show loading state
    terminal.draw(|f| ui::render(f, &app))?;

    // Trigger initial data load
    app.load_all_data().await;

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Requests are awaited inline, so a second refresh cannot start
        // while one is outstanding
        if app.refresh_requested {
            app.busy = Some("Refreshing weather data...");
            terminal.draw(|f| ui::render(f, &app))?;
            app.refresh().await;
            continue;
        }
        if app.locate_requested {
            app.busy = Some("Locating...");
            terminal.draw(|f| ui::render(f, &app))?;
            app.locate_and_select().await;
            continue;
        }

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    tracing::info!("dashboard closed");
    Ok(())
}
