//! UI rendering module for the Taiwan weather dashboard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod dashboard;
pub mod help_overlay;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};

pub use dashboard::render as render_dashboard;
pub use help_overlay::render as render_help_overlay;

/// Renders the UI based on the current application state
pub fn render(frame: &mut Frame, app: &App) {
    match app.state {
        AppState::Loading => render_loading(frame),
        AppState::Dashboard => render_dashboard(frame, app),
        AppState::NoData => render_no_data(frame, app),
    }

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Renders a loading message while data is being fetched
fn render_loading(frame: &mut Frame) {
    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading weather data...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Renders the screen shown when no region has data
fn render_no_data(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(5),
            Constraint::Percentage(40),
        ])
        .split(area);

    let mut lines = vec![
        Line::styled(
            "No weather data available",
            Style::default().fg(Color::Yellow),
        ),
        Line::from(""),
    ];
    if let Some(notice) = &app.notice {
        lines.push(Line::styled(
            notice.text().to_string(),
            Style::default().fg(Color::Red),
        ));
    }
    lines.push(Line::styled(
        "Press r to retry or q to quit",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, chunks[1]);
}
