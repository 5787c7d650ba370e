//! Dashboard screen rendering
//!
//! Renders the region list on the left and, on the right, the current
//! conditions, advice and forecast cards for the selected region.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Notice, SelectionSource};
use crate::presentation::{ForecastCard, ViewModel, WeatherCategory, MISSING};

/// Width of the region list column, borders included
const LIST_WIDTH: u16 = 28;

/// Renders the dashboard screen
///
/// # Arguments
/// * `frame` - The ratatui frame to render into
/// * `app` - The application state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(2), // Footer
        ])
        .split(area);

    let view_model = app.view_model();

    render_header(frame, chunks[0], app, view_model.as_ref());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(0)])
        .split(chunks[1]);

    render_region_list(frame, body[0], app);
    match &view_model {
        Some(vm) => render_detail(frame, body[1], vm),
        None => render_missing_region(frame, body[1], app),
    }

    render_footer(frame, chunks[2], app);
}

/// Renders the title line and how the region was chosen
fn render_header(frame: &mut Frame, area: Rect, app: &App, vm: Option<&ViewModel>) {
    let mut title = vec![Span::styled(
        "TWWEATHER",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(region) = app.current_region {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            region.english_name,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
        title.push(Span::raw(" "));
        title.push(Span::styled(region.name, Style::default().fg(Color::White)));
    }

    if let Some(vm) = vm {
        title.push(Span::styled(
            format!("  Updated {}", vm.update_time),
            Style::default().fg(Color::Gray),
        ));
    }

    let source = match &app.selection_source {
        Some(source) => Line::from(Span::styled(
            selection_label(source),
            Style::default().fg(Color::DarkGray),
        )),
        None => Line::from(""),
    };

    frame.render_widget(Paragraph::new(vec![Line::from(title), source]), area);
}

/// Describes how the current region was chosen
fn selection_label(source: &SelectionSource) -> String {
    match source {
        SelectionSource::Nearest { distance_km } => {
            format!("\u{1F4CD} Nearest to you ({:.1} km)", distance_km)
        }
        SelectionSource::Fallback { reason } => format!("Default region ({})", reason),
        SelectionSource::Manual => "Selected from list".to_string(),
    }
}

/// First line to show so that the cursor stays visible
fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 || selected < visible {
        0
    } else {
        selected + 1 - visible
    }
}

/// Renders the ordered region list with the cursor and current region marked
fn render_region_list(frame: &mut Frame, area: Rect, app: &App) {
    let current_name = app.current_region.map(|r| r.name);

    let lines: Vec<Line> = app
        .regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let is_selected = index == app.selected_index;
            let is_current = Some(region.name) == current_name;

            let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸
            let marker = if is_current { "\u{2022}" } else { " " }; // •

            let name_style = if is_selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(cursor, Style::default().fg(Color::Cyan)),
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(region.english_name, name_style),
            ])
        })
        .collect();

    let visible = area.height.saturating_sub(2) as usize;
    let offset = scroll_offset(app.selected_index, visible);

    let block = Block::default()
        .title(format!(" Regions ({}) ", app.regions.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((offset as u16, 0));

    frame.render_widget(paragraph, area);
}

/// Renders current conditions, advice and forecast cards
fn render_detail(frame: &mut Frame, area: Rect, vm: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Current conditions
            Constraint::Length(4), // Advice
            Constraint::Min(0),    // Forecast cards
        ])
        .split(area);

    render_current(frame, chunks[0], vm);
    render_advice(frame, chunks[1], vm);
    render_cards(frame, chunks[2], &vm.cards);
}

fn render_current(frame: &mut Frame, area: Rect, vm: &ViewModel) {
    let label = Style::default().fg(Color::Gray);

    let lines = vec![
        Line::from(vec![
            Span::raw(format!("{}  ", vm.icon)),
            Span::styled(
                temperature_label(&vm.display_temperature),
                Style::default()
                    .fg(category_color(vm.category))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(vm.description.clone()),
        ]),
        Line::from(vec![
            Span::styled("Range    ", label),
            Span::raw(vm.temperature_range.clone()),
        ]),
        Line::from(vec![
            Span::styled("Rain     ", label),
            Span::raw(rain_label(&vm.rain)),
        ]),
        Line::from(vec![
            Span::styled("Comfort  ", label),
            Span::raw(vm.comfort.clone()),
        ]),
        Line::from(vec![
            Span::styled("Wind     ", label),
            Span::raw(vm.wind_speed.clone()),
        ]),
    ];

    let block = Block::default()
        .title(" Now ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_advice(frame: &mut Frame, area: Rect, vm: &ViewModel) {
    let block = Block::default()
        .title(" Advice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(vm.advice.clone())
        .style(Style::default().fg(Color::Green))
        .wrap(Wrap { trim: true })
        .block(block);

    frame.render_widget(paragraph, area);
}

fn render_cards(frame: &mut Frame, area: Rect, cards: &[ForecastCard]) {
    if cards.is_empty() {
        let paragraph = Paragraph::new("No forecast available")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .title(" Forecast ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(paragraph, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, cards.len() as u32);
            cards.len()
        ])
        .split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        render_card(frame, *column, card);
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &ForecastCard) {
    let title = if card.date_label.is_empty() {
        MISSING.to_string()
    } else {
        card.date_label.clone()
    };

    let lines = vec![
        Line::from(vec![
            Span::raw(format!("{} ", card.icon)),
            Span::styled(
                card.description.clone(),
                Style::default().fg(category_color(Some(card.category))),
            ),
        ]),
        Line::from(format!("Rain {}", rain_label(&card.rain))),
        Line::from(card.temperature_range.clone()),
        Line::from(Span::styled(
            card.comfort.clone(),
            Style::default().fg(Color::Gray),
        )),
    ];

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Shown when the current region has no record in the latest data
fn render_missing_region(frame: &mut Frame, area: Rect, app: &App) {
    let text = match app.current_region {
        Some(region) => format!("No data for {} {}", region.english_name, region.name),
        None => "Select a region from the list".to_string(),
    };

    let block = Block::default()
        .title(" Now ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);

    frame.render_widget(paragraph, area);
}

/// Renders key hints, data freshness and the status line
fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut help_spans = vec![
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Navigate  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Select  "),
        Span::styled("l", Style::default().fg(Color::Yellow)),
        Span::raw(" Locate  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Refresh  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    // Add data freshness indicator
    if let Some(last_refresh) = app.last_refresh {
        let elapsed = Local::now() - last_refresh;
        let mins_ago = elapsed.num_minutes();
        let freshness_text = if mins_ago < 1 {
            " │ Data: just now".to_string()
        } else if mins_ago < 60 {
            format!(" │ Data: {}m ago", mins_ago)
        } else {
            format!(" │ Data: {}h ago", elapsed.num_hours())
        };
        help_spans.push(Span::styled(
            freshness_text,
            Style::default().fg(Color::DarkGray),
        ));
    }

    let status = if let Some(busy) = app.busy {
        Line::from(Span::styled(busy, Style::default().fg(Color::Cyan)))
    } else {
        match &app.notice {
            Some(Notice::Warning(text)) => {
                Line::from(Span::styled(text.clone(), Style::default().fg(Color::Red)))
            }
            Some(Notice::Info(text)) => {
                Line::from(Span::styled(text.clone(), Style::default().fg(Color::Yellow)))
            }
            None => Line::from(""),
        }
    };

    let paragraph = Paragraph::new(vec![Line::from(help_spans), status])
        .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}

/// "25" becomes "25°C"; the missing marker stays as-is
fn temperature_label(temperature: &str) -> String {
    if temperature == MISSING {
        MISSING.to_string()
    } else {
        format!("{}\u{00B0}C", temperature)
    }
}

/// Bare numbers are rain probabilities and get a percent sign
fn rain_label(rain: &str) -> String {
    if rain.trim().parse::<f64>().is_ok() {
        format!("{}%", rain.trim())
    } else {
        rain.to_string()
    }
}

/// Accent color for a weather category
fn category_color(category: Option<WeatherCategory>) -> Color {
    match category {
        Some(WeatherCategory::Sunny) => Color::Yellow,
        Some(WeatherCategory::Rain) => Color::Blue,
        Some(WeatherCategory::Thunder) => Color::Magenta,
        Some(WeatherCategory::Snow) => Color::White,
        Some(WeatherCategory::Overcast)
        | Some(WeatherCategory::PartlyCloudy)
        | Some(WeatherCategory::Fog) => Color::Gray,
        None => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppState, Notice};
    use crate::data::{
        get_region_by_name, FeedClient, ForecastBlock, Snapshot, WeatherRecord,
        WeatherRepository,
    };
    use crate::locate::LocationSource;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Duration;

    fn block(start: &str, weather: &str, rain: &str) -> ForecastBlock {
        ForecastBlock {
            start_time: Some(start.to_string()),
            weather: Some(weather.to_string()),
            min_temp: Some("18°C".to_string()),
            max_temp: Some("25°C".to_string()),
            rain: Some(rain.to_string()),
            comfort: Some("舒適".to_string()),
            wind_speed: Some("3 m/s".to_string()),
            ..Default::default()
        }
    }

    /// Helper to create a dashboard app showing Taipei with three forecast windows
    fn create_test_app() -> App {
        let mut app = App::with_parts(
            WeatherRepository::new(FeedClient::new("http://127.0.0.1:9/unused")),
            LocationSource::Disabled,
            get_region_by_name("臺北市").unwrap(),
            Duration::from_secs(1),
        );

        let taipei = WeatherRecord {
            region: get_region_by_name("臺北市").unwrap(),
            update_time: Some("2025-01-01 05:00:00".to_string()),
            forecasts: vec![
                block("2025-01-01 06:00:00", "晴", "10"),
                block("2025-01-01 18:00:00", "多雲", "20"),
                block("2025-01-02 06:00:00", "短暫雨", "70"),
            ],
        };
        let keelung = WeatherRecord {
            region: get_region_by_name("基隆市").unwrap(),
            update_time: None,
            forecasts: vec![],
        };

        let snapshot = Arc::new(Snapshot::from_records(vec![taipei, keelung]));
        app.regions = snapshot.ordered_regions();
        app.snapshot = snapshot;
        app.state = AppState::Dashboard;
        app.select_region(
            get_region_by_name("臺北市").unwrap(),
            SelectionSource::Nearest { distance_km: 1.25 },
        );
        app
    }

    fn render_to_string(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_produces_non_empty_buffer() {
        let app = create_test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(!content.trim().is_empty());
    }

    #[test]
    fn test_header_shows_region_and_update_time() {
        let app = create_test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("TWWEATHER"));
        assert!(content.contains("Taipei City"));
        assert!(content.contains("Updated 2025-01-01 05:00:00"));
        assert!(content.contains("Nearest to you (1.2 km)") || content.contains("(1.3 km)"));
    }

    #[test]
    fn test_region_list_is_rendered_in_order() {
        let app = create_test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Regions (2)"));
        let keelung = content.find("Keelung City").unwrap();
        let taipei = content.rfind("Taipei City").unwrap();
        assert!(keelung < taipei);
    }

    #[test]
    fn test_cursor_marks_selected_region() {
        let app = create_test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("\u{25B8} \u{2022}Taipei City"));
    }

    #[test]
    fn test_current_conditions_rendered() {
        let app = create_test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("25°C"));
        assert!(content.contains("Rain     10%"));
        assert!(content.contains("3 m/s"));
    }

    #[test]
    fn test_three_forecast_cards_rendered() {
        let app = create_test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("2025-01-01"));
        assert!(content.contains("2025-01-02"));
        assert!(content.contains("Rain 70%"));
        assert!(content.contains("18°C / 25°C"));
    }

    #[test]
    fn test_region_without_forecasts_shows_placeholders() {
        let mut app = create_test_app();
        app.select_region_by_name("基隆市");
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Keelung City"));
        assert!(content.contains("No forecast available"));
        assert!(content.contains(&format!("Rain     {}", MISSING)));
    }

    #[test]
    fn test_region_without_record_shows_no_data() {
        let mut app = create_test_app();
        app.select_region_by_name("金門縣");
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("No data for Kinmen County"));
    }

    #[test]
    fn test_notice_is_rendered() {
        let mut app = create_test_app();
        app.notice = Some(Notice::Warning("HTTP status 502".to_string()));
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("HTTP status 502"));
    }

    #[test]
    fn test_busy_status_replaces_notice() {
        let mut app = create_test_app();
        app.notice = Some(Notice::Warning("old failure".to_string()));
        app.busy = Some("Refreshing...");
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Refreshing..."));
        assert!(!content.contains("old failure"));
    }

    #[test]
    fn test_help_text_is_rendered() {
        let app = create_test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Refresh"));
        assert!(content.contains("Locate"));
        assert!(content.contains("Quit"));
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        let app = create_test_app();
        let _ = render_to_string(&app, 20, 5);
    }

    #[test]
    fn test_selection_labels() {
        assert_eq!(
            selection_label(&SelectionSource::Fallback {
                reason: "Location is not available".to_string()
            }),
            "Default region (Location is not available)"
        );
        assert_eq!(
            selection_label(&SelectionSource::Manual),
            "Selected from list"
        );
        assert!(selection_label(&SelectionSource::Nearest { distance_km: 3.04 })
            .ends_with("Nearest to you (3.0 km)"));
    }

    #[test]
    fn test_scroll_offset_keeps_cursor_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(21, 10), 12);
        assert_eq!(scroll_offset(5, 0), 0);
    }

    #[test]
    fn test_rain_label() {
        assert_eq!(rain_label("30"), "30%");
        assert_eq!(rain_label(" 5 "), "5%");
        assert_eq!(rain_label("30%"), "30%");
        assert_eq!(rain_label(MISSING), MISSING);
    }

    #[test]
    fn test_temperature_label() {
        assert_eq!(temperature_label("25"), "25°C");
        assert_eq!(temperature_label(MISSING), MISSING);
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(category_color(Some(WeatherCategory::Rain)), Color::Blue);
        assert_eq!(category_color(None), Color::DarkGray);
    }
}
