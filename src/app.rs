//! Application state management for the Taiwan weather dashboard
//!
//! This module contains the main application state: it owns the weather
//! repository and the location source, decides which region is shown, and
//! turns keyboard input into selection, refresh and re-location requests.
//! Every failure is recovered here; the UI only ever sees renderable state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{info, warn};

use crate::cli::StartupConfig;
use crate::data::{
    get_region_by_name, nearest, FeedClient, FeedError, Region, Snapshot, WeatherRepository,
};
use crate::geo::distance_km;
use crate::locate::LocationSource;
use crate::presentation::{project, ViewModel};

/// Shown when a refresh fails and the previous data stays on screen
pub const FETCH_FAILED_NOTICE: &str = "無法取得天氣資料，請稍後再試。";

/// Shown when the feed answered without any usable region
pub const EMPTY_FEED_NOTICE: &str = "天氣資料暫無內容，保留目前顯示的資料。";

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching data
    Loading,
    /// Dashboard for the current region
    Dashboard,
    /// No data could be loaded at all
    NoData,
}

/// How the current region was chosen
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionSource {
    /// Closest region to the user's location
    Nearest { distance_km: f64 },
    /// Preferred or first region, because location failed
    Fallback { reason: String },
    /// Picked by the user from the list
    Manual,
}

/// A message for the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Warning(text) => text,
        }
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Cursor position in the region list
    pub selected_index: usize,
    /// Regions with data, in display order
    pub regions: Vec<&'static Region>,
    /// Region whose dashboard is shown
    pub current_region: Option<&'static Region>,
    /// How `current_region` was chosen
    pub selection_source: Option<SelectionSource>,
    /// Latest successful feed snapshot
    pub snapshot: Arc<Snapshot>,
    /// Status line message
    pub notice: Option<Notice>,
    /// Operation in progress, shown while the event loop waits on it
    pub busy: Option<&'static str>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a refresh has been requested
    pub refresh_requested: bool,
    /// Flag indicating a new location lookup has been requested
    pub locate_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Timestamp of last successful data refresh
    pub last_refresh: Option<DateTime<Local>>,
    repository: WeatherRepository,
    location: LocationSource,
    default_region: &'static Region,
    geo_timeout: Duration,
}

impl App {
    /// Creates a new App from the startup configuration
    pub fn new(config: StartupConfig) -> Self {
        let client = FeedClient::with_timeout(config.endpoint, config.fetch_timeout);
        Self::with_parts(
            WeatherRepository::new(client),
            config.location.into_source(),
            config.default_region,
            config.geo_timeout,
        )
    }

    /// Creates a new App from already-built collaborators
    pub fn with_parts(
        repository: WeatherRepository,
        location: LocationSource,
        default_region: &'static Region,
        geo_timeout: Duration,
    ) -> Self {
        Self {
            state: AppState::Loading,
            selected_index: 0,
            regions: Vec::new(),
            current_region: None,
            selection_source: None,
            snapshot: repository.snapshot(),
            notice: None,
            busy: None,
            should_quit: false,
            refresh_requested: false,
            locate_requested: false,
            show_help: false,
            last_refresh: None,
            repository,
            location,
            default_region,
            geo_timeout,
        }
    }

    /// Loads the feed, then locates the user and selects a region.
    ///
    /// Ends in `Dashboard` when any data is available, otherwise `NoData`.
    pub async fn load_all_data(&mut self) {
        self.refresh().await;
        if !self.snapshot.is_empty() {
            self.locate_and_select().await;
        }
    }

    /// Refreshes the feed.
    ///
    /// On success the new snapshot replaces the old one and the current region
    /// is kept when still present. On failure everything stays as it was and a
    /// notice is posted.
    pub async fn refresh(&mut self) {
        self.refresh_requested = false;

        match self.repository.refresh().await {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                self.notice = None;
            }
            Err(e) => self.report_refresh_error(&e),
        }

        self.state = if self.snapshot.is_empty() {
            AppState::NoData
        } else {
            AppState::Dashboard
        };
        self.busy = None;
    }

    fn report_refresh_error(&mut self, error: &FeedError) {
        warn!(error = %error, "keeping previous weather data");
        self.notice = Some(if error.is_soft() {
            Notice::Info(EMPTY_FEED_NOTICE.to_string())
        } else {
            Notice::Warning(format!("{} ({})", FETCH_FAILED_NOTICE, error))
        });
    }

    /// Installs a snapshot and rebuilds the region list around it
    fn apply_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        self.last_refresh = Some(snapshot.fetched_at().unwrap_or_else(Local::now));
        self.regions = snapshot.ordered_regions();
        self.snapshot = snapshot;

        match self.current_region {
            Some(region) if !self.snapshot.contains(region.name) => {
                info!(region = region.name, "current region missing after refresh");
                self.select_fallback("region missing from latest data".to_string());
            }
            Some(_) => self.sync_cursor(),
            None => self.select_fallback("location not resolved yet".to_string()),
        }
    }

    /// Asks the location source for coordinates and selects the nearest region,
    /// falling back to the preferred region on any failure.
    pub async fn locate_and_select(&mut self) {
        self.locate_requested = false;

        match self.location.locate(self.geo_timeout).await {
            Ok(point) => match nearest(point, &self.snapshot.region_names()) {
                Ok(region) => {
                    let distance = distance_km(point, region.centroid);
                    info!(region = region.name, distance_km = distance, "selected nearest region");
                    self.select_region(
                        region,
                        SelectionSource::Nearest {
                            distance_km: distance,
                        },
                    );
                }
                Err(e) => {
                    warn!(error = %e, "nearest-region lookup failed");
                    self.select_fallback(e.to_string());
                }
            },
            Err(e) => {
                info!(error = %e, "location unavailable, using fallback region");
                self.select_fallback(e.to_string());
            }
        }

        self.busy = None;
    }

    /// The region to show when location fails: the preferred region if the
    /// feed has it, else the first region the feed listed.
    pub fn fallback_region(&self) -> Option<&'static Region> {
        if self.snapshot.contains(self.default_region.name) {
            return Some(self.default_region);
        }
        self.snapshot
            .fetch_order()
            .first()
            .and_then(|name| get_region_by_name(name))
    }

    fn select_fallback(&mut self, reason: String) {
        match self.fallback_region() {
            Some(region) => self.select_region(region, SelectionSource::Fallback { reason }),
            None => {
                self.current_region = None;
                self.selection_source = None;
            }
        }
    }

    /// Makes `region` the shown region
    pub fn select_region(&mut self, region: &'static Region, source: SelectionSource) {
        self.current_region = Some(region);
        self.selection_source = Some(source);
        self.sync_cursor();
    }

    /// Handles a user selecting a region by canonical name.
    ///
    /// Returns `false` for names outside the region table. A known region
    /// without data is still selected and shows as having no data.
    pub fn select_region_by_name(&mut self, name: &str) -> bool {
        match get_region_by_name(name) {
            Some(region) => {
                self.select_region(region, SelectionSource::Manual);
                true
            }
            None => false,
        }
    }

    fn sync_cursor(&mut self) {
        if let Some(current) = self.current_region {
            if let Some(index) = self.regions.iter().position(|r| r.name == current.name) {
                self.selected_index = index;
                return;
            }
        }
        if self.selected_index >= self.regions.len() {
            self.selected_index = 0;
        }
    }

    /// View model for the shown region; `None` when it has no record
    pub fn view_model(&self) -> Option<ViewModel> {
        let region = self.current_region?;
        self.snapshot.get(region.name).map(project)
    }

    /// Region under the list cursor
    pub fn highlighted_region(&self) -> Option<&'static Region> {
        self.regions.get(self.selected_index).copied()
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move the list cursor
    /// - `Enter`: Show the region under the cursor
    /// - `r`: Refresh the feed
    /// - `l`: Locate again and jump to the nearest region
    /// - `?`: Toggle the help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                // Only quit is allowed during loading
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Dashboard | AppState::NoData => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter => {
                    if let Some(region) = self.highlighted_region() {
                        self.select_region(region, SelectionSource::Manual);
                    }
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('l') => {
                    if !self.snapshot.is_empty() {
                        self.locate_requested = true;
                    }
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Moves the cursor up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.regions.len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the cursor down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.regions.len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}
