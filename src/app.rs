use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    Coordinate, Pagination, PreviousBooking, Provider, RebookRequest, SearchFilters,
    SearchRequest, SearchResponse, SortOrder,
};
use crate::rebook::RebookForm;
use crate::session::Session;
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::VecDeque;
use tracing::{debug, info};

/// How long a status-line notification stays up, in ticks.
const NOTIFICATION_TICKS: usize = 40;
/// Map radius slider bounds, km.
const RADIUS_MIN_KM: f64 = 1.0;
const RADIUS_MAX_KM: f64 = 10.0;

/// One search cycle. Any filter/sort/page change in Success or Failed
/// re-enters Loading with a fresh sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ViewMode {
    Browse,
    Filters,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Browse
    }
}

/// Rows of the filter panel, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRow {
    Sort,
    RatingMin,
    RatingMax,
    MaxDistance,
    AvailabilityDays,
    PreviouslyHired,
    FavoritesOnly,
    VerifiedOnly,
}

impl FilterRow {
    pub const ALL: [FilterRow; 8] = [
        FilterRow::Sort,
        FilterRow::RatingMin,
        FilterRow::RatingMax,
        FilterRow::MaxDistance,
        FilterRow::AvailabilityDays,
        FilterRow::PreviouslyHired,
        FilterRow::FavoritesOnly,
        FilterRow::VerifiedOnly,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    expires_at: usize,
}

/// Side effects the app asks the event loop to perform. The app itself
/// never does I/O, which is what makes the state machine testable.
#[derive(Debug, Clone)]
pub enum Command {
    Search { seq: u64, request: SearchRequest },
    Favorite { provider_id: String, add: bool },
    LoadPreviousBooking { provider_id: String },
    SubmitRebook { request: RebookRequest },
    ClearSession,
}

pub struct App {
    pub config: Config,
    pub session: Session,

    /// `None` until geolocation resolves, then the coordinate or a
    /// confirmed-unavailable marker via `location_resolved`.
    pub location: Option<Coordinate>,
    pub location_resolved: bool,

    pub filters: SearchFilters,
    pub sort: SortOrder,
    pub pagination: Pagination,
    pub radius_km: f64,

    pub search_state: SearchState,
    pub providers: Vec<Provider>,
    pub selected_index: usize,

    pub view_mode: ViewMode,
    pub filter_cursor: usize,
    /// Full-profile overlay for the selected provider.
    pub profile_open: bool,
    pub rebook: Option<RebookForm>,
    pub notification: Option<Notification>,

    pub tick_count: usize,
    pub should_quit: bool,

    last_seq: u64,
    commands: VecDeque<Command>,
}

impl App {
    pub fn new(config: Config, session: Session) -> Self {
        let radius_km = config
            .location
            .radius_km
            .clamp(RADIUS_MIN_KM, RADIUS_MAX_KM);
        let pagination = Pagination::new(config.ui.page_limit);
        Self {
            config,
            session,
            location: None,
            location_resolved: false,
            filters: SearchFilters::default(),
            sort: SortOrder::default(),
            pagination,
            radius_km,
            search_state: SearchState::Idle,
            providers: Vec::new(),
            selected_index: 0,
            view_mode: ViewMode::Browse,
            filter_cursor: 0,
            profile_open: false,
            rebook: None,
            notification: None,
            tick_count: 0,
            should_quit: false,
            last_seq: 0,
            commands: VecDeque::new(),
        }
    }

    /// Commands queued since the last drain, for the event loop to execute.
    pub fn take_commands(&mut self) -> Vec<Command> {
        self.commands.drain(..).collect()
    }

    pub fn selected_provider(&self) -> Option<&Provider> {
        self.providers.get(self.selected_index)
    }

    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            severity,
            expires_at: self.tick_count + NOTIFICATION_TICKS,
        });
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
        if let Some(n) = &self.notification {
            if self.tick_count >= n.expires_at {
                self.notification = None;
            }
        }
    }

    // --- search cycle ---

    /// Queues a search for the current filter/sort/page state and bumps the
    /// sequence number. Completions for any older sequence are stale.
    pub fn request_search(&mut self) {
        self.last_seq += 1;
        let request = SearchRequest {
            current_location: self.location,
            filters: self.filters.clone(),
            sort_by: self.sort,
            page: self.pagination.page,
            limit: self.pagination.limit,
        };
        debug!(seq = self.last_seq, page = request.page, "Queueing provider search");
        self.search_state = SearchState::Loading;
        self.commands.push_back(Command::Search {
            seq: self.last_seq,
            request,
        });
    }

    /// Applies a search completion in request-issue order: anything but the
    /// latest issued sequence is dropped on the floor, so a stale slow
    /// response can never overwrite a newer fast one.
    pub fn apply_search_result(&mut self, seq: u64, result: Result<SearchResponse, ApiError>) {
        if seq != self.last_seq {
            debug!(seq, latest = self.last_seq, "Discarding stale search response");
            return;
        }
        match result {
            Ok(response) => {
                info!(total = response.total, "Provider search succeeded");
                self.providers = response.providers;
                self.pagination.set_totals(response.total, response.pages);
                self.selected_index = 0;
                self.search_state = SearchState::Success;
            }
            Err(e) => {
                // Empty state, never a partially stale list.
                self.providers.clear();
                self.selected_index = 0;
                self.search_state = SearchState::Failed;
                self.notify(Severity::Error, "Failed to load providers. Please try again.");
                tracing::warn!("Provider search failed: {}", e);
            }
        }
    }

    /// Startup geolocation outcome. The search runs either way; without a
    /// location the backend skips distance semantics and the user gets a
    /// warning instead of an error.
    pub fn set_location(&mut self, location: Option<Coordinate>) {
        self.location_resolved = true;
        self.location = location;
        if location.is_none() {
            self.notify(
                Severity::Warn,
                "Location unavailable. Distance sorting may not be accurate.",
            );
        }
        self.request_search();
    }

    // --- favorites ---

    /// Two-phase favorite toggle: flip locally, queue the network call, and
    /// let [`apply_favorite_result`](Self::apply_favorite_result) revert on
    /// failure. Unknown ids (e.g. the page changed under a stale action)
    /// are a strict no-op.
    pub fn toggle_favorite(&mut self, provider_id: &str) {
        if !self.session.is_signed_in() {
            self.notify(Severity::Error, "Please sign in to manage favorites.");
            return;
        }
        let Some(provider) = self.providers.iter_mut().find(|p| p.id == provider_id) else {
            return;
        };
        let add = !provider.is_favorite;
        provider.is_favorite = add;
        self.commands.push_back(Command::Favorite {
            provider_id: provider_id.to_string(),
            add,
        });
    }

    pub fn apply_favorite_result(
        &mut self,
        provider_id: &str,
        add: bool,
        result: Result<(), ApiError>,
    ) {
        match result {
            Ok(()) => {
                let verb = if add { "Added to" } else { "Removed from" };
                self.notify(Severity::Info, format!("{} favorites", verb));
            }
            Err(e) => {
                // Revert the optimistic flip, but only if the provider is
                // still on this page and still shows the tentative state.
                if let Some(p) = self.providers.iter_mut().find(|p| p.id == provider_id) {
                    if p.is_favorite == add {
                        p.is_favorite = !add;
                    }
                }
                self.notify(Severity::Error, e.user_message());
            }
        }
    }

    // --- rebook flow ---

    fn open_rebook(&mut self) {
        if !self.session.is_signed_in() {
            self.notify(Severity::Error, "Please sign in to book a provider.");
            return;
        }
        let Some(provider) = self.selected_provider() else {
            return;
        };
        let form = RebookForm::new(provider);
        self.commands.push_back(Command::LoadPreviousBooking {
            provider_id: form.provider_id.clone(),
        });
        self.rebook = Some(form);
    }

    pub fn apply_previous_booking(
        &mut self,
        provider_id: &str,
        result: Result<Option<PreviousBooking>, ApiError>,
    ) {
        let Some(form) = self.rebook.as_mut() else {
            return;
        };
        if form.provider_id != provider_id {
            return;
        }
        match result {
            Ok(previous) => form.apply_previous(previous),
            Err(e) => {
                // The form still works, just without prefill.
                form.apply_previous(None);
                tracing::warn!("Previous booking lookup failed: {}", e);
            }
        }
    }

    fn submit_rebook(&mut self) {
        let today = chrono::Local::now().date_naive();
        let Some(form) = self.rebook.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        match form.validate(today) {
            Ok(request) => {
                form.submitting = true;
                form.field_error = None;
                self.commands.push_back(Command::SubmitRebook { request });
            }
            Err((field, message)) => {
                form.focused = field;
                form.field_error = Some((field, message.clone()));
                self.notify(Severity::Error, message);
            }
        }
    }

    pub fn apply_rebook_result(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.rebook = None;
                self.notify(Severity::Info, "Booking created successfully!");
                // Refresh so previously_hired flags and counts catch up.
                self.request_search();
            }
            Err(e) => {
                if let Some(form) = self.rebook.as_mut() {
                    form.submitting = false;
                }
                self.notify(Severity::Error, e.user_message());
            }
        }
    }

    // --- input handling ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.rebook.is_some() {
            self.handle_rebook_key(key);
            return;
        }
        if self.profile_open {
            match key.code {
                // Actions stay available while the profile is up.
                KeyCode::Char('f') => {
                    if let Some(id) = self.selected_provider().map(|p| p.id.clone()) {
                        self.toggle_favorite(&id);
                    }
                }
                KeyCode::Char('r') => {
                    self.profile_open = false;
                    self.open_rebook();
                }
                KeyCode::Char('d') => self.show_directions(),
                _ => self.profile_open = false,
            }
            return;
        }
        match self.view_mode {
            ViewMode::Browse => self.handle_browse_key(key),
            ViewMode::Filters => self.handle_filters_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.providers.is_empty() {
                    self.selected_index = (self.selected_index + 1) % self.providers.len();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.providers.is_empty() {
                    self.selected_index = self
                        .selected_index
                        .checked_sub(1)
                        .unwrap_or(self.providers.len() - 1);
                }
            }
            KeyCode::Right | KeyCode::Char('n') => self.change_page(self.pagination.page + 1),
            KeyCode::Left | KeyCode::Char('p') => {
                self.change_page(self.pagination.page.saturating_sub(1))
            }
            KeyCode::Char('s') => {
                self.sort = self.sort.next();
                self.pagination.reset();
                self.request_search();
            }
            KeyCode::Char('f') => {
                if let Some(id) = self.selected_provider().map(|p| p.id.clone()) {
                    self.toggle_favorite(&id);
                }
            }
            KeyCode::Char('r') => self.open_rebook(),
            KeyCode::Char('d') => self.show_directions(),
            KeyCode::Enter | KeyCode::Char('v') => {
                if self.selected_provider().is_some() {
                    self.profile_open = true;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_radius(1.0),
            KeyCode::Char('-') => self.adjust_radius(-1.0),
            KeyCode::Char('g') => self.request_search(),
            KeyCode::Char('x') => self.logout(),
            KeyCode::Tab | KeyCode::Char('/') => self.view_mode = ViewMode::Filters,
            _ => {}
        }
    }

    fn handle_filters_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.view_mode = ViewMode::Browse,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                self.filter_cursor = (self.filter_cursor + 1) % FilterRow::ALL.len();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.filter_cursor = self
                    .filter_cursor
                    .checked_sub(1)
                    .unwrap_or(FilterRow::ALL.len() - 1);
            }
            KeyCode::Left | KeyCode::Char('h') => self.adjust_filter(-1),
            KeyCode::Right | KeyCode::Char('l') => self.adjust_filter(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.adjust_filter(1),
            KeyCode::Char('c') => {
                self.filters = SearchFilters::default();
                self.sort = SortOrder::default();
                self.pagination.reset();
                self.request_search();
            }
            _ => {}
        }
    }

    fn handle_rebook_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                // Can't bail out mid-submit; the completion will resolve it.
                if self.rebook.as_ref().is_some_and(|f| !f.submitting) {
                    self.rebook = None;
                }
            }
            KeyCode::Enter => self.submit_rebook(),
            code => {
                if let Some(form) = self.rebook.as_mut() {
                    match code {
                        KeyCode::Tab | KeyCode::Down => form.focus_next(),
                        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(c) => form.input_char(c),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Page navigation. No-ops outside `[1, pages]`; on a real change the
    /// list scrolls back to the top and a search is issued.
    fn change_page(&mut self, page: u32) {
        if self.pagination.go_to(page) {
            self.selected_index = 0;
            self.request_search();
        }
    }

    fn adjust_filter(&mut self, direction: i32) {
        let d = direction as f64;
        let f = &mut self.filters;
        match FilterRow::ALL[self.filter_cursor] {
            FilterRow::Sort => {
                self.sort = self.sort.next();
            }
            FilterRow::RatingMin => {
                f.rating_min = (f.rating_min + 0.5 * d).clamp(0.0, f.rating_max);
            }
            FilterRow::RatingMax => {
                f.rating_max = (f.rating_max + 0.5 * d).clamp(f.rating_min, 5.0);
            }
            FilterRow::MaxDistance => {
                f.max_distance = (f.max_distance + 5.0 * d).clamp(1.0, 100.0);
            }
            FilterRow::AvailabilityDays => {
                let days = f.availability_days as i64 + direction as i64;
                f.availability_days = days.clamp(1, 365) as u32;
            }
            FilterRow::PreviouslyHired => f.previously_hired_only = !f.previously_hired_only,
            FilterRow::FavoritesOnly => f.favorites_only = !f.favorites_only,
            FilterRow::VerifiedOnly => f.verified_only = !f.verified_only,
        }
        self.pagination.reset();
        self.request_search();
    }

    /// Map radius slider. Presentation state only — the distance *filter*
    /// lives in the filter panel; this reframes the map disc and zoom.
    fn adjust_radius(&mut self, delta: f64) {
        let next = (self.radius_km + delta).clamp(RADIUS_MIN_KM, RADIUS_MAX_KM);
        if (next - self.radius_km).abs() > f64::EPSILON {
            self.radius_km = next;
        }
    }

    fn show_directions(&mut self) {
        let Some(origin) = self.location else {
            self.notify(Severity::Warn, "Directions need your location.");
            return;
        };
        let Some(dest) = self.selected_provider().and_then(|p| p.coordinates) else {
            self.notify(Severity::Warn, "No coordinates for this provider.");
            return;
        };
        let url = crate::geo::directions_url(origin, dest);
        self.notify(Severity::Info, format!("Directions: {}", url));
    }

    fn logout(&mut self) {
        if !self.session.is_signed_in() {
            return;
        }
        self.session.token = None;
        self.session.user = None;
        self.commands.push_back(Command::ClearSession);
        self.notify(Severity::Info, "Signed out.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionUser;

    fn signed_in_session() -> Session {
        Session {
            token: Some("tok".to_string()),
            user: Some(SessionUser {
                id: "u-1".to_string(),
                name: "Asha".to_string(),
                role: "customer".to_string(),
            }),
        }
    }

    fn app() -> App {
        App::new(Config::default(), signed_in_session())
    }

    fn provider(id: &str) -> Provider {
        Provider {
            id: id.to_string(),
            name: format!("Provider {}", id),
            coordinates: Some(Coordinate::new(28.61, 77.21)),
            rating: 4.0,
            total_jobs: 10,
            skills: vec!["cleaning".to_string()],
            is_favorite: false,
            previously_hired: false,
            professional_badge: false,
            profile_picture: None,
            distance_km: Some(3.2),
        }
    }

    fn response(ids: &[&str], total: u32, pages: u32) -> SearchResponse {
        SearchResponse {
            providers: ids.iter().map(|id| provider(id)).collect(),
            total,
            pages,
        }
    }

    fn latest_seq(app: &mut App) -> u64 {
        let commands = app.take_commands();
        commands
            .iter()
            .rev()
            .find_map(|c| match c {
                Command::Search { seq, .. } => Some(*seq),
                _ => None,
            })
            .expect("no search command queued")
    }

    #[test]
    fn location_resolution_triggers_first_search() {
        let mut app = app();
        assert_eq!(app.search_state, SearchState::Idle);
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        assert_eq!(app.search_state, SearchState::Loading);
        let commands = app.take_commands();
        assert!(matches!(commands[0], Command::Search { seq: 1, .. }));
    }

    #[test]
    fn search_without_location_still_runs_but_warns() {
        let mut app = app();
        app.set_location(None);
        assert_eq!(app.search_state, SearchState::Loading);
        let n = app.notification.as_ref().expect("expected warning");
        assert_eq!(n.severity, Severity::Warn);
        let commands = app.take_commands();
        let Command::Search { request, .. } = &commands[0] else {
            panic!("expected search command");
        };
        assert!(request.current_location.is_none());
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let first = latest_seq(&mut app);

        // Second request issued before the first resolves.
        app.filters.verified_only = true;
        app.request_search();
        let second = latest_seq(&mut app);
        assert!(second > first);

        // Newer response lands first.
        app.apply_search_result(second, Ok(response(&["b"], 1, 1)));
        assert_eq!(app.search_state, SearchState::Success);
        assert_eq!(app.providers[0].id, "b");

        // Older response arrives late and must not clobber the newer one.
        app.apply_search_result(first, Ok(response(&["a"], 1, 1)));
        assert_eq!(app.providers[0].id, "b");
        assert_eq!(app.search_state, SearchState::Success);
    }

    #[test]
    fn failed_search_clears_list() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a", "b"], 2, 1)));
        assert_eq!(app.providers.len(), 2);

        app.request_search();
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Err(ApiError::Network("timeout".to_string())));
        assert!(app.providers.is_empty());
        assert_eq!(app.search_state, SearchState::Failed);
        assert_eq!(app.notification.as_ref().unwrap().severity, Severity::Error);
    }

    #[test]
    fn sort_change_resets_page() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 30, 3)));
        assert!(app.pagination.go_to(2));

        app.handle_key(KeyEvent::from(KeyCode::Char('s')));
        assert_eq!(app.pagination.page, 1);
        assert_eq!(app.search_state, SearchState::Loading);
    }

    #[test]
    fn out_of_range_page_is_a_noop() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 25, 3)));

        // Page 1 of 3: 'p' (previous) would be page 0.
        app.handle_key(KeyEvent::from(KeyCode::Char('p')));
        assert_eq!(app.pagination.page, 1);
        assert!(app.take_commands().is_empty());

        app.handle_key(KeyEvent::from(KeyCode::Char('n')));
        assert_eq!(app.pagination.page, 2);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.take_commands().len(), 1);
    }

    #[test]
    fn favorite_toggle_is_optimistic_and_reverts_on_failure() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));

        app.toggle_favorite("a");
        assert!(app.providers[0].is_favorite);
        let commands = app.take_commands();
        assert!(matches!(
            &commands[0],
            Command::Favorite { provider_id, add: true } if provider_id.as_str() == "a"
        ));

        app.apply_favorite_result(
            "a",
            true,
            Err(ApiError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        assert!(!app.providers[0].is_favorite);
        assert_eq!(app.notification.as_ref().unwrap().severity, Severity::Error);
    }

    #[test]
    fn favorite_toggle_on_unknown_provider_is_a_noop() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));

        app.toggle_favorite("ghost");
        assert!(app.take_commands().is_empty());
        assert_eq!(app.providers.len(), 1);
        assert!(!app.providers[0].is_favorite);
    }

    #[test]
    fn favorite_revert_skips_provider_gone_from_page() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));
        app.toggle_favorite("a");
        app.take_commands();

        // Page replaced before the failure lands.
        app.request_search();
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["b"], 1, 1)));

        app.apply_favorite_result("a", true, Err(ApiError::Network("x".to_string())));
        assert_eq!(app.providers.len(), 1);
        assert_eq!(app.providers[0].id, "b");
    }

    #[test]
    fn rebook_submit_with_missing_address_queues_nothing() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));

        app.handle_key(KeyEvent::from(KeyCode::Char('r')));
        // Drop the prefill-lookup command; what matters is submit.
        app.take_commands();

        let form = app.rebook.as_mut().unwrap();
        form.date = "2099-01-02".to_string();
        form.time = "10:00".to_string();
        form.address.clear();

        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert!(app.take_commands().is_empty());
        let form = app.rebook.as_ref().unwrap();
        assert!(form.field_error.is_some());
        assert!(!form.submitting);
    }

    #[test]
    fn rebook_success_closes_modal_and_refreshes() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));

        app.handle_key(KeyEvent::from(KeyCode::Char('r')));
        app.take_commands();
        let form = app.rebook.as_mut().unwrap();
        form.date = "2099-01-02".to_string();
        form.time = "10:00".to_string();
        form.address = "12 Lake Road".to_string();

        app.handle_key(KeyEvent::from(KeyCode::Enter));
        let commands = app.take_commands();
        assert!(matches!(commands[0], Command::SubmitRebook { .. }));

        app.apply_rebook_result(Ok(()));
        assert!(app.rebook.is_none());
        assert_eq!(app.search_state, SearchState::Loading);
    }

    #[test]
    fn rebook_failure_keeps_modal_with_backend_detail() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));
        app.handle_key(KeyEvent::from(KeyCode::Char('r')));
        app.take_commands();
        let form = app.rebook.as_mut().unwrap();
        form.date = "2099-01-02".to_string();
        form.time = "10:00".to_string();
        form.address = "12 Lake Road".to_string();
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        app.take_commands();

        app.apply_rebook_result(Err(ApiError::Api {
            status: 409,
            message: "Provider is not available at that time".to_string(),
        }));
        assert!(app.rebook.is_some());
        assert!(!app.rebook.as_ref().unwrap().submitting);
        assert_eq!(
            app.notification.as_ref().unwrap().message,
            "Provider is not available at that time"
        );
    }

    #[test]
    fn stale_prefill_for_closed_modal_is_ignored() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));
        app.handle_key(KeyEvent::from(KeyCode::Char('r')));
        app.take_commands();
        app.handle_key(KeyEvent::from(KeyCode::Esc));
        assert!(app.rebook.is_none());

        app.apply_previous_booking("a", Ok(None));
        assert!(app.rebook.is_none());
    }

    #[test]
    fn signed_out_user_cannot_favorite_or_rebook() {
        let mut app = App::new(Config::default(), Session::default());
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));

        app.toggle_favorite("a");
        assert!(!app.providers[0].is_favorite);
        app.handle_key(KeyEvent::from(KeyCode::Char('r')));
        assert!(app.rebook.is_none());
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn profile_overlay_opens_and_closes() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 1, 1)));

        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert!(app.profile_open);
        app.handle_key(KeyEvent::from(KeyCode::Esc));
        assert!(!app.profile_open);

        // No provider selected: nothing to open.
        app.request_search();
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&[], 0, 0)));
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert!(!app.profile_open);
    }

    #[test]
    fn radius_stays_in_slider_bounds() {
        let mut app = app();
        for _ in 0..20 {
            app.handle_key(KeyEvent::from(KeyCode::Char('+')));
        }
        assert_eq!(app.radius_km, RADIUS_MAX_KM);
        for _ in 0..20 {
            app.handle_key(KeyEvent::from(KeyCode::Char('-')));
        }
        assert_eq!(app.radius_km, RADIUS_MIN_KM);
    }

    #[test]
    fn filter_adjustment_resets_page_and_searches() {
        let mut app = app();
        app.set_location(Some(Coordinate::new(28.61, 77.21)));
        let seq = latest_seq(&mut app);
        app.apply_search_result(seq, Ok(response(&["a"], 30, 3)));
        assert!(app.pagination.go_to(3));

        app.view_mode = ViewMode::Filters;
        app.filter_cursor = FilterRow::ALL
            .iter()
            .position(|r| *r == FilterRow::VerifiedOnly)
            .unwrap();
        app.handle_key(KeyEvent::from(KeyCode::Char(' ')));

        assert!(app.filters.verified_only);
        assert_eq!(app.pagination.page, 1);
        assert_eq!(app.search_state, SearchState::Loading);
    }

    #[test]
    fn rating_bounds_cannot_cross() {
        let mut app = app();
        app.view_mode = ViewMode::Filters;
        app.filter_cursor = FilterRow::ALL
            .iter()
            .position(|r| *r == FilterRow::RatingMax)
            .unwrap();
        for _ in 0..20 {
            app.handle_key(KeyEvent::from(KeyCode::Left));
        }
        app.filter_cursor = FilterRow::ALL
            .iter()
            .position(|r| *r == FilterRow::RatingMin)
            .unwrap();
        for _ in 0..20 {
            app.handle_key(KeyEvent::from(KeyCode::Right));
        }
        assert!(app.filters.rating_min <= app.filters.rating_max);
    }

    #[test]
    fn notifications_expire_on_tick() {
        let mut app = app();
        app.notify(Severity::Info, "hello");
        for _ in 0..NOTIFICATION_TICKS {
            app.on_tick();
        }
        assert!(app.notification.is_none());
    }
}
