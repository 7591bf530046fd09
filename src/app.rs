//! Application state management for Postboard
//!
//! This module contains the main application state, handling keyboard input
//! and the transitions between the login, dashboard, and posts screens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use crate::auth::{LoginForm, LoginStep, MockOtpVerifier, OtpVerifier, SubmitOutcome};
use crate::dashboard::{all_cards, CardTarget, DashboardCard, DEFAULT_USER_NAME};
use crate::data::{FetchError, Post};
use crate::feed::{FeedStatus, FetchMode, PostsFeed};

/// Application state enum representing the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Mobile number + OTP form
    Login,
    /// Navigation cards
    Dashboard,
    /// Posts list backed by the freshness coordinator
    Posts,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Sign-in form
    pub login: LoginForm,
    /// Name shown on the dashboard
    pub user_name: String,
    /// Index of the selected dashboard card
    pub selected_card: usize,
    /// Posts and their freshness
    pub feed: PostsFeed,
    /// Whether keystrokes on the posts screen edit the search query
    pub searching: bool,
    /// First visible row of the posts list
    pub scroll_offset: usize,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// One-line notice shown in the footer
    pub status_message: Option<String>,
    /// Set when a fetch cycle has begun and its request still needs spawning
    fetch_requested: bool,
    verifier: Box<dyn OtpVerifier>,
}

impl App {
    /// Creates an App starting on the login screen
    pub fn new(feed: PostsFeed) -> Self {
        Self {
            state: AppState::Login,
            login: LoginForm::new(),
            user_name: DEFAULT_USER_NAME.to_string(),
            selected_card: 0,
            feed,
            searching: false,
            scroll_offset: 0,
            show_help: false,
            should_quit: false,
            status_message: None,
            fetch_requested: false,
            verifier: Box::new(MockOtpVerifier),
        }
    }

    /// Replaces the OTP verifier
    pub fn with_verifier(mut self, verifier: Box<dyn OtpVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Starts on the dashboard, as if already signed in
    pub fn skip_login(mut self) -> Self {
        self.state = AppState::Dashboard;
        self
    }

    /// Returns the currently selected dashboard card
    pub fn current_card(&self) -> &'static DashboardCard {
        &all_cards()[self.selected_card % all_cards().len()]
    }

    /// Returns whether a fetch needs spawning, clearing the flag
    pub fn take_fetch_request(&mut self) -> bool {
        std::mem::take(&mut self.fetch_requested)
    }

    /// Feeds a finished fetch back into the coordinator
    pub fn on_fetch_complete(&mut self, result: Result<Vec<Post>, FetchError>) {
        self.feed.complete(result);
        self.clamp_scroll();
    }

    fn request_fetch(&mut self, mode: FetchMode) {
        if self.feed.begin(mode) {
            self.fetch_requested = true;
        }
    }

    /// Opens the posts screen, starting the first load if needed
    pub fn open_posts(&mut self) {
        self.state = AppState::Posts;
        self.scroll_offset = 0;
        if self.feed.status() == FeedStatus::Idle {
            self.feed.hydrate_from_cache();
            self.request_fetch(FetchMode::Initial);
        }
    }

    /// Retry after a failure or while offline, refresh when fresh
    fn reload(&mut self) {
        match self.feed.status() {
            FeedStatus::Error(_) | FeedStatus::CachedOffline => {
                self.request_fetch(FetchMode::Retry)
            }
            FeedStatus::Fresh => self.request_fetch(FetchMode::Refresh),
            FeedStatus::Idle => self.request_fetch(FetchMode::Initial),
            FeedStatus::Loading => {}
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `Ctrl+C`: Quit from anywhere
    /// - `?`: Toggle help (outside text entry)
    /// - Login: digits type, `Backspace` deletes, `Enter` submits,
    ///   `Esc` goes back to the number step or quits
    /// - Dashboard: `Up`/`k`, `Down`/`j` select, `Enter` opens, `q`/`Esc` quit
    /// - Posts: `/` search, `r` refresh/retry, `x` dismiss offline banner,
    ///   `Up`/`k`, `Down`/`j`, `g`, `G` scroll, `Esc` back, `q` quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match self.state {
            AppState::Login => self.handle_login_key(key_event),
            AppState::Dashboard => self.handle_dashboard_key(key_event),
            AppState::Posts if self.searching => self.handle_search_key(key_event),
            AppState::Posts => self.handle_posts_key(key_event),
        }
    }

    fn handle_login_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char(c) if c.is_ascii_digit() => self.login.push_char(c),
            KeyCode::Backspace => self.login.backspace(),
            KeyCode::Enter => {
                if self.login.submit(self.verifier.as_ref()) == SubmitOutcome::SignedIn {
                    info!("Opening dashboard");
                    self.login = LoginForm::new();
                    self.state = AppState::Dashboard;
                }
            }
            KeyCode::Esc => {
                if self.login.step == LoginStep::Otp {
                    self.login.back_to_number();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
            KeyCode::Enter => {
                let card = self.current_card();
                if card.target == CardTarget::Posts {
                    self.status_message = None;
                    self.open_posts();
                } else {
                    self.status_message = Some(format!("{} is not available yet", card.title));
                }
            }
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_posts_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.state = AppState::Dashboard,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('x') => self.feed.dismiss_offline_banner(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Char('g') => self.scroll_offset = 0,
            KeyCode::Char('G') => self.scroll_to_bottom(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc => {
                self.searching = false;
                self.feed.set_search_query("");
                self.scroll_offset = 0;
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => {
                let mut query = self.feed.search_query().to_string();
                query.pop();
                self.feed.set_search_query(query);
                self.scroll_offset = 0;
            }
            KeyCode::Char(c) => {
                let query = format!("{}{}", self.feed.search_query(), c);
                self.feed.set_search_query(query);
                self.scroll_offset = 0;
            }
            _ => {}
        }
    }

    /// Moves the card selection up, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = all_cards().len();
        self.selected_card = (self.selected_card + count - 1) % count;
    }

    /// Moves the card selection down, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        self.selected_card = (self.selected_card + 1) % all_cards().len();
    }

    fn max_scroll(&self) -> usize {
        self.feed.visible_posts().len().saturating_sub(1)
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < self.max_scroll() {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }
}
