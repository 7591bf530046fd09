//! Postboard - browse posts from a REST API with an offline cache
//!
//! A terminal UI application with a mock OTP sign-in, a dashboard, and a
//! posts list that falls back to the last saved snapshot when offline.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, TimeZone};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use postboard::app::{App, AppState};
use postboard::cache::{CacheManager, PostsCache};
use postboard::cli::{Cli, RunMode, StartupConfig};
use postboard::data::PostsClient;
use postboard::feed::{FeedStatus, PostsFeed};
use postboard::notifications::{self, PushCapability, PushMessage};
use postboard::refresh::FetchWorker;
use postboard::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Sends tracing output to `path`, since the TUI owns stdout
fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("postboard=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.state {
        AppState::Login => ui::render_login(frame, app),
        AppState::Dashboard => ui::render_dashboard(frame, app),
        AppState::Posts => ui::render_posts(frame, app),
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Runs a single fetch cycle and prints the outcome
async fn run_list(feed: &mut PostsFeed, cache: Option<&PostsCache>) -> bool {
    feed.mount().await;

    match feed.status() {
        FeedStatus::Fresh => println!("Fetched {} posts", feed.posts().len()),
        FeedStatus::CachedOffline => {
            println!("Offline Mode - Showing cached data");
            let saved_at = cache
                .and_then(PostsCache::cache_timestamp)
                .and_then(|ms| Local.timestamp_millis_opt(ms).single());
            if let Some(saved_at) = saved_at {
                println!("Cached at {}", saved_at.format("%Y-%m-%d %H:%M"));
            }
        }
        FeedStatus::Error(kind) => {
            eprintln!("{}", kind.headline());
            if let Some(message) = feed.error_message() {
                eprintln!("{}", message);
            }
            return false;
        }
        FeedStatus::Idle | FeedStatus::Loading => return false,
    }

    for post in feed.posts() {
        println!("#{:<4} {}", post.id, post.title);
    }
    true
}

async fn run_tui(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut worker = FetchWorker::new();

    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        if app.take_fetch_request() {
            worker.spawn(app.feed.source());
        }
        while let Some(message) = worker.try_recv() {
            app.on_fetch_complete(message.result);
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

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let store = config
        .cache_dir
        .clone()
        .map(CacheManager::with_dir)
        .or_else(CacheManager::new);

    let log_file = config
        .log_file
        .clone()
        .or_else(|| store.as_ref().map(|s| s.dir().join("postboard.log")));
    if let Some(ref path) = log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("Warning: logging disabled ({})", e);
        }
    }
    info!(base_url = %config.base_url, mode = ?config.mode, "Starting postboard");

    let cache = store.clone().map(PostsCache::new);
    if cache.is_none() {
        warn!("No cache directory available, offline fallback disabled");
    }

    if config.mode == RunMode::ClearCache {
        match cache {
            Some(ref cache) => {
                cache.clear();
                println!("Cache cleared");
            }
            None => println!("No cache directory to clear"),
        }
        return Ok(());
    }

    let hub = notifications::init(store);
    hub.on_message(Arc::new(|message: &PushMessage| {
        info!(title = ?message.title, "Push message received");
    }));

    let mut client = PostsClient::new(config.base_url.clone(), config.timeout)?;
    if let Some(ref cache) = cache {
        client = client.with_cache(cache.clone());
    }
    let mut feed = PostsFeed::new(Arc::new(client), cache.clone());

    let outcome = match config.mode {
        RunMode::List => {
            let ok = run_list(&mut feed, cache.as_ref()).await;
            notifications::teardown();
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        _ => {
            let app = App::new(feed);
            let app = if config.skip_login { app.skip_login() } else { app };
            let result = run_tui(app).await;
            notifications::teardown();
            result
        }
    };

    info!("Exiting");
    outcome
}
