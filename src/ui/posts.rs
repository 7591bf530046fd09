//! Posts screen rendering
//!
//! Renders whatever the feed coordinator currently holds: a loading view,
//! the error panel, or the (filtered) post list with the offline banner on
//! top when the list came from the cache.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{ErrorKind, Post};

const NETWORK_TIPS: [&str; 3] = [
    "Check if WiFi or mobile data is turned on",
    "Try switching between WiFi and mobile data",
    "Restart your router or device",
];

/// Renders the posts screen for the current feed state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let feed = &app.feed;

    let banner_height = if feed.offline_banner_visible() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Length(1),             // Search
            Constraint::Length(banner_height), // Offline banner
            Constraint::Min(3),                // Content
            Constraint::Length(1),             // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_search(frame, app, chunks[1]);
    if feed.offline_banner_visible() {
        render_offline_banner(frame, chunks[2]);
    }

    if let Some(kind) = feed.error_kind() {
        render_error(frame, kind, feed.error_message(), chunks[3]);
    } else if feed.is_loading() && feed.posts().is_empty() {
        render_loading(frame, chunks[3]);
    } else {
        render_list(frame, app, chunks[3]);
    }

    render_help(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let feed = &app.feed;
    let mut spans = vec![
        Span::styled(
            "Posts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} of {}", feed.visible_posts().len(), feed.posts().len()),
            Style::default().fg(Color::Gray),
        ),
    ];

    if feed.is_refreshing() {
        spans.push(Span::styled(
            "  Refreshing...",
            Style::default().fg(Color::Yellow),
        ));
    } else if feed.is_loading() {
        spans.push(Span::styled("  Loading...", Style::default().fg(Color::Yellow)));
    }

    if let Some(updated) = feed.last_updated() {
        let mins_ago = (Local::now() - updated).num_minutes();
        let freshness = if mins_ago < 1 {
            "  │ Updated: just now".to_string()
        } else if mins_ago < 60 {
            format!("  │ Updated: {}m ago", mins_ago)
        } else {
            format!("  │ Updated: {}", updated.format("%H:%M"))
        };
        spans.push(Span::styled(freshness, Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let query = app.feed.search_query();
    let line = if app.searching {
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Yellow)),
            Span::styled(query.to_string(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ])
    } else if query.is_empty() {
        Line::from(Span::styled(
            "/ Search posts...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::DarkGray)),
            Span::styled(query.to_string(), Style::default().fg(Color::Gray)),
        ])
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_offline_banner(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " ⚠ Offline Mode - Showing cached data ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::styled("  x to dismiss", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading posts...",
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, kind: ErrorKind, message: Option<&str>, area: Rect) {
    let accent = match kind {
        ErrorKind::Network => Color::Yellow,
        ErrorKind::Api => Color::Red,
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            kind.headline(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(kind.advice()),
    ];

    // Only API failures show the underlying message
    if let (ErrorKind::Api, Some(message)) = (kind, message) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("Press "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" to try again"),
    ]));

    if kind == ErrorKind::Network {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tips to fix connection issues:",
            Style::default().fg(Color::DarkGray),
        )));
        for tip in NETWORK_TIPS {
            lines.push(Line::from(Span::styled(
                format!("• {}", tip),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        );
    frame.render_widget(paragraph, area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let visible = app.feed.visible_posts();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if visible.is_empty() {
        let hint = if app.feed.search_query().trim().is_empty() {
            "Press r to refresh"
        } else {
            "Try adjusting your search query"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No posts found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let body_width = area.width.saturating_sub(4) as usize;
    let lines: Vec<Line> = visible
        .iter()
        .skip(app.scroll_offset)
        .flat_map(|post| post_lines(post, body_width))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Title row plus the first line of the body, truncated to `width`
fn post_lines(post: &Post, width: usize) -> [Line<'static>; 2] {
    let title = Line::from(vec![
        Span::styled(format!("#{:<4}", post.id), Style::default().fg(Color::DarkGray)),
        Span::styled(
            post.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let first_line = post.body.lines().next().unwrap_or_default();
    let snippet: String = first_line.chars().take(width.saturating_sub(5)).collect();
    let body = Line::from(Span::styled(
        format!("     {}", snippet),
        Style::default().fg(Color::Gray),
    ));

    [title, body]
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.searching {
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Keep  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Clear search"),
        ])
    } else {
        Line::from(vec![
            Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
            Span::raw(" Scroll  "),
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(" Search  "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" Refresh  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Back  "),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::raw(" Help  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::cache::{CacheManager, PostsCache};
    use crate::data::{FetchError, PostsSource};
    use crate::feed::tests::{post, ScriptedSource};
    use crate::feed::PostsFeed;
    use crate::ui::test_support::render_to_string;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_app(results: Vec<Result<Vec<Post>, FetchError>>) -> (App, PostsCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = PostsCache::new(CacheManager::with_dir(temp_dir.path().to_path_buf()));
        let source = ScriptedSource::new(results, None);
        let feed = PostsFeed::new(Arc::new(source), Some(cache.clone()));
        let mut app = App::new(feed).skip_login();
        app.state = AppState::Posts;
        (app, cache, temp_dir)
    }

    async fn load(app: &mut App) {
        app.open_posts();
        assert!(app.take_fetch_request());
        let result = app.feed.source().get_all_posts().await;
        app.on_fetch_complete(result);
    }

    #[test]
    fn test_loading_view_without_posts() {
        let (mut app, _, _tmp) = test_app(vec![]);
        app.open_posts();

        let content = render_to_string(|f| render(f, &app));

        assert!(content.contains("Loading posts..."));
    }

    #[tokio::test]
    async fn test_fresh_list_renders_posts() {
        let (mut app, _, _tmp) = test_app(vec![Ok(vec![
            post(1, "First title", "first body"),
            post(2, "Second title", "second body"),
        ])]);
        load(&mut app).await;

        let content = render_to_string(|f| render(f, &app));

        assert!(content.contains("First title"));
        assert!(content.contains("second body"));
        assert!(content.contains("2 of 2"));
        assert!(content.contains("Updated: just now"));
        assert!(!content.contains("Offline Mode"));
    }

    #[tokio::test]
    async fn test_cached_fallback_shows_offline_banner() {
        let (mut app, cache, _tmp) = test_app(vec![Err(FetchError::Timeout)]);
        cache.save(&[post(7, "Cached title", "body")]).unwrap();
        load(&mut app).await;

        let content = render_to_string(|f| render(f, &app));

        assert!(content.contains("Offline Mode - Showing cached data"));
        assert!(content.contains("Cached title"));
    }

    #[tokio::test]
    async fn test_network_error_panel_shows_tips() {
        let (mut app, _, _tmp) = test_app(vec![Err(FetchError::NetworkUnreachable)]);
        load(&mut app).await;

        let content = render_to_string(|f| render(f, &app));

        assert!(content.contains("No Internet Connection"));
        assert!(content.contains("to try again"));
        assert!(content.contains("Tips to fix connection issues"));
    }

    #[tokio::test]
    async fn test_api_error_panel_shows_message() {
        let (mut app, _, _tmp) = test_app(vec![Err(FetchError::Api {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        })]);
        load(&mut app).await;

        let content = render_to_string(|f| render(f, &app));

        assert!(content.contains("Oops! Something went wrong"));
        assert!(content.contains("API Error: 503"));
        assert!(!content.contains("Tips to fix"));
    }

    #[tokio::test]
    async fn test_search_without_matches_shows_empty_state() {
        let (mut app, _, _tmp) = test_app(vec![Ok(vec![post(1, "Foo", "bar")])]);
        load(&mut app).await;
        app.feed.set_search_query("zzz");

        let content = render_to_string(|f| render(f, &app));

        assert!(content.contains("No posts found"));
        assert!(content.contains("Try adjusting your search query"));
    }

    #[tokio::test]
    async fn test_scroll_offset_skips_leading_posts() {
        let (mut app, _, _tmp) = test_app(vec![Ok(vec![
            post(1, "Alpha", ""),
            post(2, "Beta", ""),
        ])]);
        load(&mut app).await;
        app.scroll_offset = 1;

        let content = render_to_string(|f| render(f, &app));

        assert!(!content.contains("Alpha"));
        assert!(content.contains("Beta"));
    }
}
