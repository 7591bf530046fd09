//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with keyboard shortcuts.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let overlay_area = centered_rect(52, 22, frame.area());

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Sign in"),
        help_line("0-9", "Type number or code"),
        help_line("Enter", "Send code / Sign in"),
        help_line("Esc", "Back to number"),
        Line::from(""),
        section("Navigation"),
        help_line("↑/k, ↓/j", "Move selection / Scroll"),
        help_line("Enter", "Open card"),
        help_line("Esc", "Go back"),
        help_line("q", "Quit application"),
        Line::from(""),
        section("Posts"),
        help_line("/", "Search posts"),
        help_line("r", "Refresh / Try again"),
        help_line("x", "Dismiss offline banner"),
        help_line("?", "Toggle this help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, overlay_area);
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

/// Creates a help line with key and description
fn help_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
        Span::raw(description.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_support::render_to_string;

    #[test]
    fn test_help_overlay_renders() {
        let content = render_to_string(render);

        assert!(content.contains("Help"), "Should render help title");
        assert!(content.contains("Navigation"), "Should show navigation section");
        assert!(content.contains("Dismiss offline banner"));
    }
}
