//! Sign-in screen rendering
//!
//! Shows the mobile number field and, once a code has been requested, the
//! OTP field. Validation errors render under the form.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::app::App;
use crate::auth::{LoginStep, MOBILE_NUMBER_LEN, OTP_LEN};

/// Renders the sign-in screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = centered_rect(48, 18, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Mobile number
            Constraint::Length(3), // OTP
            Constraint::Length(2), // Error
            Constraint::Min(1),    // Hints
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Welcome Back",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Sign in with your mobile number",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let form = &app.login;
    let on_number = form.step == LoginStep::MobileNumber;

    render_field(
        frame,
        chunks[1],
        "Mobile Number",
        &form.mobile_number,
        MOBILE_NUMBER_LEN,
        on_number,
        !on_number,
    );

    if !on_number {
        render_field(frame, chunks[2], "OTP", &form.otp, OTP_LEN, true, false);
    }

    if let Some(ref error) = form.error {
        let error_line = Paragraph::new(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(error_line, chunks[3]);
    }

    let hint = if on_number {
        "Enter: Send OTP   Esc/q: Quit   ?: Help"
    } else {
        "OTP sent. Enter: Sign in   Esc: Change number"
    };
    let hints = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center);
    frame.render_widget(hints, chunks[4]);
}

/// Renders a bordered input with placeholder underscores for missing digits
fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    max_len: usize,
    active: bool,
    confirmed: bool,
) {
    let border_color = if active { Color::Cyan } else { Color::DarkGray };
    let title = if confirmed {
        format!(" {} ✓ ", label)
    } else {
        format!(" {} ", label)
    };

    let remaining = max_len.saturating_sub(value.len());
    let mut spans = vec![Span::styled(value.to_string(), Style::default().fg(Color::White))];
    if active {
        spans.push(Span::styled(
            "_".repeat(remaining),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let field = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    frame.render_widget(field, area);
}
