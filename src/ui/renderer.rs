//! Frame rendering: transcript, status line, input box.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::app::App;
use crate::core::message::{NoticeKind, TranscriptEntry};

pub fn build_display_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    for entry in app.transcript() {
        match entry {
            TranscriptEntry::Turn(turn) if turn.speaker.is_user() => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(turn.text.as_str(), Style::default().fg(Color::Cyan)),
                ]));
                lines.push(Line::from(""));
            }
            TranscriptEntry::Turn(turn) => {
                // Assistant replies are labeled with the active role's name.
                lines.push(Line::from(Span::styled(
                    format!("{}:", app.session.role().name),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )));
                for content_line in turn.text.lines() {
                    if content_line.trim().is_empty() {
                        lines.push(Line::from(""));
                    } else {
                        lines.push(Line::from(Span::styled(
                            content_line,
                            Style::default().fg(Color::White),
                        )));
                    }
                }
                lines.push(Line::from(""));
            }
            TranscriptEntry::Notice { kind, text } => {
                let style = match kind {
                    NoticeKind::Info => Style::default().fg(Color::DarkGray),
                    NoticeKind::Error => Style::default().fg(Color::Red),
                };
                for content_line in text.lines() {
                    lines.push(Line::from(Span::styled(content_line, style)));
                }
                lines.push(Line::from(""));
            }
        }
    }

    lines
}

/// Transcript rows above the fold for the given terminal height. The title
/// row, status row, and input box are fixed overhead.
pub fn available_transcript_height(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(3).saturating_sub(1).saturating_sub(1)
}

pub fn max_scroll_offset(app: &App, terminal_height: u16) -> u16 {
    let total_lines = build_display_lines(app).len() as u16;
    let available = available_transcript_height(terminal_height);
    total_lines.saturating_sub(available)
}

fn title_line(app: &App) -> String {
    let gate = if app.session.image_generation_enabled() {
        " · images on"
    } else {
        ""
    };
    format!("Studiolo — {}{gate}", app.session.role().name)
}

fn status_line(app: &App) -> Line<'_> {
    if let Some(busy) = app.busy() {
        Line::from(Span::styled(
            busy,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(status) = app.status() {
        Line::from(Span::styled(status, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from("")
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let lines = build_display_lines(app);
    let total_lines = lines.len() as u16;
    let available_height = chunks[0].height.saturating_sub(1);
    let max_offset = total_lines.saturating_sub(available_height);

    let scroll_offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .block(Block::default().title(title_line(app)))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[0]);

    f.render_widget(Paragraph::new(status_line(app)), chunks[1]);

    let input_style = if app.busy().is_some() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let input_title = if app.busy().is_some() {
        "Waiting for the provider…"
    } else {
        "Type a message or /help (Enter to send, Ctrl+C to quit)"
    };

    let input = Paragraph::new(app.input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });
    f.render_widget(input, chunks[2]);

    if app.busy().is_none() {
        f.set_cursor_position((
            chunks[2].x + app.input.width() as u16 + 1,
            chunks[2].y + 1,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{create_test_app, ScriptedProvider};

    #[tokio::test]
    async fn turns_render_with_speaker_prefixes() {
        let mut app = create_test_app();
        let provider = ScriptedProvider::with_chat_replies(vec!["A bold choice."]);
        app.send_message(&provider, "Review my film").await;

        let lines = build_display_lines(&app);
        assert_eq!(lines[0].spans[0].content, "You: ");
        assert_eq!(lines[0].spans[1].content, "Review my film");
        assert_eq!(lines[2].spans[0].content, "Film Critic:");
        assert_eq!(lines[3].spans[0].content, "A bold choice.");
    }

    #[test]
    fn error_notices_render_in_error_style() {
        let mut app = create_test_app();
        app.post_notice(NoticeKind::Error, "API error (500): boom");

        let lines = build_display_lines(&app);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn scroll_offset_caps_at_content() {
        let app = create_test_app();
        assert_eq!(max_scroll_offset(&app, 24), 0);
    }

    #[test]
    fn transcript_height_accounts_for_fixed_rows() {
        assert_eq!(available_transcript_height(24), 19);
        assert_eq!(available_transcript_height(4), 0);
    }
}
