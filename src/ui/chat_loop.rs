//! Main chat event loop.
//!
//! One action at a time: each provider call is awaited in place, with a
//! busy frame drawn first, so the interface is never re-entrant during a
//! request. Slash commands dispatch through [`crate::commands`].

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::commands::{process_input, CommandResult};
use crate::core::app::App;
use crate::core::message::NoticeKind;
use crate::provider::ProviderAdapter;
use crate::ui::renderer::{max_scroll_offset, ui};
use crate::utils::images::realize_image;

pub struct ChatLoopConfig {
    /// Client reused for fetching URL-variant image results.
    pub client: reqwest::Client,
    pub image_dir: PathBuf,
}

pub async fn run_chat(
    mut app: App,
    adapter: Box<dyn ProviderAdapter>,
    config: ChatLoopConfig,
) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, adapter.as_ref(), &config).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        event::DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    adapter: &dyn ProviderAdapter,
    config: &ChatLoopConfig,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if app.exit_requested {
            return Ok(());
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(());
                }
                KeyCode::Enter => {
                    let input = std::mem::take(&mut app.input);
                    if input.trim().is_empty() {
                        app.input = input;
                        continue;
                    }
                    app.clear_status();

                    match process_input(app, &input) {
                        CommandResult::Continue => {}
                        CommandResult::Quit => app.exit_requested = true,
                        CommandResult::ProcessAsMessage(text) => {
                            run_send(terminal, app, adapter, &text).await?;
                        }
                        CommandResult::GenerateImage(prompt) => {
                            run_generate_image(terminal, app, adapter, config, &prompt).await?;
                        }
                    }
                    app.auto_scroll = true;
                }
                KeyCode::Char(c) => {
                    app.input.push(c);
                }
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::Esc => {
                    app.input.clear();
                }
                KeyCode::Up => scroll_by(terminal, app, -1),
                KeyCode::Down => scroll_by(terminal, app, 1),
                KeyCode::PageUp => scroll_by(terminal, app, -10),
                KeyCode::PageDown => scroll_by(terminal, app, 10),
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => scroll_by(terminal, app, -3),
                MouseEventKind::ScrollDown => scroll_by(terminal, app, 3),
                _ => {}
            },
            _ => {}
        }
    }
}

/// Draw the busy frame, then block on the chat call.
async fn run_send(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    adapter: &dyn ProviderAdapter,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    app.set_busy("Thinking…");
    terminal.draw(|f| ui(f, app))?;

    app.send_message(adapter, text).await;

    app.clear_busy();
    Ok(())
}

/// Draw the busy frame, block on the image call, then realize the result
/// on disk. The URL variant is fetched; the bytes variant is written as-is.
async fn run_generate_image(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    adapter: &dyn ProviderAdapter,
    config: &ChatLoopConfig,
    prompt: &str,
) -> Result<(), Box<dyn Error>> {
    app.set_busy("Generating image…");
    terminal.draw(|f| ui(f, app))?;

    if let Some(result) = app.generate_image(adapter, prompt).await {
        match realize_image(&config.client, result, &config.image_dir).await {
            Ok(path) => {
                app.post_notice(
                    NoticeKind::Info,
                    format!("Image saved to {}", path.display()),
                );
            }
            Err(e) => {
                app.post_notice(NoticeKind::Error, format!("Could not save image: {e}"));
            }
        }
    }

    app.clear_busy();
    Ok(())
}

fn scroll_by(
    terminal: &Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    delta: i32,
) {
    let terminal_height = terminal.size().map(|s| s.height).unwrap_or_default();
    let max_offset = max_scroll_offset(app, terminal_height);

    // Leaving auto-scroll starts from the bottom of the transcript.
    if app.auto_scroll {
        app.scroll_offset = max_offset;
    }

    app.scroll_offset = if delta < 0 {
        app.scroll_offset.saturating_sub(delta.unsigned_abs() as u16)
    } else {
        app.scroll_offset
            .saturating_add(delta as u16)
            .min(max_offset)
    };

    app.auto_scroll = app.scroll_offset >= max_offset;
}
