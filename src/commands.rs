//! Slash-command parsing and execution.
//!
//! Everything that is not a command is chat input. Commands that finish
//! synchronously mutate the [`App`] and return [`CommandResult::Continue`];
//! the image action needs a provider call, so it is handed back to the
//! chat loop as [`CommandResult::GenerateImage`].

use chrono::Local;

use crate::core::app::App;
use crate::core::message::{NoticeKind, TranscriptEntry};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    GenerateImage(String),
    Quit,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match command_name {
        "help" => handle_help(app),
        "role" => handle_role(app, args),
        "roles" => handle_roles(app),
        "image" => CommandResult::GenerateImage(args.to_string()),
        "images" => handle_images(app, args),
        "clear" => {
            app.clear_conversation();
            CommandResult::Continue
        }
        "log" => handle_log(app, args),
        "dump" => handle_dump(app, args),
        "quit" | "exit" => CommandResult::Quit,
        // Unrecognized commands fall through as chat text.
        _ => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

fn handle_help(app: &mut App) -> CommandResult {
    let help = "\
Commands:
  /role <name>      Switch the active role
  /roles            List available roles
  /image <prompt>   Generate an image from a description
  /images [on|off]  Toggle or set image generation
  /clear            Start a fresh conversation
  /log [file]       Enable or pause transcript logging
  /dump [file]      Write the transcript to a text file
  /quit             Exit

Enter sends a message; Up/Down/PageUp/PageDown scroll; Ctrl+C quits.";
    app.post_notice(NoticeKind::Info, help);
    CommandResult::Continue
}

fn handle_role(app: &mut App, args: &str) -> CommandResult {
    if args.is_empty() {
        let current = app.session.role().name.clone();
        app.set_status(format!("Usage: /role <name> — current role: {current}"));
    } else {
        app.change_role(args);
    }
    CommandResult::Continue
}

fn handle_roles(app: &mut App) -> CommandResult {
    let active = app.session.role().name.clone();
    let mut listing = String::from("Available roles:");
    for name in app.registry().names() {
        let marker = if name == active { " (active)" } else { "" };
        listing.push_str(&format!("\n  {name}{marker}"));
    }
    app.post_notice(NoticeKind::Info, listing);
    CommandResult::Continue
}

fn handle_images(app: &mut App, args: &str) -> CommandResult {
    match args {
        "" => app.set_image_generation(None),
        "on" => app.set_image_generation(Some(true)),
        "off" => app.set_image_generation(Some(false)),
        _ => app.set_status("Usage: /images [on|off]"),
    }
    CommandResult::Continue
}

fn handle_log(app: &mut App, args: &str) -> CommandResult {
    let result = if args.is_empty() {
        app.logging.toggle_logging()
    } else {
        app.logging.set_log_file(args.to_string())
    };
    match result {
        Ok(message) => app.set_status(message),
        Err(e) => app.set_status(format!("Log error: {e}")),
    }
    CommandResult::Continue
}

fn handle_dump(app: &mut App, args: &str) -> CommandResult {
    let (filename, explicit) = if args.is_empty() {
        let timestamp = Local::now().format("%Y-%m-%d").to_string();
        (format!("studiolo-log-{timestamp}.txt"), false)
    } else {
        (args.to_string(), true)
    };

    if !explicit && Path::new(&filename).exists() {
        app.set_status(format!("{filename} already exists. Use /dump <filename>"));
        return CommandResult::Continue;
    }

    match dump_transcript(app, &filename) {
        Ok(()) => app.set_status(format!("Transcript written to {filename}")),
        Err(e) => app.set_status(format!("Dump error: {e}")),
    }
    CommandResult::Continue
}

fn dump_transcript(app: &App, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    let role_name = app.session.role().name.clone();
    for entry in app.transcript() {
        match entry {
            TranscriptEntry::Turn(turn) => {
                let prefix = if turn.speaker.is_user() {
                    "You"
                } else {
                    role_name.as_str()
                };
                writeln!(writer, "{prefix}: {}", turn.text)?;
            }
            TranscriptEntry::Notice { text, .. } => {
                writeln!(writer, "[{text}]")?;
            }
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn plain_text_is_chat_input() {
        let mut app = create_test_app();
        match process_input(&mut app, "hello there") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "hello there"),
            _ => panic!("expected chat input"),
        }
    }

    #[test]
    fn unknown_commands_fall_through_as_chat() {
        let mut app = create_test_app();
        assert!(matches!(
            process_input(&mut app, "/frobnicate now"),
            CommandResult::ProcessAsMessage(_)
        ));
    }

    #[test]
    fn role_command_switches_roles() {
        let mut app = create_test_app();
        process_input(&mut app, "/role Dance Coach");
        assert_eq!(app.session.role().name, "Dance Coach");
    }

    #[test]
    fn bare_role_command_reports_current() {
        let mut app = create_test_app();
        process_input(&mut app, "/role");
        assert!(app.status().unwrap().contains("Film Critic"));
    }

    #[test]
    fn roles_command_lists_registry_with_active_marker() {
        let mut app = create_test_app();
        process_input(&mut app, "/roles");
        let listing = match app.transcript().last().unwrap() {
            TranscriptEntry::Notice { text, .. } => text.clone(),
            _ => panic!("expected a notice"),
        };
        assert!(listing.contains("Film Critic (active)"));
        assert!(listing.contains("Dance Coach"));
    }

    #[test]
    fn images_command_sets_and_flips_the_gate() {
        let mut app = create_test_app();
        process_input(&mut app, "/images on");
        assert!(app.session.image_generation_enabled());
        process_input(&mut app, "/images off");
        assert!(!app.session.image_generation_enabled());
        process_input(&mut app, "/images");
        assert!(app.session.image_generation_enabled());
        process_input(&mut app, "/images sideways");
        assert!(app.status().unwrap().contains("Usage"));
    }

    #[test]
    fn image_command_defers_to_the_loop() {
        let mut app = create_test_app();
        match process_input(&mut app, "/image a dreamy sunset") {
            CommandResult::GenerateImage(prompt) => assert_eq!(prompt, "a dreamy sunset"),
            _ => panic!("expected image generation"),
        }
    }

    #[test]
    fn quit_command_exits() {
        let mut app = create_test_app();
        assert!(matches!(process_input(&mut app, "/quit"), CommandResult::Quit));
    }
}
