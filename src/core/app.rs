//! Application state and the four user actions.
//!
//! `App` owns the session (role, image gate, history), the rendered
//! transcript, and the small amount of UI state the renderer needs. The
//! chat loop calls into here for every action; each action runs to
//! completion before the next is accepted. Provider failures become
//! transcript error notices and the session continues.

use tracing::debug;

use crate::core::message::{NoticeKind, Speaker, TranscriptEntry, Turn};
use crate::core::roles::RoleRegistry;
use crate::core::session::Session;
use crate::provider::{ImageResult, ProviderAdapter};
use crate::utils::logging::LoggingState;

pub struct App {
    pub session: Session,
    registry: RoleRegistry,
    transcript: Vec<TranscriptEntry>,
    pub logging: LoggingState,
    /// Transient one-line status shown under the transcript.
    status: Option<String>,
    /// Label shown while a provider call is in flight ("Thinking…").
    busy: Option<String>,
    /// Current contents of the input box.
    pub input: String,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub exit_requested: bool,
}

impl App {
    pub fn new(registry: RoleRegistry, session: Session, logging: LoggingState) -> Self {
        Self {
            session,
            registry,
            transcript: Vec::new(),
            logging,
            status: None,
            busy: None,
            input: String::new(),
            scroll_offset: 0,
            auto_scroll: true,
            exit_requested: false,
        }
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn busy(&self) -> Option<&str> {
        self.busy.as_deref()
    }

    pub fn set_busy(&mut self, label: impl Into<String>) {
        self.busy = Some(label.into());
    }

    pub fn clear_busy(&mut self) {
        self.busy = None;
    }

    fn append_turn(&mut self, speaker: Speaker, text: &str) {
        self.session.append_turn(speaker, text);
        self.transcript.push(TranscriptEntry::Turn(Turn::new(speaker, text)));

        let prefix = match speaker {
            Speaker::User => "You".to_string(),
            Speaker::Assistant => self.session.role().name.clone(),
        };
        if let Err(e) = self.logging.log_message(&format!("{prefix}: {text}")) {
            self.set_status(format!("Log error: {e}"));
        }
    }

    pub fn post_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        self.transcript.push(match kind {
            NoticeKind::Info => TranscriptEntry::info(text),
            NoticeKind::Error => TranscriptEntry::error(text),
        });
    }

    /// Action 1: send a chat message. Blank input is a silent no-op. The
    /// user's turn stays appended even when the provider call fails; no
    /// assistant turn is appended for a failed attempt.
    pub async fn send_message(&mut self, adapter: &dyn ProviderAdapter, input: &str) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }

        self.append_turn(Speaker::User, text);

        let system_prompt = self.session.role().system_prompt.clone();
        debug!(role = %self.session.role().name, turns = self.session.history().len(), "send message");

        match adapter.complete_chat(&system_prompt, self.session.history()).await {
            Ok(reply) => {
                self.append_turn(Speaker::Assistant, &reply);
                self.clear_status();
            }
            Err(e) => {
                self.post_notice(NoticeKind::Error, e.to_string());
            }
        }
    }

    /// Action 2: generate an image. Returns the provider's result for the
    /// rendering boundary to realize (write bytes, or fetch the URL first).
    pub async fn generate_image(
        &mut self,
        adapter: &dyn ProviderAdapter,
        prompt: &str,
    ) -> Option<ImageResult> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.set_status("Usage: /image <description>");
            return None;
        }
        if !self.session.image_generation_enabled() {
            self.set_status("Image generation is disabled. Enable it with /images on");
            return None;
        }

        debug!(prompt_len = prompt.len(), "generate image");
        match adapter.generate_image(prompt).await {
            Ok(result) => Some(result),
            Err(e) => {
                self.post_notice(NoticeKind::Error, e.to_string());
                None
            }
        }
    }

    /// Action 3: switch the active role. History is never rewritten; the
    /// new prompt applies from the next chat request.
    pub fn change_role(&mut self, name: &str) {
        match self.registry.lookup(name) {
            Ok(role) => {
                let role = role.clone();
                self.set_status(format!("Role: {}", role.name));
                self.session.set_role(role);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Action 4: gate for the image action. `None` flips the current state.
    pub fn set_image_generation(&mut self, enabled: Option<bool>) {
        let enabled = enabled.unwrap_or(!self.session.image_generation_enabled());
        self.session.set_image_generation_enabled(enabled);
        self.set_status(if enabled {
            "Image generation enabled"
        } else {
            "Image generation disabled"
        });
    }

    /// Start a fresh conversation in the same session (`/clear`).
    pub fn clear_conversation(&mut self) {
        self.session.clear_history();
        self.transcript.clear();
        self.set_status("Conversation cleared");
    }
}
