//! Session state
//!
//! One interactive run owns exactly one `Session`: the selected role, the
//! image-generation gate, and the append-only conversation history. The
//! interaction loop is the single writer; nothing here is shared across
//! sessions.

use crate::core::message::{Speaker, Turn};
use crate::core::roles::Role;

pub struct Session {
    role: Role,
    image_generation_enabled: bool,
    history: Vec<Turn>,
}

impl Session {
    pub fn new(role: Role, image_generation_enabled: bool) -> Self {
        Self {
            role,
            image_generation_enabled,
            history: Vec::new(),
        }
    }

    /// Append a turn. Appended turns are visible to every subsequent chat
    /// request, in append order, for the life of the session. There is no
    /// truncation or eviction.
    pub fn append_turn(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.history.push(Turn::new(speaker, text));
    }

    /// Switch the active role. History is untouched; the new role's system
    /// prompt applies from the next chat request onward.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn set_image_generation_enabled(&mut self, enabled: bool) {
        self.image_generation_enabled = enabled;
    }

    pub fn image_generation_enabled(&self) -> bool {
        self.image_generation_enabled
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Drop the accumulated history (the `/clear` command). The role and
    /// image gate survive.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Speaker;

    fn test_role(name: &str) -> Role {
        Role {
            name: name.to_string(),
            system_prompt: format!("You are {name}."),
        }
    }

    #[test]
    fn turns_accumulate_in_append_order() {
        let mut session = Session::new(test_role("Critic"), false);
        session.append_turn(Speaker::User, "one");
        session.append_turn(Speaker::Assistant, "two");
        session.append_turn(Speaker::User, "three");

        let history = session.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].text, "one");
        assert_eq!(history[1].text, "two");
        assert_eq!(history[2].text, "three");
        assert!(history[0].speaker.is_user());
        assert!(history[1].speaker.is_assistant());
    }

    #[test]
    fn role_change_leaves_history_untouched() {
        let mut session = Session::new(test_role("Critic"), false);
        session.append_turn(Speaker::User, "hello");
        session.append_turn(Speaker::Assistant, "hi");

        let before: Vec<(Speaker, String)> = session
            .history()
            .iter()
            .map(|t| (t.speaker, t.text.clone()))
            .collect();

        session.set_role(test_role("Mentor"));

        let after: Vec<(Speaker, String)> = session
            .history()
            .iter()
            .map(|t| (t.speaker, t.text.clone()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(session.role().name, "Mentor");
    }

    #[test]
    fn clear_keeps_role_and_gate() {
        let mut session = Session::new(test_role("Critic"), true);
        session.append_turn(Speaker::User, "hello");
        session.clear_history();

        assert!(session.history().is_empty());
        assert_eq!(session.role().name, "Critic");
        assert!(session.image_generation_enabled());
    }
}
