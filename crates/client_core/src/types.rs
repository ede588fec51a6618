use std::fmt;

use shared::domain::{ChatMessage, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: SessionId,
    pub pages_crawled: u64,
    pub chunks_created: u64,
}

impl Session {
    pub fn summary(&self) -> String {
        format!(
            "Indexed {} page(s) and created {} chunk(s).",
            self.pages_crawled, self.chunks_created
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Indexing,
    Indexed,
    Asking,
}

impl Phase {
    pub fn derive(has_session: bool, busy: bool) -> Self {
        match (busy, has_session) {
            (true, false) => Self::Indexing,
            (true, true) => Self::Asking,
            (false, true) => Self::Indexed,
            (false, false) => Self::Idle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Indexing => "indexing",
            Self::Indexed => "indexed",
            Self::Asking => "asking",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of everything the presentation layer may render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub session: Option<Session>,
    pub history: Vec<ChatMessage>,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    pub busy: bool,
}

impl ControllerState {
    pub fn phase(&self) -> Phase {
        Phase::derive(self.session.is_some(), self.busy)
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(|session| &session.session_id)
    }

    pub(crate) fn show_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.error_message = None;
    }

    pub(crate) fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status_message = None;
    }

    pub(crate) fn clear_session(&mut self) {
        self.session = None;
        self.history.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyInput,
    NoSession,
    Busy,
}

/// What a command did. Failures are already folded into state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Skipped(SkipReason),
    Succeeded,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_is_derived_from_session_and_busy() {
        assert_eq!(Phase::derive(false, false), Phase::Idle);
        assert_eq!(Phase::derive(false, true), Phase::Indexing);
        assert_eq!(Phase::derive(true, true), Phase::Asking);
        assert_eq!(Phase::derive(true, false), Phase::Indexed);
    }

    #[test]
    fn status_and_error_replace_each_other() {
        let mut state = ControllerState::default();
        state.show_status("working");
        state.show_error("broken");
        assert_eq!(state.status_message, None);
        assert_eq!(state.error_message.as_deref(), Some("broken"));

        state.show_status("fine again");
        assert_eq!(state.error_message, None);
        assert_eq!(state.status_message.as_deref(), Some("fine again"));
    }

    #[test]
    fn summary_mentions_counts() {
        let session = Session {
            session_id: SessionId::from("s1"),
            pages_crawled: 5,
            chunks_created: 42,
        };
        assert_eq!(
            session.summary(),
            "Indexed 5 page(s) and created 42 chunk(s)."
        );
    }
}
