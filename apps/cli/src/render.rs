//! Terminal rendering of controller snapshots.

use std::io::{self, Write};

use client_core::ControllerState;
use shared::domain::{ChatMessage, Role};

#[derive(Debug, Default)]
pub struct Renderer {
    shown: Vec<ChatMessage>,
}

impl Renderer {
    /// Called once per completed command. The notice line is printed every
    /// time so a repeated error still shows; transcript turns are printed once.
    ///
    /// History is owned by the backend, so when the new transcript does not
    /// extend what is already on screen the whole transcript is printed again.
    pub fn render(&mut self, state: &ControllerState, out: &mut impl Write) -> io::Result<()> {
        match (&state.error_message, &state.status_message) {
            (Some(error), _) => writeln!(out, "error: {error}")?,
            (None, Some(status)) => writeln!(out, "{status}")?,
            (None, None) => {}
        }

        let fresh = if state.history.starts_with(&self.shown) {
            &state.history[self.shown.len()..]
        } else {
            if !state.history.is_empty() {
                writeln!(out, "-- conversation --")?;
            }
            &state.history[..]
        };
        for message in fresh {
            writeln!(out, "{}: {}", speaker(message.role), message.content)?;
        }
        self.shown = state.history.clone();

        out.flush()
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

#[cfg(test)]
mod tests {
    use client_core::Session;
    use shared::domain::SessionId;

    use super::*;

    fn indexed_state(history: Vec<ChatMessage>) -> ControllerState {
        ControllerState {
            session: Some(Session {
                session_id: SessionId::from("s1"),
                pages_crawled: 5,
                chunks_created: 42,
            }),
            history,
            status_message: Some("Indexed 5 page(s) and created 42 chunk(s).".into()),
            ..ControllerState::default()
        }
    }

    fn render(renderer: &mut Renderer, state: &ControllerState) -> String {
        let mut out = Vec::new();
        renderer.render(state, &mut out).expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn prints_only_new_turns() {
        let mut renderer = Renderer::default();
        let first = indexed_state(vec![]);
        assert_eq!(
            render(&mut renderer, &first),
            "Indexed 5 page(s) and created 42 chunk(s).\n"
        );

        let second = indexed_state(vec![
            ChatMessage::user("What is this site about?"),
            ChatMessage::assistant("It is a demo site."),
        ]);
        assert_eq!(
            render(&mut renderer, &second),
            "Indexed 5 page(s) and created 42 chunk(s).\n\
             You: What is this site about?\nAssistant: It is a demo site.\n"
        );

        assert_eq!(
            render(&mut renderer, &second),
            "Indexed 5 page(s) and created 42 chunk(s).\n"
        );
    }

    #[test]
    fn reprints_transcript_when_backend_rewrites_it() {
        let mut renderer = Renderer::default();
        render(
            &mut renderer,
            &indexed_state(vec![ChatMessage::user("a"), ChatMessage::assistant("b")]),
        );

        let output = render(
            &mut renderer,
            &indexed_state(vec![ChatMessage::user("c"), ChatMessage::assistant("d")]),
        );

        assert_eq!(
            output,
            "Indexed 5 page(s) and created 42 chunk(s).\n\
             -- conversation --\nYou: c\nAssistant: d\n"
        );
    }

    #[test]
    fn error_takes_the_notice_line() {
        let mut renderer = Renderer::default();
        let state = ControllerState {
            error_message: Some("invalid url".into()),
            ..ControllerState::default()
        };

        assert_eq!(render(&mut renderer, &state), "error: invalid url\n");
    }

    #[test]
    fn repeated_error_is_printed_after_each_command() {
        let mut renderer = Renderer::default();
        let failed = ControllerState {
            error_message: Some("Failed to get answer.".into()),
            ..indexed_state(vec![])
        };

        let first = render(&mut renderer, &failed);
        let second = render(&mut renderer, &failed);

        assert_eq!(first, "error: Failed to get answer.\n");
        assert_eq!(second, "error: Failed to get answer.\n");
    }
}
