//! Interactive loop: reads intents from stdin and renders controller state.

use std::{
    future::Future,
    io::{self, Write},
};

use anyhow::Result;
use client_core::{CommandOutcome, ControllerState, SessionController, SkipReason};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use tracing::debug;

use crate::render::Renderer;

const HELP: &str = "\
/index <url>   crawl and index a website (replaces the current session)
/help          show this help
/quit          exit
anything else  ask a question about the indexed site";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Index(String),
    Ask(String),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Ask(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));
    match name {
        "index" => Input::Index(rest.trim().to_string()),
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

pub async fn run(controller: SessionController, initial_url: Option<String>) -> Result<()> {
    let mut renderer = Renderer::default();
    let mut stdout = io::stdout();
    let mut snapshots = controller.subscribe();

    println!("{HELP}");
    if let Some(url) = initial_url {
        with_busy_indicator(&mut snapshots, controller.start_indexing(&url), &mut stdout).await?;
        renderer.render(&controller.snapshot(), &mut stdout)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&controller.snapshot(), &mut stdout)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Unknown(name) => {
                println!("unknown command '/{name}', try /help");
                continue;
            }
            Input::Index(url) => {
                with_busy_indicator(&mut snapshots, controller.start_indexing(&url), &mut stdout)
                    .await?
            }
            Input::Ask(question) => {
                with_busy_indicator(
                    &mut snapshots,
                    controller.ask_question(&question),
                    &mut stdout,
                )
                .await?
            }
        };

        match outcome {
            CommandOutcome::Skipped(SkipReason::EmptyInput) => println!("usage: /index <url>"),
            CommandOutcome::Skipped(SkipReason::NoSession) => println!("Index a website first."),
            CommandOutcome::Skipped(SkipReason::Busy) => println!("Still working, please wait."),
            CommandOutcome::Succeeded | CommandOutcome::Failed => {}
        }
        renderer.render(&controller.snapshot(), &mut stdout)?;
    }

    Ok(())
}

fn prompt(state: &ControllerState, out: &mut impl Write) -> io::Result<()> {
    write!(out, "[{}]> ", state.phase())?;
    out.flush()
}

/// Drives `command` to completion on the calling task, printing `Working...`
/// once if the controller reports a request in flight. Output stays ordered
/// with the prompt because nothing else writes while the command runs.
async fn with_busy_indicator(
    snapshots: &mut watch::Receiver<ControllerState>,
    command: impl Future<Output = CommandOutcome>,
    out: &mut impl Write,
) -> io::Result<CommandOutcome> {
    tokio::pin!(command);
    snapshots.mark_unchanged();
    let mut announced = false;

    loop {
        tokio::select! {
            biased;
            outcome = &mut command => return Ok(outcome),
            changed = snapshots.changed(), if !announced => {
                if changed.is_err() {
                    return Ok(command.await);
                }
                let (phase, busy) = {
                    let state = snapshots.borrow_and_update();
                    (state.phase(), state.busy)
                };
                if busy {
                    debug!(%phase, "request in flight");
                    writeln!(out, "Working...")?;
                    out.flush()?;
                    announced = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn indicator_prints_before_command_returns() {
        let (tx, mut rx) = watch::channel(ControllerState::default());
        let command = async {
            tx.send_replace(ControllerState {
                busy: true,
                ..ControllerState::default()
            });
            tokio::task::yield_now().await;
            tx.send_replace(ControllerState::default());
            CommandOutcome::Failed
        };
        let mut out = Vec::new();

        let outcome = with_busy_indicator(&mut rx, command, &mut out)
            .await
            .expect("drive");

        assert_eq!(outcome, CommandOutcome::Failed);
        assert_eq!(String::from_utf8(out).expect("utf8"), "Working...\n");
    }

    #[tokio::test]
    async fn skipped_command_prints_nothing() {
        let (_tx, mut rx) = watch::channel(ControllerState::default());
        let mut out = Vec::new();

        let outcome = with_busy_indicator(
            &mut rx,
            async { CommandOutcome::Skipped(SkipReason::NoSession) },
            &mut out,
        )
        .await
        .expect("drive");

        assert_eq!(outcome, CommandOutcome::Skipped(SkipReason::NoSession));
        assert!(out.is_empty());
    }

    #[test]
    fn plain_lines_are_questions() {
        assert_eq!(
            parse_input("  What is this site about? "),
            Input::Ask("What is this site about?".into())
        );
        assert_eq!(parse_input("   "), Input::Empty);
    }

    #[test]
    fn slash_commands_are_recognised() {
        assert_eq!(
            parse_input("/index   https://example.com "),
            Input::Index("https://example.com".into())
        );
        assert_eq!(parse_input("/index"), Input::Index(String::new()));
        assert_eq!(parse_input("/help"), Input::Help);
        assert_eq!(parse_input("/exit"), Input::Quit);
        assert_eq!(parse_input("/theme dark"), Input::Unknown("theme".into()));
    }
}
