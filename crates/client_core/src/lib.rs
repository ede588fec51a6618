use std::{future::Future, sync::Arc, time::Duration};

use shared::protocol::{ChatRequest, IndexRequest};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

pub mod error;
pub mod transport;
pub mod types;

pub use error::BackendError;
pub use transport::{BackendApi, HttpBackend};
pub use types::{CommandOutcome, ControllerState, Phase, Session, SkipReason};

use error::{CHAT_FAILED_MESSAGE, INDEX_FAILED_MESSAGE};

pub const INDEXING_STATUS_MESSAGE: &str = "Crawling and indexing website...";

#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Upper bound for a single backend call. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

/// Owns the session and chat state and serializes every backend call.
///
/// At most one request is outstanding at a time: each command checks and
/// sets `busy` under the state lock, releases the lock for the network call,
/// then re-locks to apply the outcome and clear `busy`.
pub struct SessionController {
    backend: Arc<dyn BackendApi>,
    options: ControllerOptions,
    inner: Mutex<ControllerState>,
    snapshots: watch::Sender<ControllerState>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self::with_options(backend, ControllerOptions::default())
    }

    pub fn with_options(backend: Arc<dyn BackendApi>, options: ControllerOptions) -> Self {
        let (snapshots, _) = watch::channel(ControllerState::default());
        Self {
            backend,
            options,
            inner: Mutex::new(ControllerState::default()),
            snapshots,
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> ControllerState {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.snapshots.subscribe()
    }

    pub async fn start_indexing(&self, url: &str) -> CommandOutcome {
        let url = url.trim();
        if url.is_empty() {
            debug!("index: ignoring empty url");
            return CommandOutcome::Skipped(SkipReason::EmptyInput);
        }

        {
            let mut state = self.inner.lock().await;
            if state.busy {
                debug!(%url, "index: ignoring request while busy");
                return CommandOutcome::Skipped(SkipReason::Busy);
            }
            state.busy = true;
            state.clear_session();
            state.show_status(INDEXING_STATUS_MESSAGE);
            self.publish(&state);
        }

        info!(%url, "index: request started");
        let result = self
            .within_deadline(self.backend.index(IndexRequest {
                url: url.to_string(),
            }))
            .await;

        let mut state = self.inner.lock().await;
        let outcome = match result {
            Ok(response) => {
                let session = Session {
                    session_id: response.session_id,
                    pages_crawled: response.pages_crawled,
                    chunks_created: response.chunks_created,
                };
                info!(
                    session_id = %session.session_id,
                    pages_crawled = session.pages_crawled,
                    chunks_created = session.chunks_created,
                    "index: session ready"
                );
                state.show_status(session.summary());
                state.history.clear();
                state.session = Some(session);
                CommandOutcome::Succeeded
            }
            Err(err) => {
                warn!(%url, error = %err, "index: request failed");
                state.clear_session();
                state.show_error(err.user_message(INDEX_FAILED_MESSAGE));
                CommandOutcome::Failed
            }
        };
        state.busy = false;
        self.publish(&state);
        outcome
    }

    pub async fn ask_question(&self, question: &str) -> CommandOutcome {
        let question = question.trim();
        if question.is_empty() {
            debug!("chat: ignoring empty question");
            return CommandOutcome::Skipped(SkipReason::EmptyInput);
        }

        let session_id = {
            let mut state = self.inner.lock().await;
            let Some(session_id) = state.session_id().cloned() else {
                debug!("chat: ignoring question without an indexed session");
                return CommandOutcome::Skipped(SkipReason::NoSession);
            };
            if state.busy {
                debug!(%session_id, "chat: ignoring question while busy");
                return CommandOutcome::Skipped(SkipReason::Busy);
            }
            state.busy = true;
            state.error_message = None;
            self.publish(&state);
            session_id
        };

        info!(%session_id, "chat: request started");
        let result = self
            .within_deadline(self.backend.chat(ChatRequest {
                session_id: session_id.clone(),
                question: question.to_string(),
            }))
            .await;

        let mut state = self.inner.lock().await;
        let outcome = match result {
            Ok(response) => {
                info!(
                    %session_id,
                    turns = response.history.len(),
                    "chat: transcript updated"
                );
                state.history = response.history;
                CommandOutcome::Succeeded
            }
            Err(err) => {
                warn!(%session_id, error = %err, "chat: request failed");
                state.show_error(err.user_message(CHAT_FAILED_MESSAGE));
                CommandOutcome::Failed
            }
        };
        state.busy = false;
        self.publish(&state);
        outcome
    }

    async fn within_deadline<T>(
        &self,
        request: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        match self.options.request_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or_else(|_| Err(BackendError::TimedOut(limit))),
            None => request.await,
        }
    }

    fn publish(&self, state: &ControllerState) {
        self.snapshots.send_replace(state.clone());
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod transport_tests;
