//! Async conversation controller.
//!
//! [`ConversationController`] binds a [`Conversation`] to a [`ChatApi`].
//! It is cheap to clone; clones share the same state, so each operation can
//! run as its own task. The state lock is only held for synchronous
//! transitions, never across a request.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::{ChatApi, ClientError};
use crate::chat::ChatMessage;
use crate::config::Config;
use crate::conversation::{Conversation, LoadOutcome, Outgoing};
use crate::history::HistoryEntry;

/// A history refresh started after a mutating operation.
///
/// Dropping it leaves the refresh running. A failed refresh is logged and
/// never undoes the operation that triggered it.
#[derive(Debug)]
pub struct Resync(JoinHandle<()>);

impl Resync {
    /// Wait until the refresh has finished, successfully or not.
    pub async fn settled(self) {
        let _ = self.0.await;
    }
}

/// Read-only copy of the conversation state for rendering.
#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    pub messages: Vec<ChatMessage>,
    pub draft: String,
    pub histories: Vec<HistoryEntry>,
    pub selected: Option<HistoryEntry>,
}

/// Mediates between user input, the chat backend and rendered state.
#[derive(Clone)]
pub struct ConversationController {
    api: Arc<dyn ChatApi>,
    state: Arc<Mutex<Conversation>>,
}

impl ConversationController {
    /// Create a controller with default policies.
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self::with_state(api, Conversation::new())
    }

    /// Create a controller with policies taken from configuration.
    pub fn with_config(api: Arc<dyn ChatApi>, config: &Config) -> Self {
        Self::with_state(api, Conversation::with_config(config))
    }

    fn with_state(api: Arc<dyn ChatApi>, conversation: Conversation) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(conversation)),
        }
    }

    /// Copy the current state.
    pub fn view(&self) -> ConversationView {
        let state = self.state.lock();
        ConversationView {
            messages: state.messages().to_vec(),
            draft: state.draft().to_string(),
            histories: state.histories().to_vec(),
            selected: state.selected().cloned(),
        }
    }

    /// Run `f` with shared access to the state.
    pub fn read<R>(&self, f: impl FnOnce(&Conversation) -> R) -> R {
        f(&self.state.lock())
    }

    /// Replace the draft.
    pub fn set_draft(&self, draft: impl Into<String>) {
        self.state.lock().set_draft(draft);
    }

    /// Fetch the history listing and replace the local one.
    pub async fn refresh_histories(&self) -> Result<(), ClientError> {
        let ticket = self.state.lock().begin_refresh();
        let list = self.api.list_histories().await?;
        let count = list.histories.as_ref().map_or(0, Vec::len);
        if self.state.lock().apply_histories(ticket, list) {
            debug!(count, "History listing refreshed");
        }
        Ok(())
    }

    /// Load a stored history into the thread and select it.
    pub async fn load_history(&self, entry: HistoryEntry) -> Result<(), ClientError> {
        let ticket = self.state.lock().begin_load();
        let content = self.api.fetch_history(&entry).await?;
        let outcome = self.state.lock().apply_history(ticket, entry.clone(), &content);
        match outcome {
            LoadOutcome::Replaced => debug!(history = %entry, "History loaded"),
            LoadOutcome::SelectedOnly => debug!(history = %entry, "History has no content"),
            LoadOutcome::Discarded => {}
        }
        Ok(())
    }

    /// Take the current draft and append it optimistically.
    ///
    /// Returns `None` when the draft is blank. Pass the result to
    /// [`deliver`](Self::deliver) to complete the send.
    pub fn submit_draft(&self) -> Option<Outgoing> {
        self.state.lock().submit_draft()
    }

    /// Send `text` and append the reply.
    ///
    /// Blank text is ignored and yields `Ok(None)`.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<Option<Resync>, ClientError> {
        let Some(outgoing) = self.state.lock().begin_send(text) else {
            return Ok(None);
        };
        self.deliver(outgoing).await.map(Some)
    }

    /// Send an optimistically appended message and reconcile the reply.
    ///
    /// On failure the user message stays in the thread and no reply is added.
    pub async fn deliver(&self, outgoing: Outgoing) -> Result<Resync, ClientError> {
        let reply = self.api.send_chat(outgoing.text()).await?;
        if reply.reply.as_deref().map_or(true, str::is_empty) {
            warn!("Chat response carried no reply");
        }
        self.state.lock().apply_reply(outgoing, reply);
        Ok(self.spawn_resync())
    }

    /// Start a new server-side chat and reset the local conversation.
    ///
    /// Failures are logged and leave the state unchanged.
    pub async fn start_new_chat(&self) -> Option<Resync> {
        match self.api.new_chat().await {
            Ok(body) => {
                info!(response = %body, "New chat started");
                self.state.lock().apply_new_chat();
                Some(self.spawn_resync())
            }
            Err(e) => {
                error!(error = %e, "Error creating new chat");
                None
            }
        }
    }

    /// Delete a stored history.
    ///
    /// Clears the thread when the deleted history is the selected one.
    pub async fn delete_history(&self, entry: HistoryEntry) -> Result<Resync, ClientError> {
        self.api.delete_history(&entry).await?;
        let resync = self.spawn_resync();
        self.state.lock().apply_delete(&entry);
        Ok(resync)
    }

    fn spawn_resync(&self) -> Resync {
        let controller = self.clone();
        Resync(tokio::spawn(async move {
            if let Err(e) = controller.refresh_histories().await {
                warn!(error = %e, "History refresh failed");
            }
        }))
    }
}

impl std::fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationController")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
