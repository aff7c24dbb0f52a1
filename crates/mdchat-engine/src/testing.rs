//! Scripted [`ChatApi`] for tests.
//!
//! [`ScriptedApi`] serves canned responses, records every call and can hold
//! individual requests back until a test releases them.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::api::{ChatApi, ChatReply, ClientError, HistoryContent, HistoryList};
use crate::history::HistoryEntry;

/// A call received by [`ScriptedApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListHistories,
    FetchHistory(String),
    SendChat(String),
    NewChat,
    DeleteHistory(String),
}

#[derive(Default)]
struct Script {
    histories: Vec<HistoryEntry>,
    contents: HashMap<String, String>,
    replies: VecDeque<Option<String>>,
    fail_list: bool,
    fail_chat: bool,
    fail_new_chat: bool,
    history_gates: HashMap<String, oneshot::Receiver<()>>,
    chat_gate: Option<oneshot::Receiver<()>>,
    next_chat_id: u32,
}

/// In-memory chat backend with scripted behaviour.
///
/// Unscripted chat messages are answered with `echo: <message>`.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
    calls: Mutex<Vec<ApiCall>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history listing.
    #[must_use]
    pub fn with_histories<I, S>(mut self, filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<HistoryEntry>,
    {
        self.script.get_mut().histories = filenames.into_iter().map(Into::into).collect();
        self
    }

    /// Serve `content` for `filename`.
    #[must_use]
    pub fn with_content(mut self, filename: &str, content: &str) -> Self {
        self.script
            .get_mut()
            .contents
            .insert(filename.to_string(), content.to_string());
        self
    }

    /// Queue a chat reply.
    #[must_use]
    pub fn with_reply(mut self, reply: &str) -> Self {
        self.script.get_mut().replies.push_back(Some(reply.to_string()));
        self
    }

    /// Queue a chat response without a `reply` field.
    #[must_use]
    pub fn with_missing_reply(mut self) -> Self {
        self.script.get_mut().replies.push_back(None);
        self
    }

    /// Fail every history listing.
    #[must_use]
    pub fn failing_list(mut self) -> Self {
        self.script.get_mut().fail_list = true;
        self
    }

    /// Fail every chat message.
    #[must_use]
    pub fn failing_chat(mut self) -> Self {
        self.script.get_mut().fail_chat = true;
        self
    }

    /// Fail every new chat request.
    #[must_use]
    pub fn failing_new_chat(mut self) -> Self {
        self.script.get_mut().fail_new_chat = true;
        self
    }

    /// Hold the next fetch of `filename` until the returned sender fires.
    pub fn gate_history(&self, filename: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script
            .lock()
            .history_gates
            .insert(filename.to_string(), rx);
        tx
    }

    /// Hold the next chat message until the returned sender fires.
    pub fn gate_chat(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().chat_gate = Some(rx);
        tx
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Yield until `call` has been received.
    pub async fn wait_for_call(&self, call: &ApiCall) {
        while !self.calls.lock().contains(call) {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().push(call);
    }

    fn unavailable(endpoint: &str) -> ClientError {
        ClientError::Status {
            endpoint: endpoint.to_string(),
            status: 503,
            body: "Service Unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ChatApi for ScriptedApi {
    async fn list_histories(&self) -> Result<HistoryList, ClientError> {
        self.record(ApiCall::ListHistories);
        let script = self.script.lock();
        if script.fail_list {
            return Err(Self::unavailable("GET /history"));
        }
        Ok(HistoryList {
            histories: Some(script.histories.clone()),
        })
    }

    async fn fetch_history(&self, entry: &HistoryEntry) -> Result<HistoryContent, ClientError> {
        self.record(ApiCall::FetchHistory(entry.filename().to_string()));
        let gate = self.script.lock().history_gates.remove(entry.filename());
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(HistoryContent {
            content: self.script.lock().contents.get(entry.filename()).cloned(),
        })
    }

    async fn send_chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        self.record(ApiCall::SendChat(message.to_string()));
        let gate = self.script.lock().chat_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut script = self.script.lock();
        if script.fail_chat {
            return Err(Self::unavailable("POST /chat"));
        }
        let reply = script
            .replies
            .pop_front()
            .unwrap_or_else(|| Some(format!("echo: {message}")));
        Ok(ChatReply { reply })
    }

    async fn new_chat(&self) -> Result<Value, ClientError> {
        self.record(ApiCall::NewChat);
        let mut script = self.script.lock();
        if script.fail_new_chat {
            return Err(Self::unavailable("POST /new_chat"));
        }
        script.next_chat_id += 1;
        let filename = format!("chat_history_{}.md", script.next_chat_id);
        script.histories.push(HistoryEntry::new(filename.clone()));
        Ok(json!({ "chat_id": script.next_chat_id, "filename": filename }))
    }

    async fn delete_history(&self, entry: &HistoryEntry) -> Result<(), ClientError> {
        self.record(ApiCall::DeleteHistory(entry.filename().to_string()));
        let mut script = self.script.lock();
        script.histories.retain(|h| h != entry);
        script.contents.remove(entry.filename());
        Ok(())
    }
}
