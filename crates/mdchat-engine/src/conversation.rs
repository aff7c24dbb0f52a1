//! Conversation state and its transitions.
//!
//! [`Conversation`] holds everything the UI renders: the thread, the draft,
//! the history listing and the selected history. Every change goes through a
//! synchronous transition. Operations that talk to the backend are split in a
//! `begin_*` half, run before the request, and an `apply_*` half, run with
//! the response.

use tracing::debug;

use crate::api::{ChatReply, HistoryContent, HistoryList};
use crate::chat::ChatMessage;
use crate::config::{Config, StaleResponsePolicy};
use crate::history::{messages_from_content, HistoryEntry};

/// Identifies one request issued for a UI slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues tickets for a slot and remembers the latest one.
#[derive(Debug, Clone, Default)]
struct Slot {
    latest: u64,
}

impl Slot {
    fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// A message that has been appended optimistically and awaits its reply.
#[derive(Debug, Clone)]
pub struct Outgoing {
    text: String,
    id: u64,
}

impl Outgoing {
    /// The text to send, exactly as typed.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What [`Conversation::apply_history`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The thread was replaced with the stored blocks.
    Replaced,
    /// No content; only the selection moved.
    SelectedOnly,
    /// A newer load was issued; the response was dropped.
    Discarded,
}

/// Client-side conversation state.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    /// Send id of each message still waiting for its reply, index-aligned
    /// with `messages`.
    awaiting: Vec<Option<u64>>,
    next_send: u64,
    draft: String,
    histories: Vec<HistoryEntry>,
    selected: Option<HistoryEntry>,
    policy: StaleResponsePolicy,
    clear_selection_on_delete: bool,
    listing: Slot,
    loading: Slot,
}

impl Conversation {
    /// Create empty state with the default policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty state with policies taken from configuration.
    pub fn with_config(config: &Config) -> Self {
        Self {
            policy: config.stale_responses,
            clear_selection_on_delete: config.clear_selection_on_delete,
            ..Self::default()
        }
    }

    /// The thread, in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The unsent draft.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The most recently fetched history listing.
    pub fn histories(&self) -> &[HistoryEntry] {
        &self.histories
    }

    /// The history currently displayed, if any.
    pub fn selected(&self) -> Option<&HistoryEntry> {
        self.selected.as_ref()
    }

    /// Whether `entry` is the selected history.
    pub fn is_selected(&self, entry: &HistoryEntry) -> bool {
        self.selected.as_ref() == Some(entry)
    }

    /// The last assistant message in the thread.
    pub fn last_assistant_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| !m.is_user())
    }

    /// Replace the draft.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    // === Listing ===

    /// Start a history listing request.
    pub fn begin_refresh(&mut self) -> Ticket {
        self.listing.issue()
    }

    /// Replace the listing wholesale. Returns `false` when the response was
    /// dropped as stale.
    pub fn apply_histories(&mut self, ticket: Ticket, list: HistoryList) -> bool {
        if self.is_stale(&self.listing, ticket) {
            debug!(?ticket, "Dropping stale history listing");
            return false;
        }
        self.histories = list.into_entries();
        true
    }

    // === Loading ===

    /// Start loading a stored history.
    pub fn begin_load(&mut self) -> Ticket {
        self.loading.issue()
    }

    /// Show a loaded history.
    ///
    /// Non-empty content replaces the thread; the selection moves to `entry`
    /// even when there is no content.
    pub fn apply_history(
        &mut self,
        ticket: Ticket,
        entry: HistoryEntry,
        content: &HistoryContent,
    ) -> LoadOutcome {
        if self.is_stale(&self.loading, ticket) {
            debug!(?ticket, history = %entry, "Dropping stale history load");
            return LoadOutcome::Discarded;
        }

        let outcome = match content.non_empty() {
            Some(text) => {
                self.replace_thread(messages_from_content(text));
                LoadOutcome::Replaced
            }
            None => LoadOutcome::SelectedOnly,
        };
        self.selected = Some(entry);
        outcome
    }

    // === Sending ===

    /// Take the draft and append it as a user message.
    pub fn submit_draft(&mut self) -> Option<Outgoing> {
        let text = self.draft.clone();
        self.begin_send(text)
    }

    /// Append `text` as a user message and clear the draft.
    ///
    /// Returns `None`, leaving state untouched, when `text` is blank.
    pub fn begin_send(&mut self, text: impl Into<String>) -> Option<Outgoing> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }

        self.next_send += 1;
        let id = self.next_send;
        self.messages.push(ChatMessage::user(text.clone()));
        self.awaiting.push(Some(id));
        self.draft.clear();

        Some(Outgoing { text, id })
    }

    /// Complete a send with the backend reply.
    ///
    /// The reply goes right after its own user message, so messages sent
    /// while it was in flight keep their place. If the thread was replaced
    /// in the meantime, the exchange is appended to the current thread.
    pub fn apply_reply(&mut self, outgoing: Outgoing, reply: ChatReply) {
        let reply = ChatMessage::from_reply(reply.reply);
        match self.awaiting.iter().position(|a| *a == Some(outgoing.id)) {
            Some(idx) => {
                self.awaiting[idx] = None;
                self.messages.insert(idx + 1, reply);
                self.awaiting.insert(idx + 1, None);
            }
            None => {
                debug!("Thread replaced while waiting for reply");
                self.messages.push(ChatMessage::user(outgoing.text));
                self.messages.push(reply);
                self.awaiting.extend([None, None]);
            }
        }
    }

    // === Session management ===

    /// Reset to an empty, unselected conversation.
    pub fn apply_new_chat(&mut self) {
        self.replace_thread(Vec::new());
        self.selected = None;
    }

    /// Reflect the deletion of `entry`.
    ///
    /// If it is the selected history the thread is cleared. The selection
    /// itself is only cleared when configured to.
    pub fn apply_delete(&mut self, entry: &HistoryEntry) {
        if self.is_selected(entry) {
            self.replace_thread(Vec::new());
            if self.clear_selection_on_delete {
                self.selected = None;
            }
        }
    }

    fn replace_thread(&mut self, messages: Vec<ChatMessage>) {
        self.awaiting = vec![None; messages.len()];
        self.messages = messages;
    }

    fn is_stale(&self, slot: &Slot, ticket: Ticket) -> bool {
        self.policy == StaleResponsePolicy::LatestRequest && !slot.is_latest(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Role, REPLY_FALLBACK};

    fn content(text: &str) -> HistoryContent {
        HistoryContent {
            content: Some(text.to_string()),
        }
    }

    fn latest_request() -> Conversation {
        Conversation::with_config(&Config {
            stale_responses: StaleResponsePolicy::LatestRequest,
            ..Config::default()
        })
    }

    #[test]
    fn test_new_conversation_is_empty() {
        let conv = Conversation::new();
        assert!(conv.messages().is_empty());
        assert!(conv.draft().is_empty());
        assert!(conv.histories().is_empty());
        assert!(conv.selected().is_none());
    }

    #[test]
    fn test_blank_send_is_noop() {
        let mut conv = Conversation::new();
        conv.set_draft("   ");

        assert!(conv.begin_send("").is_none());
        assert!(conv.begin_send("   ").is_none());
        assert!(conv.submit_draft().is_none());

        assert!(conv.messages().is_empty());
        assert_eq!(conv.draft(), "   ");
    }

    #[test]
    fn test_send_appends_user_then_assistant() {
        let mut conv = Conversation::new();
        conv.set_draft(" hello ");

        let outgoing = conv.submit_draft().unwrap();
        assert_eq!(outgoing.text(), " hello ");
        assert!(conv.draft().is_empty());
        assert_eq!(conv.messages(), &[ChatMessage::user(" hello ")]);

        conv.apply_reply(outgoing, ChatReply::text("hi!"));
        assert_eq!(
            conv.messages(),
            &[ChatMessage::user(" hello "), ChatMessage::assistant("hi!")]
        );
    }

    #[test]
    fn test_reply_without_text_uses_fallback() {
        let mut conv = Conversation::new();
        let outgoing = conv.begin_send("ping").unwrap();
        conv.apply_reply(outgoing, ChatReply::default());

        let last = conv.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text, REPLY_FALLBACK);
    }

    #[test]
    fn test_reply_after_reload_appends_exchange() {
        let mut conv = Conversation::new();
        let outgoing = conv.begin_send("question").unwrap();

        // A history load resolves while the reply is pending.
        let ticket = conv.begin_load();
        conv.apply_history(ticket, "old.md".into(), &content("X\n---\nY"));
        assert_eq!(conv.messages().len(), 2);

        conv.apply_reply(outgoing, ChatReply::text("answer"));
        assert_eq!(
            conv.messages(),
            &[
                ChatMessage::assistant("X"),
                ChatMessage::assistant("Y"),
                ChatMessage::user("question"),
                ChatMessage::assistant("answer")
            ]
        );
    }

    #[test]
    fn test_overlapping_sends_keep_every_message() {
        let mut conv = Conversation::new();
        let first = conv.begin_send("A").unwrap();
        let second = conv.begin_send("B").unwrap();

        conv.apply_reply(first, ChatReply::text("replyA"));
        assert_eq!(
            conv.messages(),
            &[
                ChatMessage::user("A"),
                ChatMessage::assistant("replyA"),
                ChatMessage::user("B")
            ]
        );

        conv.apply_reply(second, ChatReply::text("replyB"));
        assert_eq!(
            conv.messages(),
            &[
                ChatMessage::user("A"),
                ChatMessage::assistant("replyA"),
                ChatMessage::user("B"),
                ChatMessage::assistant("replyB")
            ]
        );
    }

    #[test]
    fn test_replies_in_reverse_order_pair_with_their_messages() {
        let mut conv = Conversation::new();
        let first = conv.begin_send("A").unwrap();
        let second = conv.begin_send("B").unwrap();

        conv.apply_reply(second, ChatReply::text("replyB"));
        conv.apply_reply(first, ChatReply::text("replyA"));

        assert_eq!(
            conv.messages(),
            &[
                ChatMessage::user("A"),
                ChatMessage::assistant("replyA"),
                ChatMessage::user("B"),
                ChatMessage::assistant("replyB")
            ]
        );
    }

    #[test]
    fn test_same_text_sent_twice_pairs_by_send() {
        let mut conv = Conversation::new();
        let first = conv.begin_send("again").unwrap();
        let second = conv.begin_send("again").unwrap();

        conv.apply_reply(second, ChatReply::text("2"));
        conv.apply_reply(first, ChatReply::text("1"));

        let texts: Vec<&str> = conv.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["again", "1", "again", "2"]);
    }

    #[test]
    fn test_load_replaces_thread_and_selects() {
        let mut conv = Conversation::new();
        conv.begin_send("existing");

        let ticket = conv.begin_load();
        let outcome = conv.apply_history(ticket, "f.md".into(), &content("A\n---\nB"));

        assert_eq!(outcome, LoadOutcome::Replaced);
        assert_eq!(
            conv.messages(),
            &[ChatMessage::assistant("A"), ChatMessage::assistant("B")]
        );
        assert_eq!(conv.selected(), Some(&HistoryEntry::new("f.md")));
    }

    #[test]
    fn test_load_without_content_only_selects() {
        let mut conv = Conversation::new();
        conv.begin_send("kept");

        let ticket = conv.begin_load();
        let outcome = conv.apply_history(ticket, "empty.md".into(), &HistoryContent::default());

        assert_eq!(outcome, LoadOutcome::SelectedOnly);
        assert_eq!(conv.messages(), &[ChatMessage::user("kept")]);
        assert_eq!(conv.selected(), Some(&HistoryEntry::new("empty.md")));
    }

    #[test]
    fn test_last_resolved_wins_by_default() {
        let mut conv = Conversation::new();
        let first = conv.begin_load();
        let second = conv.begin_load();

        conv.apply_history(second, "f2.md".into(), &content("two"));
        let outcome = conv.apply_history(first, "f1.md".into(), &content("one"));

        assert_eq!(outcome, LoadOutcome::Replaced);
        assert_eq!(conv.selected(), Some(&HistoryEntry::new("f1.md")));
        assert_eq!(conv.messages(), &[ChatMessage::assistant("one")]);
    }

    #[test]
    fn test_latest_request_discards_stale_load() {
        let mut conv = latest_request();
        let first = conv.begin_load();
        let second = conv.begin_load();

        conv.apply_history(second, "f2.md".into(), &content("two"));
        let outcome = conv.apply_history(first, "f1.md".into(), &content("one"));

        assert_eq!(outcome, LoadOutcome::Discarded);
        assert_eq!(conv.selected(), Some(&HistoryEntry::new("f2.md")));
        assert_eq!(conv.messages(), &[ChatMessage::assistant("two")]);
    }

    #[test]
    fn test_latest_request_discards_stale_listing() {
        let mut conv = latest_request();
        let first = conv.begin_refresh();
        let second = conv.begin_refresh();

        assert!(conv.apply_histories(second, HistoryList::new(["new.md"])));
        assert!(!conv.apply_histories(first, HistoryList::new(["old.md"])));
        assert_eq!(conv.histories(), &[HistoryEntry::new("new.md")]);
    }

    #[test]
    fn test_listing_replaced_wholesale() {
        let mut conv = Conversation::new();
        let ticket = conv.begin_refresh();
        conv.apply_histories(ticket, HistoryList::new(["a.md", "b.md"]));
        let ticket = conv.begin_refresh();
        conv.apply_histories(ticket, HistoryList::default());
        assert!(conv.histories().is_empty());
    }

    #[test]
    fn test_new_chat_resets_thread_and_selection() {
        let mut conv = Conversation::new();
        let ticket = conv.begin_load();
        conv.apply_history(ticket, "f.md".into(), &content("A"));

        conv.apply_new_chat();
        assert!(conv.messages().is_empty());
        assert!(conv.selected().is_none());
    }

    #[test]
    fn test_delete_selected_keeps_selection() {
        let mut conv = Conversation::new();
        let ticket = conv.begin_load();
        conv.apply_history(ticket, "f.md".into(), &content("A"));

        conv.apply_delete(&HistoryEntry::new("f.md"));
        assert!(conv.messages().is_empty());
        assert_eq!(conv.selected(), Some(&HistoryEntry::new("f.md")));
    }

    #[test]
    fn test_delete_selected_can_clear_selection() {
        let mut conv = Conversation::with_config(&Config {
            clear_selection_on_delete: true,
            ..Config::default()
        });
        let ticket = conv.begin_load();
        conv.apply_history(ticket, "f.md".into(), &content("A"));

        conv.apply_delete(&HistoryEntry::new("f.md"));
        assert!(conv.messages().is_empty());
        assert!(conv.selected().is_none());
    }

    #[test]
    fn test_delete_other_entry_keeps_thread() {
        let mut conv = Conversation::new();
        let ticket = conv.begin_load();
        conv.apply_history(ticket, "f.md".into(), &content("A"));

        conv.apply_delete(&HistoryEntry::new("other.md"));
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn test_last_assistant_message() {
        let mut conv = Conversation::new();
        assert!(conv.last_assistant_message().is_none());

        let outgoing = conv.begin_send("q").unwrap();
        conv.apply_reply(outgoing, ChatReply::text("a"));
        conv.begin_send("q2");

        assert_eq!(conv.last_assistant_message().unwrap().text, "a");
    }
}
