use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::models::{Conversation, Message};

/// Messages of the open conversation plus at most one optimistic user
/// message that the server has not confirmed yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Thread {
    messages: Vec<Message>,
    pending: Option<Message>,
}

impl Thread {
    pub fn loaded(messages: Vec<Message>) -> Self {
        Self { messages, pending: None }
    }

    /// Confirmed messages followed by the pending one, if any.
    pub fn visible(&self) -> Vec<Message> {
        self.messages.iter().chain(self.pending.iter()).cloned().collect()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Shows `text` immediately as a user message. Returns `false` while
    /// another turn is still in flight.
    pub fn begin(&mut self, text: String, temp_id: String, created_at: String) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Message {
            id: temp_id,
            conversation_id: String::new(),
            role: "user".to_string(),
            content: text,
            created_at,
        });
        true
    }

    /// Keeps the pending message `temp_id` and appends the server's reply.
    /// Returns `false` if that message is no longer pending, e.g. the user
    /// opened another conversation while the turn was in flight.
    pub fn confirm(
        &mut self,
        temp_id: &str,
        conversation_id: &str,
        reply: String,
        reply_id: String,
        created_at: String,
    ) -> bool {
        if !self.is_pending_for(temp_id) {
            return false;
        }
        let Some(mut user) = self.pending.take() else {
            return false;
        };
        user.conversation_id = conversation_id.to_string();
        self.messages.push(user);
        self.messages.push(Message {
            id: reply_id,
            conversation_id: conversation_id.to_string(),
            role: "assistant".to_string(),
            content: reply,
            created_at,
        });
        true
    }

    /// Drops the pending message `temp_id` after a failed request.
    pub fn rollback(&mut self, temp_id: &str) -> Option<Message> {
        if self.is_pending_for(temp_id) { self.pending.take() } else { None }
    }

    fn is_pending_for(&self, temp_id: &str) -> bool {
        self.pending.as_ref().is_some_and(|m| m.id == temp_id)
    }
}

/// Shortened text of a conversation's latest message for the sidebar.
pub fn preview(conversation: &Conversation, max_chars: usize) -> Option<String> {
    let last = conversation.messages.first()?;
    let mut chars = last.content.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    Some(if chars.next().is_some() { format!("{head}…") } else { head })
}

/// Shared application state, provided via Leptos context. Every field is a
/// signal handle, so the whole struct is `Copy`.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub conversations: ReadSignal<Vec<Conversation>>,
    pub active_conversation: ReadSignal<Option<String>>,
    pub thread: ReadSignal<Thread>,
    pub error: ReadSignal<Option<String>>,

    // --- Write signals (for mutating state) ---
    pub set_conversations: WriteSignal<Vec<Conversation>>,
    pub set_active_conversation: WriteSignal<Option<String>>,
    pub set_thread: WriteSignal<Thread>,
    pub set_error: WriteSignal<Option<String>>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (conversations, set_conversations) = signal(Vec::<Conversation>::new());
        let (active_conversation, set_active_conversation) = signal(None::<String>);
        let (thread, set_thread) = signal(Thread::default());
        let (error, set_error) = signal(None::<String>);

        let state = Self {
            conversations,
            active_conversation,
            thread,
            error,
            set_conversations,
            set_active_conversation,
            set_thread,
            set_error,
        };

        provide_context(state);
        state
    }

    /// Load conversations from the backend.
    pub fn load_conversations(&self) {
        let state = *self;
        spawn_local(async move {
            match api::fetch_conversations().await {
                Ok(convos) => state.set_conversations.set(convos),
                Err(e) => {
                    log::error!("Failed to fetch conversations: {e}");
                    state.set_error.set(Some(e));
                }
            }
        });
    }

    /// Select a conversation and load its messages.
    pub fn select_conversation(&self, id: String) {
        let state = *self;
        self.set_active_conversation.set(Some(id.clone()));
        // drops any pending turn so its late reply cannot land here
        self.set_thread.set(Thread::default());
        self.set_error.set(None);

        spawn_local(async move {
            let result = api::fetch_conversation(&id).await;
            // a later click has already replaced the view
            if state.active_conversation.get_untracked().as_deref() != Some(id.as_str()) {
                return;
            }
            match result {
                Ok(conv) => state.set_thread.set(Thread::loaded(conv.messages)),
                Err(e) => {
                    log::error!("Failed to fetch conversation {id}: {e}");
                    state.set_error.set(Some(e));
                }
            }
        });
    }

    /// Clears the view so the next message starts a new conversation.
    pub fn new_chat(&self) {
        self.set_active_conversation.set(None);
        self.set_thread.set(Thread::default());
        self.set_error.set(None);
    }

    /// Sends a message, showing it right away and rolling it back if the
    /// request fails.
    pub fn send_message(&self, text: String) {
        let state = *self;
        let conv_id = self.active_conversation.get_untracked();

        let temp_id = format!("temp-{}", js_sys::Date::now() as u64);
        let mut started = false;
        self.set_thread.update(|t| {
            started = t.begin(text.clone(), temp_id.clone(), now_iso());
        });
        if !started {
            return;
        }
        self.set_error.set(None);

        spawn_local(async move {
            match api::send_chat(&text, conv_id.as_deref()).await {
                Ok(resp) => {
                    let mut confirmed = false;
                    state.set_thread.update(|t| {
                        confirmed = t.confirm(
                            &temp_id,
                            &resp.conversation_id,
                            resp.message,
                            format!("reply-{}", js_sys::Date::now() as u64),
                            now_iso(),
                        );
                    });
                    // Only adopt the conversation if its thread is still on screen
                    if confirmed {
                        state.set_active_conversation.set(Some(resp.conversation_id));
                    }
                    // Refresh list to pick up new titles and ordering
                    state.load_conversations();
                }
                Err(e) => {
                    log::error!("Failed to send message: {e}");
                    let mut rolled_back = false;
                    state.set_thread.update(|t| {
                        rolled_back = t.rollback(&temp_id).is_some();
                    });
                    if rolled_back {
                        state.set_error.set(Some(e));
                    }
                }
            }
        });
    }

    pub fn delete_conversation(&self, id: String) {
        let state = *self;
        spawn_local(async move {
            match api::delete_conversation(&id).await {
                Ok(()) => {
                    state.set_conversations.update(|convs| convs.retain(|c| c.id != id));
                    if state.active_conversation.get_untracked().as_deref() == Some(id.as_str()) {
                        state.new_chat();
                    }
                }
                Err(e) => {
                    log::error!("Failed to delete conversation {id}: {e}");
                    state.set_error.set(Some(e));
                }
            }
        });
    }
}

fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}
