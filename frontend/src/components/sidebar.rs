use leptos::ev;
use leptos::prelude::*;

use crate::state::{preview, AppState};

const PREVIEW_CHARS: usize = 40;

/// Sidebar showing conversation list and "New Chat" button.
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_new = move |_| state.new_chat();

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"Gemini Chat"</h2>
                <button class="new-chat-btn" on:click=on_new>
                    "+ New Chat"
                </button>
            </div>
            <div class="conversation-list">
                {move || {
                    let convos = state.conversations.get();
                    if convos.is_empty() {
                        view! {
                            <div class="empty-list">"No conversations yet"</div>
                        }.into_any()
                    } else {
                        view! {
                            <For
                                each=move || state.conversations.get()
                                key=|c| (c.id.clone(), c.updated_at.clone())
                                let:conv
                            >
                                {
                                    let id = conv.id.clone();
                                    let title = conv.title.clone()
                                        .unwrap_or_else(|| "New conversation".to_string());
                                    let last = preview(&conv, PREVIEW_CHARS).unwrap_or_default();
                                    let date: String = conv.created_at.chars().take(10).collect();
                                    let id_click = id.clone();
                                    let id_active = id.clone();
                                    let id_delete = id.clone();
                                    view! {
                                        <div
                                            class="conversation-item"
                                            class:active=move || {
                                                state.active_conversation.get().as_deref() == Some(id_active.as_str())
                                            }
                                            on:click=move |_| {
                                                state.select_conversation(id_click.clone());
                                            }
                                        >
                                            <div class="conversation-text">
                                                <div class="conversation-title">{title}</div>
                                                <div class="conversation-preview">{last}</div>
                                                <div class="conversation-date">{date}</div>
                                            </div>
                                            <button
                                                class="delete-btn"
                                                title="Delete conversation"
                                                on:click=move |ev: ev::MouseEvent| {
                                                    ev.stop_propagation();
                                                    state.delete_conversation(id_delete.clone());
                                                }
                                            >
                                                "✕"
                                            </button>
                                        </div>
                                    }
                                }
                            </For>
                        }.into_any()
                    }
                }}
            </div>
        </aside>
    }
}
