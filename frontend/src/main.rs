mod api;
mod components;
mod models;
mod state;

use leptos::mount::mount_to_body;
use leptos::prelude::*;

use components::chat::ChatArea;
use components::sidebar::Sidebar;
use state::AppState;

/// Sidebar plus the open thread; the list is fetched once on startup and
/// refreshed after every successful turn.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();
    state.load_conversations();

    view! {
        <div class="app-container">
            <Sidebar />
            <ChatArea />
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    mount_to_body(App);
}
