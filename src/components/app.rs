use leptos::prelude::*;
use crate::components::frame_scroll::FrameScroll;
use crate::components::loading_overlay::LoadingOverlay;
use crate::host::page_config::load_config;
use crate::state::AppState;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new(load_config());
    provide_context(state);

    let ready = Signal::derive(move || state.snapshot.with(|s| s.ready));

    view! {
        <div class="app">
            <FrameScroll />
            <LoadingOverlay ready=ready />
        </div>
    }
}
