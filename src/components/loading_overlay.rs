use leptos::prelude::*;

/// Covers the page until the first chunk of frames has loaded.
#[component]
pub fn LoadingOverlay(#[prop(into)] ready: Signal<bool>) -> impl IntoView {
    move || {
        (!ready.get()).then(|| {
            view! {
                <div class="loading-overlay">
                    <div class="loading-spinner"></div>
                </div>
            }
        })
    }
}
