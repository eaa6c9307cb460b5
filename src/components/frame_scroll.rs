use std::cell::RefCell;
use std::rc::Rc;

use framescroll_core::{CaptionPlacement, Scheduler, ScrollAnimationOrchestrator};
use leptos::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::canvas::frame_surface::CanvasSurface;
use crate::host::{BrowserNavigator, BrowserScheduler, ImageFrameSource, WindowViewport};
use crate::state::AppState;

type WebPlayer = ScrollAnimationOrchestrator<WindowViewport, ImageFrameSource, CanvasSurface>;

thread_local! {
    // Holds JS handles, so it cannot live in a Send signal.
    static PLAYER: RefCell<Option<Rc<WebPlayer>>> = RefCell::new(None);
}

fn mount_player(state: AppState, canvas: HtmlCanvasElement) {
    let Some(window) = web_sys::window() else {
        log::error!("No window object");
        return;
    };
    let Some(surface) = CanvasSurface::new(canvas) else {
        log::error!("Canvas has no 2d context");
        return;
    };
    let config = state.config.get_value();
    let source = ImageFrameSource::new(&config);
    let viewport = WindowViewport::new(window.clone());
    let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler::new(window));

    let player = WebPlayer::mount(config, viewport, source, surface, scheduler);
    let snapshot = state.snapshot;
    player.set_observer(move |snap| snapshot.set(snap.clone()));

    let previous = PLAYER.with(|p| p.borrow_mut().replace(player));
    if let Some(previous) = previous {
        previous.teardown();
    }
}

fn teardown_player() {
    let player = PLAYER.with(|p| p.borrow_mut().take());
    if let Some(player) = player {
        player.teardown();
    }
}

fn learn_more() {
    let player = PLAYER.with(|p| p.borrow().clone());
    if let Some(player) = player {
        player.learn_more(&BrowserNavigator);
    }
}

fn caption_transform(placement: CaptionPlacement) -> String {
    match placement {
        CaptionPlacement::Parked => "translate(-50%, -150%)".to_string(),
        CaptionPlacement::Sliding { offset_vh } => {
            format!("translate(-50%, calc(-50% + {offset_vh}vh))")
        }
    }
}

#[component]
pub fn FrameScroll() -> impl IntoView {
    let state = expect_context::<AppState>();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let video_ref = NodeRef::<leptos::html::Video>::new();
    let snapshot = state.snapshot;

    let (video_path, video_caption, label) = state.config.with_value(|c| {
        (c.video_path.clone(), c.video_caption.clone(), c.learn_more_label.clone())
    });
    let button_label = label.clone();

    let transitioning = Memo::new(move |_| snapshot.with(|s| !s.mode.is_stable()));
    let frame_visible = Memo::new(move |_| snapshot.with(|s| s.frame_visible));
    let video_visible = Memo::new(move |_| snapshot.with(|s| s.video_visible));
    let video_shown = Memo::new(move |_| snapshot.with(|s| s.video_authoritative));
    let caption = Memo::new(move |_| snapshot.with(|s| s.caption.clone()));
    let outgoing = Memo::new(move |_| snapshot.with(|s| s.outgoing_caption.clone()));
    let placement = Memo::new(move |_| snapshot.with(|s| s.caption_placement));

    // Mount once the canvas exists
    Effect::new(move || {
        let Some(canvas) = canvas_ref.get() else { return };
        mount_player(state, canvas);
    });

    // `loop` is a keyword in view!, so configure playback here
    Effect::new(move || {
        let Some(video) = video_ref.get() else { return };
        video.set_muted(true);
        video.set_loop(true);
        video.set_autoplay(true);
        if let Err(e) = video.set_attribute("playsinline", "") {
            log::warn!("Failed to set playsinline: {e:?}");
        }
        if let Err(e) = video.play() {
            log::debug!("Video autoplay rejected: {e:?}");
        }
    });

    on_cleanup(teardown_player);

    view! {
        <div class="frame-scroll">
            <div class="frame-container" class:transitioning=move || transitioning.get()>
                <canvas node_ref=canvas_ref class="frame" class:faded=move || !frame_visible.get() />
                <video node_ref=video_ref class="video" class:shown=move || video_visible.get()>
                    <source src=video_path type="video/mp4" />
                </video>
                {move || video_shown.get().then(|| view! {
                    <div class="video-caption">{video_caption.clone()}</div>
                })}
            </div>
            <div class="caption-block" style:transform=move || caption_transform(placement.get())>
                {move || outgoing.get().map(|text| view! {
                    <div class="caption outgoing">{text}</div>
                })}
                {move || caption.get().map(|text| view! {
                    <div class="caption incoming">{text}</div>
                })}
            </div>
            <div
                class="scroll-indicator"
                class:shown=move || !video_shown.get()
                on:click=move |_| learn_more()
            >
                <span class="scroll-text">{label}</span>
                <svg class="scroll-arrow" width="24" height="24" viewBox="0 0 24 24" fill="none">
                    <path
                        d="M12 5L12 19M12 19L5 12M12 19L19 12"
                        stroke="white"
                        stroke-width="2"
                        stroke-linecap="round"
                        stroke-linejoin="round"
                    />
                </svg>
            </div>
            <div
                class="video-button"
                class:shown=move || video_shown.get()
                on:click=move |_| learn_more()
            >
                <span class="button-text">{button_label}</span>
            </div>
        </div>
    }
}
