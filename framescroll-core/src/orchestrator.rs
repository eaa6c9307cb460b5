//! Top-level coordinator.
//!
//! Owns the progress source, loader, renderer, caption controller and mode
//! machine. Scroll and resize notifications are coalesced onto the next
//! animation frame; each processed sample runs, in order:
//! draw → caption → mode check → preload of the look-ahead window.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::cache::FrameCache;
use crate::caption::CaptionCycleController;
use crate::config::PlayerConfig;
use crate::loader::{FrameAssetLoader, FrameSource};
use crate::mode::{PlaybackMode, PlaybackModeMachine};
use crate::progress::{frame_index_for, ListenerHandle, ScrollProgressSource, ViewportEvent, ViewportMetricsProvider};
use crate::renderer::{DrawSurface, FrameRenderer};
use crate::scheduler::Scheduler;
use crate::types::FrameIndex;

/// Leaves the page.
pub trait Navigator {
    fn navigate_to(&self, path: &str);
}

/// Where the scrolling caption block sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CaptionPlacement {
    /// Slid up by this many viewport-height units.
    Sliding { offset_vh: f64 },
    /// Parked above centre while the video is showing.
    Parked,
}

/// Everything the view layer needs to render one state of the player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackSnapshot {
    pub progress: f64,
    pub frame_index: FrameIndex,
    pub caption: Option<String>,
    pub outgoing_caption: Option<String>,
    pub caption_placement: CaptionPlacement,
    pub mode: PlaybackMode,
    pub frame_visible: bool,
    pub video_visible: bool,
    pub video_authoritative: bool,
    pub ready: bool,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            progress: 0.0,
            frame_index: 1,
            caption: None,
            outgoing_caption: None,
            caption_placement: CaptionPlacement::Sliding { offset_vh: 0.0 },
            mode: PlaybackMode::Sequence,
            frame_visible: true,
            video_visible: false,
            video_authoritative: false,
            ready: false,
        }
    }
}

pub struct ScrollAnimationOrchestrator<V, F, D>
where
    V: ViewportMetricsProvider + 'static,
    F: FrameSource + 'static,
    D: DrawSurface<Image = F::Image> + 'static,
{
    this: Weak<Self>,
    config: PlayerConfig,
    progress_source: ScrollProgressSource<V>,
    loader: Rc<FrameAssetLoader<F>>,
    renderer: FrameRenderer<D>,
    captions: CaptionCycleController,
    mode: PlaybackModeMachine,
    scheduler: Rc<dyn Scheduler>,
    progress: Cell<f64>,
    frame_index: Cell<FrameIndex>,
    sample_pending: Cell<bool>,
    resize_pending: Cell<bool>,
    mounted: Cell<bool>,
    listeners: RefCell<Vec<ListenerHandle>>,
    observer: RefCell<Option<Rc<dyn Fn(&PlaybackSnapshot)>>>,
}

impl<V, F, D> ScrollAnimationOrchestrator<V, F, D>
where
    V: ViewportMetricsProvider + 'static,
    F: FrameSource + 'static,
    D: DrawSurface<Image = F::Image> + 'static,
{
    /// Build the player, subscribe to scroll and resize, size the surface and
    /// start loading the head of the sequence.
    pub fn mount(config: PlayerConfig, viewport: V, source: F, surface: D, scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        let cache = Rc::new(FrameCache::new());
        let loader = Rc::new(FrameAssetLoader::new(
            source,
            cache.clone(),
            config.total_frames,
            config.readiness_threshold(),
        ));
        let renderer = FrameRenderer::new(surface, cache, config.draw_target_mode, config.fixed_resolution);
        let captions = CaptionCycleController::new(
            config.caption_list.clone(),
            config.caption_scale,
            config.caption_debounce(),
            scheduler.clone(),
        );
        let mode = PlaybackModeMachine::new(
            config.total_frames,
            config.mode_transition_delay(),
            config.mode_settle_delay(),
            scheduler.clone(),
        );

        let player = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            config,
            progress_source: ScrollProgressSource::new(viewport),
            loader,
            renderer,
            captions,
            mode,
            scheduler,
            progress: Cell::new(0.0),
            frame_index: Cell::new(1),
            sample_pending: Cell::new(false),
            resize_pending: Cell::new(false),
            mounted: Cell::new(true),
            listeners: RefCell::new(Vec::new()),
            observer: RefCell::new(None),
        });
        player.attach();
        player
    }

    fn attach(&self) {
        let this = self.this.clone();
        self.loader.on_ready(move || {
            if let Some(player) = this.upgrade() {
                player.publish();
            }
        });
        let this = self.this.clone();
        self.loader.on_frame_loaded(move |index| {
            if let Some(player) = this.upgrade() {
                player.renderer.refresh_if_requested(index);
            }
        });
        let this = self.this.clone();
        self.captions.on_settle(move || {
            if let Some(player) = this.upgrade() {
                player.publish();
            }
        });
        let this = self.this.clone();
        self.mode.on_change(move |_| {
            if let Some(player) = this.upgrade() {
                player.publish();
            }
        });

        let viewport = self.progress_source.provider();
        let this = self.this.clone();
        let on_scroll = viewport.subscribe(
            ViewportEvent::Scroll,
            Rc::new(move || {
                if let Some(player) = this.upgrade() {
                    player.request_sample();
                }
            }),
        );
        let this = self.this.clone();
        let on_resize = viewport.subscribe(
            ViewportEvent::Resize,
            Rc::new(move || {
                if let Some(player) = this.upgrade() {
                    player.request_resize();
                }
            }),
        );
        self.listeners.borrow_mut().extend([on_scroll, on_resize]);

        let metrics = self.progress_source.metrics();
        self.renderer.resize(metrics.viewport_width, metrics.viewport_height);
        self.renderer.draw(self.frame_index.get());

        self.initial_load();
        // the page may be restored mid-scroll
        self.request_sample();
    }

    /// Observer for every published snapshot.
    pub fn set_observer(&self, f: impl Fn(&PlaybackSnapshot) + 'static) {
        *self.observer.borrow_mut() = Some(Rc::new(f));
    }

    /// Queue one sample for the next animation frame. Further requests before
    /// it runs are folded into it.
    pub fn request_sample(&self) {
        if !self.mounted.get() || self.sample_pending.replace(true) {
            return;
        }
        let this = self.this.clone();
        self.scheduler.next_frame(Box::new(move || {
            if let Some(player) = this.upgrade() {
                player.sample_pending.set(false);
                player.process_sample();
            }
        }));
    }

    pub fn request_resize(&self) {
        if !self.mounted.get() || self.resize_pending.replace(true) {
            return;
        }
        let this = self.this.clone();
        self.scheduler.next_frame(Box::new(move || {
            if let Some(player) = this.upgrade() {
                player.resize_pending.set(false);
                player.apply_resize();
            }
        }));
    }

    fn apply_resize(&self) {
        if !self.mounted.get() {
            return;
        }
        let metrics = self.progress_source.metrics();
        self.renderer.resize(metrics.viewport_width, metrics.viewport_height);
        // the scrollable range usually changes with the viewport
        self.process_sample();
    }

    fn process_sample(&self) {
        if !self.mounted.get() {
            return;
        }
        let progress = self.progress_source.sample();
        let frame_index = frame_index_for(progress, self.config.total_frames);
        self.progress.set(progress);
        self.frame_index.set(frame_index);

        self.renderer.draw(frame_index);
        self.captions.on_progress(progress);
        self.mode.check(frame_index);
        self.preload(
            frame_index.saturating_add(1),
            frame_index.saturating_add(self.config.preload_ahead),
        );
        self.publish();
    }

    /// Load the head of the sequence, `[1, max(chunk_size, readiness
    /// threshold)]`, one `chunk_size` window after another.
    fn initial_load(&self) {
        let chunk = self.config.chunk_size.max(1);
        let threshold = FrameIndex::try_from(self.config.readiness_threshold()).unwrap_or(FrameIndex::MAX);
        let head = chunk.max(threshold).min(self.config.total_frames);
        log::info!(
            "frame scroll mounted: {} frames, initial load 1-{head} in chunks of {chunk}",
            self.config.total_frames
        );

        let loader = self.loader.clone();
        self.scheduler.spawn(Box::pin(async move {
            let mut start: FrameIndex = 1;
            while start <= head {
                let end = start.saturating_add(chunk - 1).min(head);
                loader.preload(start, end).await;
                if end == head {
                    break;
                }
                start = end + 1;
            }
        }));
    }

    fn preload(&self, start: FrameIndex, end: FrameIndex) {
        if start > end || start > self.config.total_frames {
            return;
        }
        let loader = self.loader.clone();
        self.scheduler.spawn(Box::pin(async move {
            loader.preload(start, end).await;
        }));
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let mode = self.mode.mode();
        let progress = self.progress.get();
        let caption_placement = if mode.video_authoritative() {
            CaptionPlacement::Parked
        } else {
            CaptionPlacement::Sliding {
                offset_vh: -progress * self.config.caption_slide_vh,
            }
        };
        PlaybackSnapshot {
            progress,
            frame_index: self.frame_index.get(),
            caption: self.captions.current().map(str::to_string),
            outgoing_caption: self.captions.outgoing().map(str::to_string),
            caption_placement,
            mode,
            frame_visible: mode.frame_surface_visible(),
            video_visible: mode.video_visible(),
            video_authoritative: mode.video_authoritative(),
            ready: self.loader.is_ready(),
        }
    }

    fn publish(&self) {
        if !self.mounted.get() {
            return;
        }
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            observer(&self.snapshot());
        }
    }

    /// Leave the page for the configured "learn more" destination.
    pub fn learn_more(&self, navigator: &dyn Navigator) {
        navigator.navigate_to(&self.config.learn_more_path);
    }

    pub fn is_ready(&self) -> bool {
        self.loader.is_ready()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub fn loader(&self) -> &Rc<FrameAssetLoader<F>> {
        &self.loader
    }

    /// Drop both listeners, stop loading and discard the frame cache.
    /// Safe to call more than once.
    pub fn teardown(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(listeners);
        self.observer.borrow_mut().take();
        self.loader.shutdown();
        self.loader.cache().clear();
        log::info!("frame scroll torn down");
    }
}

impl<V, F, D> Drop for ScrollAnimationOrchestrator<V, F, D>
where
    V: ViewportMetricsProvider + 'static,
    F: FrameSource + 'static,
    D: DrawSurface<Image = F::Image> + 'static,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mode::StableMode;
    use crate::progress::ViewportMetrics;
    use crate::scheduler::VirtualClock;
    use crate::testing::{FakeNavigator, FakeSource, FakeSurface, FakeViewport};

    type Player = ScrollAnimationOrchestrator<FakeViewport, FakeSource, FakeSurface>;

    struct Rig {
        clock: Rc<VirtualClock>,
        viewport: FakeViewport,
        source: FakeSource,
        surface: FakeSurface,
        player: Rc<Player>,
    }

    fn rig_with(config: PlayerConfig, source: FakeSource) -> Rig {
        let clock = Rc::new(VirtualClock::new());
        let viewport = FakeViewport::standard();
        let surface = FakeSurface::new();
        let player = Player::mount(config, viewport.clone(), source.clone(), surface.clone(), clock.clone());
        Rig {
            clock,
            viewport,
            source,
            surface,
            player,
        }
    }

    fn rig() -> Rig {
        rig_with(PlayerConfig::default(), FakeSource::immediate())
    }

    impl Rig {
        /// Scroll and let the coalesced sample plus its preload run.
        fn scroll_to(&self, offset: f64) {
            self.viewport.scroll_to(offset);
            self.viewport.emit(ViewportEvent::Scroll);
            self.clock.run_frame();
        }
    }

    #[test]
    fn test_mount_subscribes_and_teardown_unsubscribes() {
        let r = rig();
        assert_eq!(r.viewport.listener_count(), 2);
        r.player.teardown();
        assert_eq!(r.viewport.listener_count(), 0);
        assert!(!r.player.is_mounted());
        r.player.teardown();
        assert_eq!(r.viewport.listener_count(), 0);
    }

    #[test]
    fn test_dropping_player_unsubscribes() {
        let r = rig();
        let Rig { viewport, player, .. } = r;
        drop(player);
        assert_eq!(viewport.listener_count(), 0);
    }

    #[test]
    fn test_initial_preload_and_first_frame() {
        let r = rig();
        r.clock.run_until_stalled();
        assert_eq!(r.source.fetched(), (1..=10).collect::<Vec<_>>());
        // frame 1 painted as soon as it arrived
        assert_eq!(r.surface.showing(), Some(1));
        assert_eq!(r.surface.size(), (1920, 1080));
        r.clock.run_frame();
        assert_eq!(r.player.snapshot().frame_index, 1);
        assert_eq!(r.player.snapshot().caption.as_deref(), Some("всем"));
    }

    #[test]
    fn test_full_sequence_threshold_ready_without_scroll() {
        let config = PlayerConfig {
            chunk_size: 10,
            initial_readiness_threshold: 106,
            ..PlayerConfig::default()
        };
        let r = rig_with(config, FakeSource::gated());
        let flips = Rc::new(Cell::new(0));
        let f = flips.clone();
        let was_ready = Rc::new(Cell::new(false));
        let w = was_ready.clone();
        r.player.set_observer(move |snap| {
            if snap.ready && !w.replace(true) {
                f.set(f.get() + 1);
            }
        });

        r.clock.run_until_stalled();
        // one chunk at a time: only frame 1 requested so far
        assert_eq!(r.source.fetched(), vec![1]);
        for _ in 0..105 {
            r.source.release_all();
            r.clock.run_until_stalled();
        }
        assert!(!r.player.is_ready());
        assert_eq!(r.source.fetched().len(), 106);

        r.source.release_all();
        r.clock.run_until_stalled();
        assert!(r.player.is_ready());
        assert_eq!(flips.get(), 1);
        assert_eq!(r.source.fetched(), (1..=106).collect::<Vec<_>>());
        assert_eq!(r.player.loader().in_flight_windows(), 0);

        r.clock.run_frame();
        r.clock.advance(Duration::from_secs(5));
        assert_eq!(flips.get(), 1);
    }

    #[test]
    fn test_ready_flips_once_after_tenth_load() {
        let config = PlayerConfig {
            chunk_size: 10,
            initial_readiness_threshold: 10,
            ..PlayerConfig::default()
        };
        let r = rig_with(config, FakeSource::gated());
        let flips = Rc::new(RefCell::new(Vec::new()));
        let last = Rc::new(Cell::new(false));
        let (f, l) = (flips.clone(), last.clone());
        r.player.set_observer(move |snap| {
            if snap.ready != l.get() {
                f.borrow_mut().push(snap.ready);
                l.set(snap.ready);
            }
        });

        r.clock.run_until_stalled();
        for _ in 0..9 {
            r.source.release_all();
            r.clock.run_until_stalled();
        }
        assert!(!r.player.is_ready());
        assert!(flips.borrow().is_empty());

        r.source.release_all();
        r.clock.run_until_stalled();
        assert!(r.player.is_ready());
        assert_eq!(*flips.borrow(), vec![true]);

        r.scroll_to(300.0);
        while r.source.release_all() > 0 {
            r.clock.run_until_stalled();
        }
        r.scroll_to(600.0);
        assert_eq!(*flips.borrow(), vec![true]);
    }

    #[test]
    fn test_scroll_events_coalesced_per_frame() {
        let r = rig();
        r.clock.run_until_stalled();
        r.clock.run_frame();
        let samples = Rc::new(Cell::new(0));
        let s = samples.clone();
        r.player.set_observer(move |_| s.set(s.get() + 1));

        for offset in [10.0, 20.0, 30.0, 40.0, 55.0] {
            r.viewport.scroll_to(offset);
            r.viewport.emit(ViewportEvent::Scroll);
        }
        assert_eq!(r.clock.pending_frames(), 1);
        r.clock.run_frame();
        assert_eq!(samples.get(), 1);
        // only the latest position counts
        assert_eq!(r.player.snapshot().frame_index, 6);
    }

    #[test]
    fn test_half_way_selects_frame_54_and_preloads_ahead() {
        let r = rig();
        r.clock.run_until_stalled();
        r.scroll_to(530.0);
        let snap = r.player.snapshot();
        assert_eq!(snap.progress, 0.5);
        assert_eq!(snap.frame_index, 54);
        let fetched = r.source.fetched();
        for i in 55..=64 {
            assert!(fetched.contains(&i), "frame {i} not preloaded");
        }
        assert!(!fetched.contains(&54));
        assert!(!fetched.contains(&65));
    }

    #[test]
    fn test_unloaded_frame_keeps_previous() {
        let r = rig();
        r.clock.run_until_stalled();
        r.scroll_to(530.0);
        // 54 was never fetched, so frame 1 is still showing
        assert_eq!(r.surface.showing(), Some(1));
        r.scroll_to(525.0);
        assert_eq!(r.player.snapshot().frame_index, 53);
        r.scroll_to(535.0);
        assert_eq!(r.player.snapshot().frame_index, 54);
        assert_eq!(r.surface.showing(), Some(54));
    }

    #[test]
    fn test_late_arrival_painted_without_scroll() {
        let r = rig_with(PlayerConfig::default(), FakeSource::gated());
        r.clock.run_until_stalled();
        assert_eq!(r.surface.showing(), None);
        r.source.release_all();
        r.clock.run_until_stalled();
        assert_eq!(r.surface.showing(), Some(1));
        assert_eq!(r.clock.pending_frames(), 1);
    }

    #[test]
    fn test_failed_frame_keeps_previous_until_later_frame() {
        let source = FakeSource::immediate();
        source.fail_on(42);
        let r = rig_with(PlayerConfig::default(), source);
        r.clock.run_until_stalled();

        r.scroll_to(395.0);
        assert_eq!(r.player.snapshot().frame_index, 40);
        r.scroll_to(405.0);
        assert_eq!(r.surface.showing(), Some(41));
        r.scroll_to(415.0);
        assert_eq!(r.player.snapshot().frame_index, 42);
        assert_eq!(r.surface.showing(), Some(41));
        r.scroll_to(425.0);
        assert_eq!(r.surface.showing(), Some(43));
    }

    #[test]
    fn test_end_of_scroll_reaches_video() {
        let r = rig();
        r.clock.run_until_stalled();
        r.scroll_to(1060.0);
        let snap = r.player.snapshot();
        assert_eq!(snap.frame_index, 106);
        assert_eq!(
            snap.mode,
            PlaybackMode::Transitioning {
                target: StableMode::Video,
                flipped: false
            }
        );
        assert!(!snap.frame_visible);

        r.clock.advance(Duration::from_millis(1000));
        let snap = r.player.snapshot();
        assert_eq!(snap.mode, PlaybackMode::Video);
        assert!(snap.video_visible);
        assert!(snap.video_authoritative);
        assert_eq!(snap.caption_placement, CaptionPlacement::Parked);

        r.scroll_to(200.0);
        r.clock.advance(Duration::from_millis(1000));
        let snap = r.player.snapshot();
        assert_eq!(snap.mode, PlaybackMode::Sequence);
        assert!(snap.frame_visible);
    }

    #[test]
    fn test_caption_follows_progress_and_slides() {
        let r = rig();
        r.clock.run_until_stalled();
        r.scroll_to(530.0);
        let snap = r.player.snapshot();
        assert_eq!(snap.caption.as_deref(), Some("мы"));
        assert_eq!(snap.outgoing_caption.as_deref(), Some("всем"));
        assert_eq!(snap.caption_placement, CaptionPlacement::Sliding { offset_vh: -40.0 });

        r.clock.advance(Duration::from_millis(600));
        assert_eq!(r.player.snapshot().outgoing_caption, None);
    }

    #[test]
    fn test_degenerate_viewport_shows_first_frame() {
        let r = rig();
        r.clock.run_until_stalled();
        r.viewport.set_metrics(ViewportMetrics {
            scroll_offset: 300.0,
            viewport_width: 1280.0,
            viewport_height: 1000.0,
            document_height: 900.0,
        });
        r.viewport.emit(ViewportEvent::Scroll);
        r.clock.run_frame();
        let snap = r.player.snapshot();
        assert_eq!(snap.progress, 0.0);
        assert_eq!(snap.frame_index, 1);
    }

    #[test]
    fn test_resize_redraws_current_frame() {
        let config = PlayerConfig {
            draw_target_mode: crate::config::DrawTargetMode::ViewportMatched,
            ..PlayerConfig::default()
        };
        let r = rig_with(config, FakeSource::immediate());
        r.clock.run_until_stalled();
        r.scroll_to(55.0);
        assert_eq!(r.surface.showing(), Some(6));

        r.viewport.resize(800.0, 600.0);
        r.viewport.emit(ViewportEvent::Resize);
        r.viewport.emit(ViewportEvent::Resize);
        assert_eq!(r.clock.pending_frames(), 1);
        r.clock.run_frame();
        assert_eq!(r.surface.size(), (800, 600));
        assert!(r.surface.showing().is_some());
    }

    #[test]
    fn test_learn_more_navigates() {
        let r = rig();
        let nav = FakeNavigator::default();
        r.player.learn_more(&nav);
        assert_eq!(*nav.visited.borrow(), vec!["/about".to_string()]);
    }

    #[test]
    fn test_events_after_teardown_ignored() {
        let r = rig();
        r.clock.run_until_stalled();
        r.clock.run_frame();
        let fetched = r.source.fetched().len();
        r.player.teardown();
        r.viewport.scroll_to(530.0);
        r.viewport.emit(ViewportEvent::Scroll);
        r.clock.run_frame();
        assert_eq!(r.source.fetched().len(), fetched);
        assert_eq!(r.player.loader().cache().len(), 0);
    }
}
