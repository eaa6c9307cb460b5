//! Chunked, deduplicated frame preloading.
//!
//! `preload(start, end)` walks its window in ascending order and awaits one
//! fetch at a time. Concurrent calls are safe: a window whose `start-end`
//! key is already in flight is dropped, and a frame that already has a
//! cache slot is skipped, so each frame is fetched at most once.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::cache::FrameCache;
use crate::error::FrameLoadError;
use crate::types::{FrameIndex, LoadWindow};

/// Fetches and decodes one frame image.
pub trait FrameSource {
    type Image: 'static;

    fn fetch(&self, index: FrameIndex) -> LocalBoxFuture<'static, Result<Self::Image, FrameLoadError>>;
}

/// What one `preload` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreloadReport {
    pub window: LoadWindow,
    pub loaded: usize,
    pub failed: usize,
    /// Frames that already had a cache slot.
    pub skipped: usize,
}

impl PreloadReport {
    fn new(window: LoadWindow) -> Self {
        Self {
            window,
            loaded: 0,
            failed: 0,
            skipped: 0,
        }
    }
}

pub struct FrameAssetLoader<F: FrameSource> {
    source: F,
    cache: Rc<FrameCache<F::Image>>,
    total_frames: u32,
    readiness_threshold: usize,
    in_flight: RefCell<HashSet<LoadWindow>>,
    loaded_count: Cell<usize>,
    ready: Cell<bool>,
    closed: Cell<bool>,
    on_ready: RefCell<Option<Box<dyn FnOnce()>>>,
    on_frame_loaded: RefCell<Option<Rc<dyn Fn(FrameIndex)>>>,
}

impl<F: FrameSource> FrameAssetLoader<F> {
    pub fn new(
        source: F,
        cache: Rc<FrameCache<F::Image>>,
        total_frames: u32,
        readiness_threshold: usize,
    ) -> Self {
        Self {
            source,
            cache,
            total_frames,
            readiness_threshold,
            in_flight: RefCell::new(HashSet::new()),
            loaded_count: Cell::new(0),
            ready: Cell::new(readiness_threshold == 0),
            closed: Cell::new(false),
            on_ready: RefCell::new(None),
            on_frame_loaded: RefCell::new(None),
        }
    }

    pub fn cache(&self) -> &Rc<FrameCache<F::Image>> {
        &self.cache
    }

    /// Successful loads so far. Never decreases.
    pub fn loaded_count(&self) -> usize {
        self.loaded_count.get()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    pub fn in_flight_windows(&self) -> usize {
        self.in_flight.borrow().len()
    }

    /// Run `f` once when the readiness threshold is reached (immediately if
    /// it already has been).
    pub fn on_ready(&self, f: impl FnOnce() + 'static) {
        if self.ready.get() {
            f();
        } else {
            *self.on_ready.borrow_mut() = Some(Box::new(f));
        }
    }

    /// Called after every successful frame load.
    pub fn on_frame_loaded(&self, f: impl Fn(FrameIndex) + 'static) {
        *self.on_frame_loaded.borrow_mut() = Some(Rc::new(f));
    }

    /// Stop claiming new frames. Fetches already in flight run to completion
    /// and their results are dropped.
    pub fn shutdown(&self) {
        self.closed.set(true);
        self.on_ready.borrow_mut().take();
        self.on_frame_loaded.borrow_mut().take();
    }

    /// Ensure every frame in `[start, end]` (capped at the sequence length)
    /// ends up loaded or failed.
    ///
    /// Returns `None` when the window is empty or an identical window is
    /// already in flight. Load failures are logged and recorded in the cache,
    /// never returned.
    pub async fn preload(&self, start: FrameIndex, end: FrameIndex) -> Option<PreloadReport> {
        let window = LoadWindow::new(start, end, self.total_frames)?;
        if self.closed.get() {
            return None;
        }
        if !self.in_flight.borrow_mut().insert(window) {
            log::debug!("preload {window} already in flight");
            return None;
        }

        let mut report = PreloadReport::new(window);
        for index in window.iter() {
            if self.closed.get() {
                break;
            }
            if !self.cache.claim(index) {
                report.skipped += 1;
                continue;
            }
            let result = self.source.fetch(index).await;
            if self.closed.get() {
                break;
            }
            match result {
                Ok(image) => {
                    self.cache.complete(index, image);
                    report.loaded += 1;
                    self.record_loaded(index);
                }
                Err(err) => {
                    log::warn!("{err}");
                    self.cache.fail(index);
                    report.failed += 1;
                }
            }
        }

        self.in_flight.borrow_mut().remove(&window);
        log::debug!(
            "preload {window} done: {} loaded, {} failed, {} skipped",
            report.loaded,
            report.failed,
            report.skipped
        );
        Some(report)
    }

    fn record_loaded(&self, index: FrameIndex) {
        let count = self.loaded_count.get() + 1;
        self.loaded_count.set(count);

        if !self.ready.get() && count >= self.readiness_threshold {
            self.ready.set(true);
            log::info!("{count} frames loaded, player ready");
            let callback = self.on_ready.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
            }
        }

        let listener = self.on_frame_loaded.borrow().clone();
        if let Some(listener) = listener {
            listener(index);
        }
    }
}
