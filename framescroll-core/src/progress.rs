//! Scroll position → normalised progress → frame index.

use std::rc::Rc;

use crate::types::FrameIndex;

/// Raw viewport state read from the host on every sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportMetrics {
    /// Pixels scrolled from the top of the document.
    pub scroll_offset: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Total scrollable height of the document.
    pub document_height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    Scroll,
    Resize,
}

impl ViewportEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }
}

/// Unsubscribes its listener when dropped.
#[must_use = "dropping the handle removes the listener"]
pub struct ListenerHandle {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl ListenerHandle {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

/// Host viewport: current metrics plus scroll/resize notifications.
pub trait ViewportMetricsProvider {
    fn metrics(&self) -> ViewportMetrics;

    fn subscribe(&self, event: ViewportEvent, handler: Rc<dyn Fn()>) -> ListenerHandle;
}

/// Progress in `[0, 1]` for the given metrics.
///
/// A document no taller than the viewport yields 0, as does any
/// non-finite scroll offset.
pub fn progress_from_metrics(metrics: &ViewportMetrics) -> f64 {
    let range = metrics.document_height - metrics.viewport_height;
    if !(range > 0.0) || !metrics.scroll_offset.is_finite() {
        return 0.0;
    }
    (metrics.scroll_offset / range).clamp(0.0, 1.0)
}

/// `clamp(floor(progress * total) + 1, 1, total)`.
pub fn frame_index_for(progress: f64, total_frames: u32) -> FrameIndex {
    let total = total_frames.max(1);
    let raw = (progress * total as f64).floor();
    if !raw.is_finite() || raw < 0.0 {
        return 1;
    }
    (raw as u64 + 1).min(total as u64) as FrameIndex
}

/// Stateless sampler over a [`ViewportMetricsProvider`].
pub struct ScrollProgressSource<P> {
    provider: P,
}

impl<P: ViewportMetricsProvider> ScrollProgressSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn sample(&self) -> f64 {
        progress_from_metrics(&self.provider.metrics())
    }

    pub fn metrics(&self) -> ViewportMetrics {
        self.provider.metrics()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
