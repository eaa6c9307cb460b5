//! Synthetic host implementations for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

use crate::error::FrameLoadError;
use crate::loader::FrameSource;
use crate::orchestrator::Navigator;
use crate::progress::{ListenerHandle, ViewportEvent, ViewportMetrics, ViewportMetricsProvider};
use crate::renderer::DrawSurface;
use crate::types::FrameIndex;

// ── Viewport ─────────────────────────────────────────────────────────────────

struct ViewportInner {
    metrics: Cell<ViewportMetrics>,
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(u64, ViewportEvent, Rc<dyn Fn()>)>>,
}

#[derive(Clone)]
pub struct FakeViewport {
    inner: Rc<ViewportInner>,
}

impl FakeViewport {
    pub fn new(metrics: ViewportMetrics) -> Self {
        Self {
            inner: Rc::new(ViewportInner {
                metrics: Cell::new(metrics),
                next_id: Cell::new(0),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// 1280×1000 viewport over a 2060px document: 1060px of scroll range,
    /// so with 106 frames every 10px is one frame.
    pub fn standard() -> Self {
        Self::new(ViewportMetrics {
            scroll_offset: 0.0,
            viewport_width: 1280.0,
            viewport_height: 1000.0,
            document_height: 2060.0,
        })
    }

    pub fn scroll_to(&self, offset: f64) {
        let mut m = self.inner.metrics.get();
        m.scroll_offset = offset;
        self.inner.metrics.set(m);
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut m = self.inner.metrics.get();
        m.viewport_width = width;
        m.viewport_height = height;
        self.inner.metrics.set(m);
    }

    pub fn set_metrics(&self, metrics: ViewportMetrics) {
        self.inner.metrics.set(metrics);
    }

    pub fn emit(&self, event: ViewportEvent) {
        let handlers: Vec<Rc<dyn Fn()>> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }
}

impl ViewportMetricsProvider for FakeViewport {
    fn metrics(&self) -> ViewportMetrics {
        self.inner.metrics.get()
    }

    fn subscribe(&self, event: ViewportEvent, handler: Rc<dyn Fn()>) -> ListenerHandle {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.handlers.borrow_mut().push((id, event, handler));
        let weak = Rc::downgrade(&self.inner);
        ListenerHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.handlers.borrow_mut().retain(|(i, _, _)| *i != id);
            }
        })
    }
}

// ── Frame source ─────────────────────────────────────────────────────────────

/// Images are just their frame index.
#[derive(Clone, Default)]
pub struct FakeSource {
    gated: bool,
    fetched: Rc<RefCell<Vec<FrameIndex>>>,
    failing: Rc<RefCell<HashSet<FrameIndex>>>,
    gates: Rc<RefCell<HashMap<FrameIndex, oneshot::Sender<()>>>>,
}

impl FakeSource {
    /// Fetches resolve on first poll.
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Fetches stay pending until released.
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    pub fn fail_on(&self, index: FrameIndex) {
        self.failing.borrow_mut().insert(index);
    }

    pub fn fetched(&self) -> Vec<FrameIndex> {
        self.fetched.borrow().clone()
    }

    pub fn fetch_count(&self, index: FrameIndex) -> usize {
        self.fetched.borrow().iter().filter(|&&i| i == index).count()
    }

    /// Complete every pending fetch. Returns how many were released.
    pub fn release_all(&self) -> usize {
        let gates: Vec<_> = self.gates.borrow_mut().drain().collect();
        let n = gates.len();
        for (_, tx) in gates {
            let _ = tx.send(());
        }
        n
    }
}

impl FrameSource for FakeSource {
    type Image = FrameIndex;

    fn fetch(&self, index: FrameIndex) -> LocalBoxFuture<'static, Result<FrameIndex, FrameLoadError>> {
        self.fetched.borrow_mut().push(index);
        let result = if self.failing.borrow().contains(&index) {
            Err(FrameLoadError::fetch(index, format!("frame_{index:03}"), "simulated network error"))
        } else {
            Ok(index)
        };
        if !self.gated {
            return Box::pin(futures::future::ready(result));
        }
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(index, tx);
        Box::pin(async move {
            let _ = rx.await;
            result
        })
    }
}

// ── Drawing surface ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceOp {
    SetSize(u32, u32),
    Clear,
    Draw(FrameIndex, u32, u32),
}

#[derive(Clone, Default)]
pub struct FakeSurface {
    size: Rc<Cell<(u32, u32)>>,
    ops: Rc<RefCell<Vec<SurfaceOp>>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.borrow().clone()
    }

    /// Frame currently showing on the surface.
    pub fn showing(&self) -> Option<FrameIndex> {
        let mut showing = None;
        for op in self.ops.borrow().iter() {
            match op {
                SurfaceOp::Draw(i, _, _) => showing = Some(*i),
                SurfaceOp::Clear | SurfaceOp::SetSize(..) => showing = None,
            }
        }
        showing
    }

    pub fn draw_count(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Draw(..)))
            .count()
    }
}

impl DrawSurface for FakeSurface {
    type Image = FrameIndex;

    fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
        self.ops.borrow_mut().push(SurfaceOp::SetSize(width, height));
    }

    fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn clear(&self) {
        self.ops.borrow_mut().push(SurfaceOp::Clear);
    }

    fn draw_image(&self, image: &FrameIndex, width: u32, height: u32) {
        self.ops.borrow_mut().push(SurfaceOp::Draw(*image, width, height));
    }
}

// ── Navigation ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeNavigator {
    pub visited: RefCell<Vec<String>>,
}

impl Navigator for FakeNavigator {
    fn navigate_to(&self, path: &str) {
        self.visited.borrow_mut().push(path.to_string());
    }
}
