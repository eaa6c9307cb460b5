//! Caption selection with a debounce between switches.
//!
//! The caption text changes as soon as a switch starts; the outgoing caption
//! stays available until the debounce timer expires so the view can fade it.
//! While a switch is in flight further changes are ignored.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::Scheduler;

/// `clamp(floor(progress * count * scale), 0, count - 1)`.
pub fn caption_index_for(progress: f64, count: usize, scale: f64) -> usize {
    if count == 0 {
        return 0;
    }
    let raw = (progress * count as f64 * scale).floor();
    if !raw.is_finite() || raw < 0.0 {
        return 0;
    }
    (raw as usize).min(count - 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionPhase {
    Idle,
    Transitioning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptionChange {
    pub from: usize,
    pub to: usize,
}

struct CaptionState {
    captions: Vec<String>,
    scale: f64,
    debounce: Duration,
    scheduler: Rc<dyn Scheduler>,
    current: Cell<usize>,
    outgoing: Cell<Option<usize>>,
    phase: Cell<CaptionPhase>,
    on_settle: RefCell<Option<Rc<dyn Fn()>>>,
}

pub struct CaptionCycleController {
    state: Rc<CaptionState>,
}

impl CaptionCycleController {
    pub fn new(captions: Vec<String>, scale: f64, debounce: Duration, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            state: Rc::new(CaptionState {
                captions,
                scale,
                debounce,
                scheduler,
                current: Cell::new(0),
                outgoing: Cell::new(None),
                phase: Cell::new(CaptionPhase::Idle),
                on_settle: RefCell::new(None),
            }),
        }
    }

    /// Called when a switch's debounce window closes.
    pub fn on_settle(&self, f: impl Fn() + 'static) {
        *self.state.on_settle.borrow_mut() = Some(Rc::new(f));
    }

    pub fn on_progress(&self, progress: f64) -> Option<CaptionChange> {
        let state = &self.state;
        let candidate = caption_index_for(progress, state.captions.len(), state.scale);
        let current = state.current.get();
        if candidate == current || state.phase.get() == CaptionPhase::Transitioning {
            return None;
        }

        state.phase.set(CaptionPhase::Transitioning);
        state.outgoing.set(Some(current));
        state.current.set(candidate);

        let weak = Rc::downgrade(state);
        state.scheduler.after(
            state.debounce,
            Box::new(move || {
                let Some(state) = weak.upgrade() else { return };
                state.outgoing.set(None);
                state.phase.set(CaptionPhase::Idle);
                let listener = state.on_settle.borrow().clone();
                if let Some(listener) = listener {
                    listener();
                }
            }),
        );

        Some(CaptionChange {
            from: current,
            to: candidate,
        })
    }

    pub fn current(&self) -> Option<&str> {
        self.state.captions.get(self.state.current.get()).map(String::as_str)
    }

    /// Caption being faded out, if a switch is in flight.
    pub fn outgoing(&self) -> Option<&str> {
        self.state
            .outgoing
            .get()
            .and_then(|i| self.state.captions.get(i))
            .map(String::as_str)
    }

    pub fn phase(&self) -> CaptionPhase {
        self.state.phase.get()
    }
}
