//! Sequence ↔ video hand-over.
//!
//! ```text
//! Sequence ──(last frame)──▶ Transitioning{Video, flipped: false}
//!          ──fade-out──▶ Transitioning{Video, flipped: true}
//!          ──settle──▶ Video
//! Video ──(earlier frame)──▶ Transitioning{Sequence, ..} ──▶ … ──▶ Sequence
//! ```
//!
//! A trigger is only honoured from a stable state, so a transition in
//! progress is never cut short. When a transition settles, the most recent
//! frame index is checked again so a scroll reversal that happened mid-way
//! is not lost.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::Scheduler;
use crate::types::FrameIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StableMode {
    Sequence,
    Video,
}

impl From<StableMode> for PlaybackMode {
    fn from(mode: StableMode) -> Self {
        match mode {
            StableMode::Sequence => PlaybackMode::Sequence,
            StableMode::Video => PlaybackMode::Video,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    Sequence,
    /// `flipped` becomes true once the fade-out delay has passed and the
    /// target layer has become authoritative.
    Transitioning { target: StableMode, flipped: bool },
    Video,
}

impl PlaybackMode {
    pub fn is_stable(self) -> bool {
        !matches!(self, Self::Transitioning { .. })
    }

    /// Which layer currently owns the screen (drives the video caption and
    /// the learn-more affordances).
    pub fn video_authoritative(self) -> bool {
        match self {
            Self::Sequence => false,
            Self::Video => true,
            Self::Transitioning { target, flipped } => (target == StableMode::Video) == flipped,
        }
    }

    pub fn frame_surface_visible(self) -> bool {
        matches!(
            self,
            Self::Sequence
                | Self::Transitioning {
                    target: StableMode::Sequence,
                    ..
                }
        )
    }

    pub fn video_visible(self) -> bool {
        matches!(
            self,
            Self::Video
                | Self::Transitioning {
                    target: StableMode::Video,
                    ..
                }
        )
    }
}

struct ModeState {
    mode: Cell<PlaybackMode>,
    terminal: FrameIndex,
    last_frame: Cell<FrameIndex>,
    fade_out: Duration,
    settle: Duration,
    scheduler: Rc<dyn Scheduler>,
    listener: RefCell<Option<Rc<dyn Fn(PlaybackMode)>>>,
}

impl ModeState {
    fn set(&self, mode: PlaybackMode) {
        log::debug!("playback mode {:?} -> {:?}", self.mode.get(), mode);
        self.mode.set(mode);
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(mode);
        }
    }
}

pub struct PlaybackModeMachine {
    state: Rc<ModeState>,
}

impl PlaybackModeMachine {
    /// `terminal` is the frame index that hands over to the video.
    pub fn new(terminal: FrameIndex, fade_out: Duration, settle: Duration, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            state: Rc::new(ModeState {
                mode: Cell::new(PlaybackMode::Sequence),
                terminal,
                last_frame: Cell::new(1),
                fade_out,
                settle,
                scheduler,
                listener: RefCell::new(None),
            }),
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode.get()
    }

    pub fn on_change(&self, f: impl Fn(PlaybackMode) + 'static) {
        *self.state.listener.borrow_mut() = Some(Rc::new(f));
    }

    /// Feed the latest frame index. Returns `true` if a transition started.
    pub fn check(&self, frame_index: FrameIndex) -> bool {
        check(&self.state, frame_index)
    }
}

fn check(state: &Rc<ModeState>, frame_index: FrameIndex) -> bool {
    state.last_frame.set(frame_index);
    let target = match state.mode.get() {
        PlaybackMode::Sequence if frame_index >= state.terminal => StableMode::Video,
        PlaybackMode::Video if frame_index < state.terminal => StableMode::Sequence,
        _ => return false,
    };
    begin(state, target);
    true
}

fn begin(state: &Rc<ModeState>, target: StableMode) {
    state.set(PlaybackMode::Transitioning { target, flipped: false });

    let weak = Rc::downgrade(state);
    state.scheduler.after(
        state.fade_out,
        Box::new(move || {
            let Some(state) = weak.upgrade() else { return };
            state.set(PlaybackMode::Transitioning { target, flipped: true });

            let weak = Rc::downgrade(&state);
            state.scheduler.after(
                state.settle,
                Box::new(move || {
                    let Some(state) = weak.upgrade() else { return };
                    state.set(target.into());
                    check(&state, state.last_frame.get());
                }),
            );
        }),
    );
}
