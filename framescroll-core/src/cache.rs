//! Frame cache shared by the loader (writer) and the renderer (reader).
//!
//! A slot moves `Unrequested → Loading → Loaded | Failed` and never goes
//! back; a loaded image is immutable for the life of the cache. Reads of a
//! missing or loading slot simply report "not available".

use std::cell::RefCell;
use std::collections::HashMap;

use crate::types::{FrameIndex, FrameState};

enum Slot<I> {
    Loading,
    Loaded(I),
    Failed,
}

pub struct FrameCache<I> {
    slots: RefCell<HashMap<FrameIndex, Slot<I>>>,
}

impl<I> Default for FrameCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> FrameCache<I> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
        }
    }

    pub fn state(&self, index: FrameIndex) -> FrameState {
        match self.slots.borrow().get(&index) {
            None => FrameState::Unrequested,
            Some(Slot::Loading) => FrameState::Loading,
            Some(Slot::Loaded(_)) => FrameState::Loaded,
            Some(Slot::Failed) => FrameState::Failed,
        }
    }

    /// Move an unrequested slot to `Loading`. Returns `false` if the slot
    /// already has an entry of any kind.
    pub fn claim(&self, index: FrameIndex) -> bool {
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(&index) {
            return false;
        }
        slots.insert(index, Slot::Loading);
        true
    }

    pub fn complete(&self, index: FrameIndex, image: I) {
        let mut slots = self.slots.borrow_mut();
        if let Some(Slot::Loaded(_)) = slots.get(&index) {
            log::debug!("frame {index} already loaded; keeping the first image");
            return;
        }
        slots.insert(index, Slot::Loaded(image));
    }

    pub fn fail(&self, index: FrameIndex) {
        let mut slots = self.slots.borrow_mut();
        if let Some(Slot::Loaded(_)) = slots.get(&index) {
            return;
        }
        slots.insert(index, Slot::Failed);
    }

    /// Borrow a loaded image. `None` for any other state.
    pub fn with_loaded<R>(&self, index: FrameIndex, f: impl FnOnce(&I) -> R) -> Option<R> {
        match self.slots.borrow().get(&index) {
            Some(Slot::Loaded(image)) => Some(f(image)),
            _ => None,
        }
    }

    pub fn is_loaded(&self, index: FrameIndex) -> bool {
        self.state(index) == FrameState::Loaded
    }

    pub fn loaded_count(&self) -> usize {
        self.slots
            .borrow()
            .values()
            .filter(|s| matches!(s, Slot::Loaded(_)))
            .count()
    }

    /// Number of slots with any entry.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }
}
