//! Deferred work: timers, animation-frame callbacks and local futures.
//!
//! Everything runs on one thread. In the browser these map to
//! `setTimeout`, `requestAnimationFrame` and `spawn_local`; in tests the
//! [`VirtualClock`] runs them on demand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    /// Run `task` once `delay` has elapsed.
    fn after(&self, delay: Duration, task: Task);

    /// Run `task` at the next animation-frame boundary.
    fn next_frame(&self, task: Task);

    /// Drive `future` to completion on the local executor.
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn after(&self, delay: Duration, task: Task) {
        (**self).after(delay, task)
    }

    fn next_frame(&self, task: Task) {
        (**self).next_frame(task)
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        (**self).spawn(future)
    }
}

struct Timer {
    due: Duration,
    seq: u64,
    task: Task,
}

/// Deterministic scheduler driven by hand.
///
/// Timers fire in `(due, registration order)`; spawned futures make progress
/// whenever the clock is advanced or [`run_until_stalled`](Self::run_until_stalled)
/// is called.
pub struct VirtualClock {
    now: Cell<Duration>,
    seq: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
    frames: RefCell<Vec<Task>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            now: Cell::new(Duration::ZERO),
            seq: Cell::new(0),
            timers: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Poll spawned futures until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Fire every animation-frame callback queued so far.
    pub fn run_frame(&self) {
        let tasks = std::mem::take(&mut *self.frames.borrow_mut());
        for task in tasks {
            task();
        }
        self.run_until_stalled();
    }

    /// Move time forward, firing due timers in order.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        self.run_until_stalled();
        while let Some(timer) = self.pop_due(target) {
            self.now.set(timer.due);
            (timer.task)();
            self.run_until_stalled();
        }
        self.now.set(target);
    }

    fn pop_due(&self, limit: Duration) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        let pos = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(timers.remove(pos))
    }
}

impl Scheduler for VirtualClock {
    fn after(&self, delay: Duration, task: Task) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }

    fn next_frame(&self, task: Task) {
        self.frames.borrow_mut().push(task);
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(future) {
            log::warn!("virtual clock could not spawn task: {e}");
        }
    }
}
