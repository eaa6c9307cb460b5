use std::time::Duration;

use framescroll_core::{Scheduler, Task};
use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// `setTimeout` / `requestAnimationFrame` / `spawn_local`.
pub struct BrowserScheduler {
    window: Window,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for BrowserScheduler {
    fn after(&self, delay: Duration, task: Task) {
        let cb = Closure::once_into_js(move || task());
        let ms = delay.as_millis().min(i32::MAX as u128) as i32;
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms)
        {
            log::error!("setTimeout failed: {e:?}");
        }
    }

    fn next_frame(&self, task: Task) {
        let cb = Closure::once_into_js(move || task());
        if let Err(e) = self.window.request_animation_frame(cb.unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}
