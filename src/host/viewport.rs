use std::rc::Rc;

use framescroll_core::{ListenerHandle, ViewportEvent, ViewportMetrics, ViewportMetricsProvider};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Scroll and size of the top-level window.
pub struct WindowViewport {
    window: Window,
}

impl WindowViewport {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl ViewportMetricsProvider for WindowViewport {
    fn metrics(&self) -> ViewportMetrics {
        let scroll_offset = self.window.scroll_y().unwrap_or(0.0);
        let viewport_width = self
            .window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let viewport_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let document_height = self
            .window
            .document()
            .and_then(|d| d.document_element())
            .map(|el| el.scroll_height() as f64)
            .unwrap_or(0.0);
        ViewportMetrics {
            scroll_offset,
            viewport_width,
            viewport_height,
            document_height,
        }
    }

    fn subscribe(&self, event: ViewportEvent, handler: Rc<dyn Fn()>) -> ListenerHandle {
        let name = event.name();
        let closure = Closure::<dyn FnMut()>::new(move || handler());
        if let Err(e) = self
            .window
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        {
            log::error!("Failed to add {name} listener: {e:?}");
        }
        let window = self.window.clone();
        ListenerHandle::new(move || {
            if let Err(e) = window.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref()) {
                log::warn!("Failed to remove {name} listener: {e:?}");
            }
        })
    }
}
