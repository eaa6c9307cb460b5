use framescroll_core::Navigator;

pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate_to(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            log::error!("No window object");
            return;
        };
        log::info!("Navigating to {path}");
        if let Err(e) = window.location().set_href(path) {
            log::error!("Navigation to {path} failed: {e:?}");
        }
    }
}
