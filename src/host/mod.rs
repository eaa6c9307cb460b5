//! Browser implementations of the player's host capabilities.

pub mod image_source;
pub mod navigator;
pub mod page_config;
pub mod scheduler;
pub mod viewport;

pub use image_source::ImageFrameSource;
pub use navigator::BrowserNavigator;
pub use scheduler::BrowserScheduler;
pub use viewport::WindowViewport;
