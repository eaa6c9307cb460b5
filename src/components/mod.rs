pub mod app;
pub mod frame_scroll;
pub mod loading_overlay;
