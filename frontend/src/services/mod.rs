pub mod api;
pub mod clipboard;
pub mod dom_capture;
pub mod logging;
