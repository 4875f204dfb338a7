//! # Summary Capture Pipeline
//!
//! Turns the live "memory" layout of the summary page into a single PNG and
//! hands it to the receiver, either through the platform share sheet or as a
//! plain file download.
//!
//! The pipeline is platform-agnostic: the DOM, the rasterization library, the
//! network, timers and the share/save capabilities are all reached through
//! the traits in [`platform`]. The wasm frontend implements them with
//! web-sys; the tests implement them with in-memory fakes.
//!
//! ## Flow
//!
//! ```text
//! Idle -> Preparing -> Synchronizing -> Rasterizing -> Dispatching -> Cleanup -> Terminal
//! ```
//!
//! - **Preparing**: every image is inlined as a data URL through a CORS relay
//!   ([`inline`]); failures leave the original source in place.
//! - **Synchronizing**: all images are awaited until loaded and decoded
//!   ([`wait`]), followed by a short settle delay.
//! - **Rasterizing**: the target is rasterized twice, keeping the second pass
//!   ([`orchestrator::capture_raster`]).
//! - **Dispatching**: share sheet or download ([`dispatch`]).
//! - **Cleanup**: swapped sources and the overlay are restored no matter how
//!   the attempt ended ([`session`]).

pub mod config;
pub mod dispatch;
pub mod error;
pub mod inline;
pub mod orchestrator;
pub mod platform;
pub mod session;
pub mod timeout;
pub mod wait;

pub use config::CaptureConfig;
pub use dispatch::{Delivery, DeliveryRoute, Dispatcher};
pub use error::{CaptureError, CaptureStep, FetchError};
pub use inline::ImageInliner;
pub use orchestrator::{CaptureDeps, CaptureOrchestrator, CaptureOutcome};
pub use platform::{
    CaptureImage, CaptureTarget, FetchedImage, FileSaver, ImageFetcher, Platform, RasterOptions, Rasterizer,
    SharePayload, ShareResult, ShareTarget, Timer,
};
