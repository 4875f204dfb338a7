//! # REST API Interface Layer
//!
//! Translates HTTP requests into service calls and service errors into
//! `ErrorResponse` bodies with matching status codes.

pub mod card_apis;
pub mod error_response;
pub mod file_apis;
pub mod health_apis;
pub mod logging_apis;
pub mod page_apis;
pub mod upload_apis;

pub use card_apis::*;
pub use file_apis::*;
pub use health_apis::*;
pub use logging_apis::*;
pub use page_apis::*;
pub use upload_apis::*;
