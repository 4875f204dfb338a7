//! # IO Module
//!
//! HTTP surface of the server: JSON endpoints under `/api` and the page
//! fallback that serves the client app.

pub mod rest;

pub use rest::*;
