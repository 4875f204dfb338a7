//! # Domain Module
//!
//! Card rules and file handling, independent of HTTP.
//!
//! - [`CardService`]: create cards, load them with signed image links, record
//!   the receiver's single gift choice
//! - [`UploadService`]: accept image uploads and serve them through signed links
//! - [`MetaRewriter`]: social preview tags for shared card links

pub mod card_service;
pub mod errors;
pub mod meta_tags;
pub mod signed_url;
pub mod upload_service;

pub use card_service::CardService;
pub use errors::CardError;
pub use meta_tags::MetaRewriter;
pub use signed_url::UrlSigner;
pub use upload_service::{UploadService, UploadedFile};
