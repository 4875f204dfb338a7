//! # Storage Module
//!
//! Persistence for cards and uploaded images.
//!
//! - **Cards** live as JSON documents in a SQLite key-value table, keyed
//!   `card:<cardId>`, behind the [`CardStorage`] trait.
//! - **Uploaded images** are plain files in a blob directory, addressed by
//!   `storage/<filename>` references.

pub mod blob_store;
pub mod card_repository;
pub mod db;
pub mod traits;

pub use blob_store::BlobStore;
pub use db::DbConnection;
pub use traits::CardStorage;
