//! # Storage Traits
//!
//! Abstractions the domain layer depends on instead of a concrete backend.

use anyhow::Result;
use async_trait::async_trait;
use shared::Card;

/// Interface for card persistence
#[async_trait]
pub trait CardStorage: Send + Sync {
    /// Store a new card.
    /// Returns false, leaving the stored card untouched, when the id is taken.
    async fn store_card(&self, card: &Card) -> Result<bool>;

    /// Retrieve a card by ID
    async fn get_card(&self, card_id: &str) -> Result<Option<Card>>;

    /// Replace `current` with `updated`, but only if the stored record still
    /// equals `current`. Returns false when it changed in between.
    async fn replace_card(&self, current: &Card, updated: &Card) -> Result<bool>;
}
