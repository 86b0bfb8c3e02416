use crate::{errors::InsightError, types::Insight};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for persisting `Insight` records.
///
/// The pipeline only relies on these operations, never on a query language.
/// Listings are ordered newest first by `created_at`.
#[async_trait]
pub trait InsightStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the store (e.g., "Memory", "SQLite").
    fn name(&self) -> &str;

    /// Inserts a new record. Fails if the id is already taken.
    async fn create(&self, insight: &Insight) -> Result<(), InsightError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Insight>, InsightError>;

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Insight>, InsightError>;

    async fn find_all(&self) -> Result<Vec<Insight>, InsightError>;

    /// Replaces the stored record with the same id. Fails with `NotFound` if absent.
    async fn update(&self, insight: &Insight) -> Result<(), InsightError>;

    /// Removes a record, returning whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, InsightError>;
}

dyn_clone::clone_trait_object!(InsightStore);
