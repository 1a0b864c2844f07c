use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    NewRegistration, PaymentUpdate, RegistrationPatch, RegistrationRow, RegistrationStats,
    TrackingId,
};
use crate::pagination::LimitOffset;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with this `(id, team_number)` already exists. The allocator
    /// treats this as a lost check-then-act race and proposes a fresh id.
    #[error("duplicate tracking id")]
    DuplicateId,

    #[error("repository error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                return StoreError::DuplicateId;
            }
        }
        StoreError::Backend(e.to_string())
    }
}

/// The registration datastore as the lifecycle sees it. Implemented by the
/// Postgres repo in production and by `memory::MemoryStore` in tests.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Every team row filed under `id`, ordered by team number. Empty when
    /// the identifier is unused; the allocator probes candidate ids through
    /// this same call.
    async fn find_by_tracking_id(
        &self,
        id: &TrackingId,
    ) -> Result<Vec<RegistrationRow>, StoreError>;

    /// Insert all team rows of one event atomically: either every row lands
    /// or none do.
    async fn insert_event(&self, rows: &[NewRegistration]) -> Result<(), StoreError>;

    /// Apply the payment finalization to every row of the event that has not
    /// been finalized yet. Returns the number of rows updated; zero means
    /// the event is missing or already finalized.
    async fn record_payment(
        &self,
        id: &TrackingId,
        update: &PaymentUpdate,
    ) -> Result<u64, StoreError>;

    /// Admin edit across the event's rows. Returns rows updated.
    async fn apply_patch(
        &self,
        id: &TrackingId,
        patch: &RegistrationPatch,
    ) -> Result<u64, StoreError>;

    /// Delete one event (all its team rows). Returns rows deleted.
    async fn delete_event(&self, id: &TrackingId) -> Result<u64, StoreError>;

    /// Destructive admin operation: drop every registration.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Newest first.
    async fn list_all(
        &self,
        page: Option<LimitOffset>,
    ) -> Result<Vec<RegistrationRow>, StoreError>;

    async fn stats(&self) -> Result<RegistrationStats, StoreError>;
}
