pub mod client;
pub mod database;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::withdrawal::{
    NewWithdrawal, StatusFilter, TransitionError, WithdrawalRequest, WithdrawalStatus,
};

pub use database::PgWithdrawalStore;
pub use memory::MemoryWithdrawalStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Withdrawal {0} not found")]
    NotFound(i64),

    #[error("Withdrawal {id}: {source}")]
    Transition {
        id: i64,
        #[source]
        source: TransitionError,
    },

    #[error("Corrupt withdrawal record: {0}")]
    Corrupt(String),
}

/// System of record for withdrawal requests.
///
/// `transition` must be atomic per id: of two concurrent decisions on the same
/// pending request, exactly one succeeds and the other sees
/// [`TransitionError::AlreadyFinal`].
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    async fn insert(&self, withdrawal: &NewWithdrawal) -> Result<WithdrawalRequest, StoreError>;

    /// Newest first.
    async fn list(&self, filter: StatusFilter) -> Result<Vec<WithdrawalRequest>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<WithdrawalRequest>, StoreError>;

    async fn transition(
        &self,
        id: i64,
        status: WithdrawalStatus,
    ) -> Result<WithdrawalRequest, StoreError>;
}
