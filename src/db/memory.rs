use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{StoreError, WithdrawalStore};
use crate::withdrawal::{NewWithdrawal, StatusFilter, WithdrawalRequest, WithdrawalStatus};

#[derive(Default)]
struct Records {
    next_id: i64,
    rows: BTreeMap<i64, WithdrawalRequest>,
}

/// Process-local store. Records are lost on restart.
#[derive(Default)]
pub struct MemoryWithdrawalStore {
    records: RwLock<Records>,
}

impl MemoryWithdrawalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WithdrawalStore for MemoryWithdrawalStore {
    async fn insert(&self, withdrawal: &NewWithdrawal) -> Result<WithdrawalRequest, StoreError> {
        let mut records = self.records.write().await;
        records.next_id += 1;
        let now = Utc::now();

        let request = WithdrawalRequest {
            id: records.next_id,
            user_name: withdrawal.user_name.clone(),
            user_email: withdrawal.user_email.clone(),
            amount: withdrawal.amount,
            destination: withdrawal.destination.clone(),
            bank_name: withdrawal.bank_name.clone(),
            status: WithdrawalStatus::Pending,
            created_at: now,
            updated_at: Some(now),
        };
        records.rows.insert(request.id, request.clone());

        Ok(request)
    }

    async fn list(&self, filter: StatusFilter) -> Result<Vec<WithdrawalRequest>, StoreError> {
        let records = self.records.read().await;
        let mut rows: Vec<WithdrawalRequest> = records
            .rows
            .values()
            .filter(|row| filter.matches(row.status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<WithdrawalRequest>, StoreError> {
        Ok(self.records.read().await.rows.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: i64,
        status: WithdrawalStatus,
    ) -> Result<WithdrawalRequest, StoreError> {
        let mut records = self.records.write().await;
        let row = records.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        row.status = row
            .status
            .transition_to(status)
            .map_err(|source| StoreError::Transition { id, source })?;
        row.updated_at = Some(Utc::now());

        Ok(row.clone())
    }
}
