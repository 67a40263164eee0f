use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use super::{StoreError, WithdrawalStore};
use crate::withdrawal::{
    NewWithdrawal, StatusFilter, TransitionError, WithdrawalRequest, WithdrawalStatus,
};

const SELECT_COLUMNS: &str = "id, user_name, user_email, amount, destination, bank_name, status, \
     created_at, updated_at";

#[derive(Debug, FromRow)]
struct WithdrawalRow {
    id: i64,
    user_name: String,
    user_email: String,
    amount: Decimal,
    destination: String,
    bank_name: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<WithdrawalRow> for WithdrawalRequest {
    type Error = StoreError;

    fn try_from(row: WithdrawalRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<WithdrawalStatus>()
            .map_err(|e| StoreError::Corrupt(format!("row {}: {}", row.id, e)))?;

        Ok(WithdrawalRequest {
            id: row.id,
            user_name: row.user_name,
            user_email: row.user_email,
            amount: row.amount,
            destination: row.destination,
            bank_name: row.bank_name,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Postgres-backed store over the `withdrawals` table.
#[derive(Clone)]
pub struct PgWithdrawalStore {
    pool: PgPool,
}

impl PgWithdrawalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WithdrawalStore for PgWithdrawalStore {
    async fn insert(&self, withdrawal: &NewWithdrawal) -> Result<WithdrawalRequest, StoreError> {
        let query = format!(
            r#"
            INSERT INTO withdrawals (user_name, user_email, amount, destination, bank_name, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let row = sqlx::query_as::<_, WithdrawalRow>(&query)
            .bind(&withdrawal.user_name)
            .bind(&withdrawal.user_email)
            .bind(withdrawal.amount)
            .bind(&withdrawal.destination)
            .bind(&withdrawal.bank_name)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn list(&self, filter: StatusFilter) -> Result<Vec<WithdrawalRequest>, StoreError> {
        let rows = match filter.status() {
            None => {
                let query = format!(
                    "SELECT {} FROM withdrawals ORDER BY created_at DESC, id DESC",
                    SELECT_COLUMNS
                );
                sqlx::query_as::<_, WithdrawalRow>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(status) => {
                let query = format!(
                    "SELECT {} FROM withdrawals WHERE status = $1 ORDER BY created_at DESC, id DESC",
                    SELECT_COLUMNS
                );
                sqlx::query_as::<_, WithdrawalRow>(&query)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(WithdrawalRequest::try_from).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<WithdrawalRequest>, StoreError> {
        let query = format!("SELECT {} FROM withdrawals WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, WithdrawalRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(WithdrawalRequest::try_from).transpose()
    }

    async fn transition(
        &self,
        id: i64,
        status: WithdrawalStatus,
    ) -> Result<WithdrawalRequest, StoreError> {
        if !status.is_final() {
            return Err(StoreError::Transition {
                id,
                source: TransitionError::InvalidTarget(status),
            });
        }

        // The status guard in WHERE makes the first decision win.
        let query = format!(
            r#"
            UPDATE withdrawals
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = 'pending'
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let updated = sqlx::query_as::<_, WithdrawalRow>(&query)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => row.try_into(),
            None => match self.get(id).await? {
                Some(current) => Err(StoreError::Transition {
                    id,
                    source: current
                        .status
                        .transition_to(status)
                        .err()
                        .unwrap_or(TransitionError::AlreadyFinal(current.status)),
                }),
                None => Err(StoreError::NotFound(id)),
            },
        }
    }
}
