use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{AppConfig, DatabaseConfig};
use crate::db::{MemoryWithdrawalStore, PgWithdrawalStore, WithdrawalStore};

pub type DbPool = PgPool;

/// Database client wrapper
#[derive(Clone)]
pub struct DBClient {
    pub pool: Arc<DbPool>,
}

impl DBClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.get_db_url()?)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&*self.pool).await?;
        Ok(())
    }
}

/// Picks the store for the configured deployment and prepares it for use.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn WithdrawalStore>> {
    match &config.database {
        Some(database) => {
            let client = DBClient::new(database).await?;
            info!("Running database migrations");
            client.run_migrations().await?;
            Ok(Arc::new(PgWithdrawalStore::new(client.pool.as_ref().clone())))
        }
        None => {
            warn!("No database configured, withdrawals are kept in memory only");
            Ok(Arc::new(MemoryWithdrawalStore::new()))
        }
    }
}
