use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::auth::{OperatorVerifier, SessionCredential};
use crate::desk::error::DeskError;
use crate::desk::notice::{Notice, Notifier};
use crate::desk::summary::StatusSummary;
use crate::http::ProcessingService;
use crate::withdrawal::{StatusFilter, WithdrawalRequest, WithdrawalStatus};

/// Operator access. There is no way back to `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(SessionCredential),
}

/// What a list fetch did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// A later fetch already landed, or the filter changed since this one was
    /// issued. The response was dropped.
    Superseded,
    /// The fetch failed. The previous rows are still displayed.
    Stale { reason: String },
}

/// A successful decision together with the refetch it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updated {
    pub id: i64,
    pub status: WithdrawalStatus,
    pub refresh: RefreshOutcome,
}

#[derive(Debug, Default)]
struct ViewState {
    filter: StatusFilter,
    rows: Vec<WithdrawalRequest>,
    /// Sequence number of the fetch the rows came from.
    applied_seq: u64,
}

/// Operator view over the withdrawal queue.
///
/// Holds a read-through copy of the service's records and never patches it
/// locally: every change is followed by a refetch.
pub struct ModerationDesk {
    service: Arc<dyn ProcessingService>,
    verifier: Arc<dyn OperatorVerifier>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<SessionState>,
    view: Mutex<ViewState>,
    fetch_seq: AtomicU64,
    in_flight: Mutex<HashSet<i64>>,
}

impl ModerationDesk {
    pub fn new(
        service: Arc<dyn ProcessingService>,
        verifier: Arc<dyn OperatorVerifier>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            service,
            verifier,
            notifier,
            session: RwLock::new(SessionState::Unauthenticated),
            view: Mutex::new(ViewState::default()),
            fetch_seq: AtomicU64::new(0),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.session.read().await, SessionState::Authenticated(_))
    }

    /// Checks the operator key and loads the queue with the current filter.
    pub async fn sign_in(&self, key: &str) -> Result<RefreshOutcome, DeskError> {
        let filter = self.filter().await;
        self.sign_in_with(key, filter).await
    }

    /// Like [`sign_in`](Self::sign_in), but the first load already uses `filter`.
    pub async fn sign_in_with(
        &self,
        key: &str,
        filter: StatusFilter,
    ) -> Result<RefreshOutcome, DeskError> {
        let credential = match self.verifier.verify(key) {
            Ok(credential) => credential,
            Err(_) => {
                warn!("Operator sign-in rejected");
                self.notifier.notify(Notice::AccessDenied);
                return Err(DeskError::AccessDenied);
            }
        };

        *self.session.write().await = SessionState::Authenticated(credential.clone());
        info!("Operator signed in");

        self.view.lock().await.filter = filter;
        Ok(self.fetch(&credential, filter).await)
    }

    /// Switches the filter and reloads.
    pub async fn list_requests(&self, filter: StatusFilter) -> Result<RefreshOutcome, DeskError> {
        let credential = self.credential().await?;
        self.view.lock().await.filter = filter;
        Ok(self.fetch(&credential, filter).await)
    }

    /// Reloads with the current filter.
    pub async fn refresh(&self) -> Result<RefreshOutcome, DeskError> {
        let credential = self.credential().await?;
        let filter = self.filter().await;
        Ok(self.fetch(&credential, filter).await)
    }

    /// Approves or rejects a request that is pending in the current view.
    pub async fn update_status(
        &self,
        id: i64,
        status: WithdrawalStatus,
    ) -> Result<Updated, DeskError> {
        if !status.is_final() {
            return Err(DeskError::InvalidTarget(status));
        }
        let credential = self.credential().await?;

        let actionable = self
            .view
            .lock()
            .await
            .rows
            .iter()
            .any(|row| row.id == id && row.status == WithdrawalStatus::Pending);
        if !actionable {
            return Err(DeskError::NotActionable(id));
        }

        if !self.in_flight.lock().await.insert(id) {
            return Err(DeskError::InFlight);
        }
        let result = self.service.update_status(&credential, id, status).await;
        self.in_flight.lock().await.remove(&id);

        match result {
            Ok(ack) if ack.success => {
                info!("Withdrawal {} marked {}", id, status);
                self.notifier.notify(Notice::StatusUpdated { id, status });
                let filter = self.filter().await;
                let refresh = self.fetch(&credential, filter).await;
                Ok(Updated {
                    id,
                    status,
                    refresh,
                })
            }
            Ok(ack) => {
                let reason = ack
                    .message
                    .unwrap_or_else(|| "status update refused".to_string());
                warn!("Status update for withdrawal {} refused: {}", id, reason);
                self.notifier.notify(Notice::StatusUpdateFailed { id });
                Err(DeskError::ServiceRejected(reason))
            }
            Err(e) => {
                error!("Status update for withdrawal {} failed: {}", id, e);
                self.notifier.notify(Notice::StatusUpdateFailed { id });
                Err(DeskError::Transport(e))
            }
        }
    }

    pub async fn filter(&self) -> StatusFilter {
        self.view.lock().await.filter
    }

    /// Snapshot of the rows currently displayed.
    pub async fn requests(&self) -> Vec<WithdrawalRequest> {
        self.view.lock().await.rows.clone()
    }

    /// Recomputed from the displayed rows on every call.
    pub async fn summary(&self) -> StatusSummary {
        StatusSummary::from_requests(&self.view.lock().await.rows)
    }

    async fn credential(&self) -> Result<SessionCredential, DeskError> {
        match &*self.session.read().await {
            SessionState::Authenticated(credential) => Ok(credential.clone()),
            SessionState::Unauthenticated => Err(DeskError::NotAuthenticated),
        }
    }

    async fn fetch(&self, credential: &SessionCredential, filter: StatusFilter) -> RefreshOutcome {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let list = match self.service.list_withdrawals(credential, filter).await {
            Ok(list) if list.success => list,
            Ok(_) => {
                warn!("Withdrawal list ({}) refused, keeping stale view", filter);
                return RefreshOutcome::Stale {
                    reason: "list refused by processing service".to_string(),
                };
            }
            Err(e) => {
                warn!("Withdrawal list ({}) failed, keeping stale view: {}", filter, e);
                return RefreshOutcome::Stale {
                    reason: e.to_string(),
                };
            }
        };

        let mut view = self.view.lock().await;
        if seq <= view.applied_seq {
            debug!("Dropping list response #{} (already showing #{})", seq, view.applied_seq);
            return RefreshOutcome::Superseded;
        }
        if filter != view.filter {
            debug!(
                "Dropping list response #{} for {} (filter is now {})",
                seq, filter, view.filter
            );
            return RefreshOutcome::Superseded;
        }

        let mut rows = list.withdrawals;
        let received = rows.len();
        rows.retain(|row| filter.matches(row.status));
        if rows.len() != received {
            warn!(
                "Dropped {} rows not matching filter {}",
                received - rows.len(),
                filter
            );
        }

        view.applied_seq = seq;
        view.rows = rows;

        RefreshOutcome::Applied {
            count: view.rows.len(),
        }
    }
}
