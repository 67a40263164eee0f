#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use withdrawal_desk::api::routes::{create_router, AppState};
use withdrawal_desk::auth::{SessionCredential, StaticKeyVerifier};
use withdrawal_desk::db::{MemoryWithdrawalStore, WithdrawalStore};
use withdrawal_desk::desk::{Notice, Notifier};
use withdrawal_desk::http::{Acknowledgement, ProcessingService, TransportError, WithdrawalList};
use withdrawal_desk::telegram::TelegramClient;
use withdrawal_desk::withdrawal::{
    NewWithdrawal, StatusFilter, WithdrawalRequest, WithdrawalStatus,
};

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

mock! {
    pub Processing {}

    #[async_trait]
    impl ProcessingService for Processing {
        async fn create_withdrawal(
            &self,
            withdrawal: &NewWithdrawal,
        ) -> Result<Acknowledgement, TransportError>;

        async fn list_withdrawals(
            &self,
            credential: &SessionCredential,
            filter: StatusFilter,
        ) -> Result<WithdrawalList, TransportError>;

        async fn update_status(
            &self,
            credential: &SessionCredential,
            id: i64,
            status: WithdrawalStatus,
        ) -> Result<Acknowledgement, TransportError>;
    }
}

/// Collects notices in delivery order.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn create_test_state(telegram: Option<TelegramClient>) -> Arc<AppState> {
    Arc::new(AppState {
        store: Arc::new(MemoryWithdrawalStore::new()),
        verifier: Arc::new(StaticKeyVerifier::new(TEST_ADMIN_KEY)),
        telegram,
    })
}

pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = create_test_state(None);
    (create_router(state.clone()), state)
}

pub fn new_withdrawal(amount: &str) -> NewWithdrawal {
    NewWithdrawal {
        user_name: "Anna Petrova".to_string(),
        user_email: "anna@example.com".to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        destination: "+7 999 111-22-33".to_string(),
        bank_name: "Сбербанк".to_string(),
    }
}

pub async fn seed(store: &dyn WithdrawalStore, amounts: &[&str]) -> Vec<WithdrawalRequest> {
    let mut created = Vec::new();
    for amount in amounts {
        created.push(store.insert(&new_withdrawal(amount)).await.unwrap());
    }
    created
}

pub fn sample_request(id: i64, amount: &str, status: WithdrawalStatus) -> WithdrawalRequest {
    WithdrawalRequest {
        id,
        user_name: format!("user{}", id),
        user_email: format!("user{}@example.com", id),
        amount: Decimal::from_str(amount).unwrap(),
        destination: "4276 1234 5678 9012".to_string(),
        bank_name: "Тинькофф".to_string(),
        status,
        created_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
        updated_at: None,
    }
}
