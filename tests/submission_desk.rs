#[path = "utils.rs"]
mod utils;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use utils::{MockProcessing, RecordingNotifier};
use withdrawal_desk::auth::SessionCredential;
use withdrawal_desk::desk::{
    DeskError, Notice, SubmissionDesk, UserProfile, ValidationError, WithdrawalDraft,
};
use withdrawal_desk::http::{Acknowledgement, ProcessingService, TransportError, WithdrawalList};
use withdrawal_desk::withdrawal::{NewWithdrawal, StatusFilter, WithdrawalStatus};

fn user() -> UserProfile {
    UserProfile {
        name: "Anna Petrova".to_string(),
        email: "anna@example.com".to_string(),
    }
}

fn desk(service: MockProcessing, notifier: Arc<RecordingNotifier>) -> SubmissionDesk {
    SubmissionDesk::new(Arc::new(service), notifier, user())
        .with_review_delay(Duration::from_secs(5))
}

#[tokio::test]
async fn test_empty_fields_never_reach_the_service() {
    let mut service = MockProcessing::new();
    service.expect_create_withdrawal().times(0);
    let notifier = Arc::new(RecordingNotifier::default());
    let desk = desk(service, notifier.clone());

    let drafts = [
        WithdrawalDraft::new("", "+7 999 111-22-33", "sber"),
        WithdrawalDraft::new("500", "", "sber"),
        WithdrawalDraft::new("500", "+7 999 111-22-33", ""),
        WithdrawalDraft::default(),
    ];

    for mut draft in drafts {
        let before = draft.clone();
        let err = desk.submit(&mut draft).await.unwrap_err();
        assert!(matches!(err, DeskError::Validation(ValidationError::Missing(_))));
        assert_eq!(draft, before, "rejected drafts keep their input");
    }

    assert_eq!(notifier.notices(), vec![Notice::MissingFields; 4]);
}

#[tokio::test(start_paused = true)]
async fn test_accepted_submission_resolves_bank_and_notifies_twice() {
    let mut service = MockProcessing::new();
    service
        .expect_create_withdrawal()
        .withf(|withdrawal: &NewWithdrawal| {
            withdrawal.amount == Decimal::from(500)
                && withdrawal.destination == "+7 999 111-22-33"
                && withdrawal.bank_name == "Сбербанк"
                && withdrawal.user_name == "Anna Petrova"
                && withdrawal.user_email == "anna@example.com"
        })
        .times(1)
        .returning(|_| Ok(Acknowledgement::accepted()));
    let notifier = Arc::new(RecordingNotifier::default());
    let desk = desk(service, notifier.clone());

    let mut draft = WithdrawalDraft::new("500", "+7 999 111-22-33", "sber");
    let accepted = desk.submit(&mut draft).await.unwrap();

    assert_eq!(accepted.bank_name, "Сбербанк");
    assert!(draft.is_empty(), "accepted drafts are cleared");
    assert_eq!(
        notifier.notices(),
        vec![Notice::RequestAccepted {
            amount: Decimal::from(500),
            destination: "*2-33".to_string(),
        }]
    );

    let started = tokio::time::Instant::now();
    accepted.review_notice.await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(5));

    let notices = notifier.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[1], Notice::UnderReview);
}

#[tokio::test]
async fn test_service_refusal_is_reported_without_retry() {
    let mut service = MockProcessing::new();
    service
        .expect_create_withdrawal()
        .times(1)
        .returning(|_| Ok(Acknowledgement::refused("Missing required fields")));
    let notifier = Arc::new(RecordingNotifier::default());
    let desk = desk(service, notifier.clone());

    let mut draft = WithdrawalDraft::new("500", "+7 999 111-22-33", "sber");
    let err = desk.submit(&mut draft).await.unwrap_err();

    assert!(matches!(err, DeskError::ServiceRejected(ref reason) if reason == "Missing required fields"));
    assert_eq!(notifier.notices(), vec![Notice::RequestFailed]);
    assert!(!draft.is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_reported_without_retry() {
    let mut service = MockProcessing::new();
    service
        .expect_create_withdrawal()
        .times(1)
        .returning(|_| Err(TransportError::Unreachable("connection refused".to_string())));
    let notifier = Arc::new(RecordingNotifier::default());
    let desk = desk(service, notifier.clone());

    let mut draft = WithdrawalDraft::new("500", "+7 999 111-22-33", "sber");
    let err = desk.submit(&mut draft).await.unwrap_err();

    assert!(matches!(err, DeskError::Transport(TransportError::Unreachable(_))));
    assert_eq!(notifier.notices(), vec![Notice::ConnectionProblem]);
}

#[tokio::test]
async fn test_unknown_bank_code_passes_through() {
    let mut service = MockProcessing::new();
    service
        .expect_create_withdrawal()
        .withf(|withdrawal: &NewWithdrawal| withdrawal.bank_name == "Точка")
        .times(1)
        .returning(|_| Ok(Acknowledgement::accepted()));
    let desk = desk(service, Arc::new(RecordingNotifier::default()));

    let mut draft = WithdrawalDraft::new("1200", "+7 900 000-00-00", "Точка");
    assert!(desk.submit(&mut draft).await.is_ok());
}

/// Holds every create call until released.
struct GatedService {
    release: Mutex<Option<oneshot::Receiver<()>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl ProcessingService for GatedService {
    async fn create_withdrawal(
        &self,
        _withdrawal: &NewWithdrawal,
    ) -> Result<Acknowledgement, TransportError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(release) = self.release.lock().await.take() {
            let _ = release.await;
        }
        Ok(Acknowledgement::accepted())
    }

    async fn list_withdrawals(
        &self,
        _credential: &SessionCredential,
        _filter: StatusFilter,
    ) -> Result<WithdrawalList, TransportError> {
        unimplemented!("not used by the submission desk")
    }

    async fn update_status(
        &self,
        _credential: &SessionCredential,
        _id: i64,
        _status: WithdrawalStatus,
    ) -> Result<Acknowledgement, TransportError> {
        unimplemented!("not used by the submission desk")
    }
}

#[tokio::test]
async fn test_double_submit_is_refused_while_in_flight() {
    let (release_tx, release_rx) = oneshot::channel();
    let service = Arc::new(GatedService {
        release: Mutex::new(Some(release_rx)),
        calls: Default::default(),
    });
    let desk = Arc::new(SubmissionDesk::new(
        service.clone(),
        Arc::new(RecordingNotifier::default()),
        user(),
    ));

    let first = {
        let desk = desk.clone();
        tokio::spawn(async move {
            let mut draft = WithdrawalDraft::new("500", "+7 999 111-22-33", "sber");
            desk.submit(&mut draft).await.map(|_| ())
        })
    };

    while service.calls.load(std::sync::atomic::Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let mut second = WithdrawalDraft::new("500", "+7 999 111-22-33", "sber");
    assert!(matches!(desk.submit(&mut second).await, Err(DeskError::InFlight)));

    release_tx.send(()).unwrap();
    first.await.unwrap().unwrap();
    assert_eq!(service.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

    // Guard is released once the first call resolves.
    assert!(desk.submit(&mut second).await.is_ok());
}
