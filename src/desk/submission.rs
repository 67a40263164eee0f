use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::banks::resolve_bank_name;
use crate::desk::error::{DeskError, ValidationError};
use crate::desk::notice::{Notice, Notifier};
use crate::http::ProcessingService;
use crate::withdrawal::{check_amount, mask_destination, AmountError, NewWithdrawal};

pub const DEFAULT_REVIEW_NOTICE_DELAY: Duration = Duration::from_secs(3);

/// The signed-in end user submitting withdrawals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalDraft {
    pub amount: String,
    pub destination: String,
    pub bank_code: String,
}

impl WithdrawalDraft {
    pub fn new(
        amount: impl Into<String>,
        destination: impl Into<String>,
        bank_code: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            destination: destination.into(),
            bank_code: bank_code.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_empty() && self.destination.is_empty() && self.bank_code.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn validate(&self, user: &UserProfile) -> Result<NewWithdrawal, ValidationError> {
        let amount = self.amount.trim();
        let destination = self.destination.trim();
        let bank_code = self.bank_code.trim();

        if amount.is_empty() {
            return Err(ValidationError::Missing("amount"));
        }
        if destination.is_empty() {
            return Err(ValidationError::Missing("destination"));
        }
        if bank_code.is_empty() {
            return Err(ValidationError::Missing("bank"));
        }

        let amount = match Decimal::from_str(amount).map(check_amount) {
            Ok(Ok(amount)) => amount,
            Ok(Err(AmountError::NotPositive)) | Err(_) => {
                return Err(ValidationError::InvalidAmount(amount.to_string()))
            }
            Ok(Err(e)) => return Err(ValidationError::AmountOutOfRange(e)),
        };

        Ok(NewWithdrawal {
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            amount,
            destination: destination.to_string(),
            bank_name: resolve_bank_name(bank_code).to_string(),
        })
    }
}

/// Outcome of an accepted submission.
#[derive(Debug)]
pub struct Accepted {
    pub amount: Decimal,
    pub bank_name: String,
    /// Fires the delayed "under review" notice. Dropping it does not cancel it.
    pub review_notice: JoinHandle<()>,
}

struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Collects withdrawal requests from an authenticated user and hands them to
/// the processing service.
pub struct SubmissionDesk {
    service: Arc<dyn ProcessingService>,
    notifier: Arc<dyn Notifier>,
    user: UserProfile,
    review_delay: Duration,
    submitting: AtomicBool,
}

impl SubmissionDesk {
    pub fn new(
        service: Arc<dyn ProcessingService>,
        notifier: Arc<dyn Notifier>,
        user: UserProfile,
    ) -> Self {
        Self {
            service,
            notifier,
            user,
            review_delay: DEFAULT_REVIEW_NOTICE_DELAY,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn with_review_delay(mut self, delay: Duration) -> Self {
        self.review_delay = delay;
        self
    }

    /// Validates the draft, creates the request and clears the draft on
    /// success. Validation failures never reach the service.
    pub async fn submit(&self, draft: &mut WithdrawalDraft) -> Result<Accepted, DeskError> {
        let withdrawal = match draft.validate(&self.user) {
            Ok(withdrawal) => withdrawal,
            Err(e) => {
                self.notifier.notify(match e {
                    ValidationError::Missing(_) => Notice::MissingFields,
                    ValidationError::InvalidAmount(_) | ValidationError::AmountOutOfRange(_) => {
                        Notice::InvalidAmount
                    }
                });
                return Err(e.into());
            }
        };

        let _guard = SubmitGuard::acquire(&self.submitting).ok_or(DeskError::InFlight)?;

        info!(
            "Submitting withdrawal of {} to {} ({})",
            withdrawal.amount,
            mask_destination(&withdrawal.destination),
            withdrawal.bank_name
        );

        match self.service.create_withdrawal(&withdrawal).await {
            Ok(ack) if ack.success => {
                self.notifier.notify(Notice::RequestAccepted {
                    amount: withdrawal.amount,
                    destination: mask_destination(&withdrawal.destination),
                });
                draft.clear();

                Ok(Accepted {
                    amount: withdrawal.amount,
                    bank_name: withdrawal.bank_name,
                    review_notice: self.schedule_review_notice(),
                })
            }
            Ok(ack) => {
                let reason = ack
                    .message
                    .unwrap_or_else(|| "request not accepted".to_string());
                warn!("Processing service refused withdrawal: {}", reason);
                self.notifier.notify(Notice::RequestFailed);
                Err(DeskError::ServiceRejected(reason))
            }
            Err(e) => {
                error!("Failed to reach processing service: {}", e);
                self.notifier.notify(Notice::ConnectionProblem);
                Err(DeskError::Transport(e))
            }
        }
    }

    fn schedule_review_notice(&self) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        let delay = self.review_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            notifier.notify(Notice::UnderReview);
        })
    }
}
