use rust_decimal::Decimal;
use std::fmt;
use tracing::{info, warn};

use crate::withdrawal::WithdrawalStatus;

/// Transient message shown to the end user or the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MissingFields,
    InvalidAmount,
    RequestAccepted { amount: Decimal, destination: String },
    /// Delayed courtesy after acceptance. The record was pending all along.
    UnderReview,
    RequestFailed,
    ConnectionProblem,
    AccessDenied,
    StatusUpdated { id: i64, status: WithdrawalStatus },
    StatusUpdateFailed { id: i64 },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::MissingFields
                | Notice::InvalidAmount
                | Notice::RequestFailed
                | Notice::ConnectionProblem
                | Notice::AccessDenied
                | Notice::StatusUpdateFailed { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MissingFields => write!(f, "Fill in every withdrawal field"),
            Notice::InvalidAmount => write!(f, "Enter a positive amount with at most two decimals"),
            Notice::RequestAccepted {
                amount,
                destination,
            } => write!(f, "Request accepted: {}₽ to {}", amount, destination),
            Notice::UnderReview => write!(f, "Your request is now under review"),
            Notice::RequestFailed => write!(f, "Could not create the request, retry later"),
            Notice::ConnectionProblem => write!(f, "Connection problem, retry later"),
            Notice::AccessDenied => write!(f, "Invalid operator key"),
            Notice::StatusUpdated { id, status } => write!(f, "Request #{} is now {}", id, status),
            Notice::StatusUpdateFailed { id } => write!(f, "Could not update request #{}", id),
        }
    }
}

/// Delivery channel for notices. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            warn!(target: "withdrawal_desk::notice", "{}", notice);
        } else {
            info!(target: "withdrawal_desk::notice", "{}", notice);
        }
    }
}
