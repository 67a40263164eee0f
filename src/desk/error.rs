use thiserror::Error;

use crate::http::TransportError;
use crate::withdrawal::{AmountError, WithdrawalStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("amount must be a positive number, got {0:?}")]
    InvalidAmount(String),

    #[error(transparent)]
    AmountOutOfRange(#[from] AmountError),
}

/// Failure of a single desk operation. None of these are retried.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("processing service refused the request: {0}")]
    ServiceRejected(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("operator is not signed in")]
    NotAuthenticated,

    #[error("operator key rejected")]
    AccessDenied,

    #[error("withdrawal {0} is not pending in the current view")]
    NotActionable(i64),

    #[error("{0} is not a moderation decision")]
    InvalidTarget(WithdrawalStatus),

    #[error("the same operation is already in flight")]
    InFlight,
}
