use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a withdrawal request.
///
/// Every request starts as `Pending` and moves to exactly one of the final
/// states. Nothing leaves a final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("withdrawal is already {0}")]
    AlreadyFinal(WithdrawalStatus),

    #[error("cannot move a withdrawal back to {0}")]
    InvalidTarget(WithdrawalStatus),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown withdrawal status: {0}")]
pub struct UnknownStatus(pub String);

impl WithdrawalStatus {
    pub const ALL: [WithdrawalStatus; 3] = [
        WithdrawalStatus::Pending,
        WithdrawalStatus::Approved,
        WithdrawalStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }

    /// Validates a moderation decision against the current state.
    pub fn transition_to(self, next: WithdrawalStatus) -> Result<WithdrawalStatus, TransitionError> {
        if self.is_final() {
            return Err(TransitionError::AlreadyFinal(self));
        }
        if !next.is_final() {
            return Err(TransitionError::InvalidTarget(next));
        }
        Ok(next)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Status selector for listing. `All` sends no server-side filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn status(&self) -> Option<WithdrawalStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(WithdrawalStatus::Pending),
            StatusFilter::Approved => Some(WithdrawalStatus::Approved),
            StatusFilter::Rejected => Some(WithdrawalStatus::Rejected),
        }
    }

    pub fn matches(&self, status: WithdrawalStatus) -> bool {
        self.status().map_or(true, |wanted| wanted == status)
    }

    pub fn as_str(&self) -> &'static str {
        match self.status() {
            Some(status) => status.as_str(),
            None => "all",
        }
    }
}

impl From<WithdrawalStatus> for StatusFilter {
    fn from(status: WithdrawalStatus) -> Self {
        match status {
            WithdrawalStatus::Pending => StatusFilter::Pending,
            WithdrawalStatus::Approved => StatusFilter::Approved,
            WithdrawalStatus::Rejected => StatusFilter::Rejected,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse::<WithdrawalStatus>().map(StatusFilter::from)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the payout is addressed in a given deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutMethod {
    /// Instant transfer to a phone number at a named bank.
    #[default]
    Sbp,
    Card,
}

impl PayoutMethod {
    pub fn destination_label(&self) -> &'static str {
        match self {
            PayoutMethod::Sbp => "phone",
            PayoutMethod::Card => "card",
        }
    }
}

/// A withdrawal record as owned by the processing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: i64,
    pub user_name: String,
    pub user_email: String,
    pub amount: Decimal,
    #[serde(alias = "phoneNumber", alias = "cardNumber")]
    pub destination: String,
    pub bank_name: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WithdrawalRequest {
    pub fn masked_destination(&self) -> String {
        mask_destination(&self.destination)
    }
}

/// Fields needed to open a new withdrawal request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawal {
    pub user_name: String,
    pub user_email: String,
    pub amount: Decimal,
    pub destination: String,
    pub bank_name: String,
}

/// Largest number of fractional digits an amount may carry (kopecks).
pub const AMOUNT_SCALE: u32 = 2;

/// Exclusive upper bound on a single amount, matching `NUMERIC(14, 2)`.
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must be positive")]
    NotPositive,

    #[error("amount must have at most {} decimal places", AMOUNT_SCALE)]
    TooPrecise,

    #[error("amount must be below {}", AMOUNT_LIMIT)]
    TooLarge,
}

/// Checks an amount against what the store can hold exactly.
pub fn check_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(AmountError::NotPositive);
    }
    let amount = amount.normalize();
    if amount.scale() > AMOUNT_SCALE {
        return Err(AmountError::TooPrecise);
    }
    if amount >= AMOUNT_LIMIT {
        return Err(AmountError::TooLarge);
    }
    Ok(amount)
}

/// Keeps only the last four characters of a payout destination.
pub fn mask_destination(destination: &str) -> String {
    let chars: Vec<char> = destination.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("*{}", tail)
}
