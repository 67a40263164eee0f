use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::withdrawal::{WithdrawalRequest, WithdrawalStatus};

/// Body of `POST /withdrawals`. Fields are optional so missing ones map to a
/// 400 instead of a deserialization rejection.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalBody {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(alias = "phoneNumber", alias = "cardNumber")]
    pub destination: Option<String>,
    pub bank_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalResponse {
    pub success: bool,
    pub withdrawal_id: i64,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListWithdrawalsResponse {
    pub success: bool,
    #[serde(default)]
    pub withdrawals: Vec<WithdrawalRequest>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusBody {
    pub id: i64,
    pub status: WithdrawalStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub withdrawal: WithdrawalRequest,
}

/// Failure body shared by every route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelegramUpdate {
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelegramMessage {
    #[serde(default)]
    pub text: String,
    pub chat: TelegramChat,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}
