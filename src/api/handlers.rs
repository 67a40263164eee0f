use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::api::models::{
    CreateWithdrawalBody, CreateWithdrawalResponse, ListQuery, ListWithdrawalsResponse,
    TelegramUpdate, UpdateStatusBody, UpdateStatusResponse,
};
use crate::api::routes::AppState;
use crate::auth::ADMIN_KEY_HEADER;
use crate::telegram::{decision_reply, new_request_alert, parse_command};
use crate::withdrawal::{check_amount, AmountError, NewWithdrawal, StatusFilter};

pub async fn handle_index() -> Json<Value> {
    Json(json!({ "message": "withdrawal desk processing service" }))
}

pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn require_operator(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let presented = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    state
        .verifier
        .verify(presented)
        .map(|_| ())
        .map_err(|_| ApiError::Unauthorized)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn handle_create_withdrawal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWithdrawalBody>,
) -> Result<Json<CreateWithdrawalResponse>, ApiError> {
    let (Some(user_name), Some(user_email), Some(amount), Some(destination), Some(bank_name)) = (
        non_empty(payload.user_name),
        non_empty(payload.user_email),
        payload.amount,
        non_empty(payload.destination),
        non_empty(payload.bank_name),
    ) else {
        return Err(ApiError::MissingFields);
    };

    let amount = check_amount(amount).map_err(|e| match e {
        AmountError::NotPositive => ApiError::NonPositiveAmount,
        other => ApiError::AmountOutOfRange(other),
    })?;

    let request = state
        .store
        .insert(&NewWithdrawal {
            user_name,
            user_email,
            amount,
            destination,
            bank_name,
        })
        .await?;

    info!(
        "Withdrawal {} created: {} to {}",
        request.id,
        request.amount,
        request.masked_destination()
    );

    if let Some(telegram) = state.telegram.clone() {
        let alert = new_request_alert(&request);
        tokio::spawn(async move {
            if let Err(e) = telegram.notify_admin(&alert).await {
                warn!("Telegram notification failed: {}", e);
            }
        });
    }

    Ok(Json(CreateWithdrawalResponse {
        success: true,
        withdrawal_id: request.id,
        message: "Withdrawal request created".to_string(),
    }))
}

pub async fn handle_list_withdrawals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListWithdrawalsResponse>, ApiError> {
    require_operator(&state, &headers)?;

    let filter = match query.status.as_deref() {
        None | Some("") => StatusFilter::All,
        Some(raw) => raw
            .parse::<StatusFilter>()
            .map_err(|_| ApiError::InvalidStatus(raw.to_string()))?,
    };

    let withdrawals = state.store.list(filter).await?;

    Ok(Json(ListWithdrawalsResponse {
        success: true,
        total: withdrawals.len(),
        withdrawals,
    }))
}

pub async fn handle_update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateStatusBody>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    require_operator(&state, &headers)?;

    let withdrawal = state.store.transition(payload.id, payload.status).await?;
    info!("Withdrawal {} marked {}", withdrawal.id, withdrawal.status);

    Ok(Json(UpdateStatusResponse {
        success: true,
        withdrawal,
    }))
}

/// Bot webhook. Always acknowledges so Telegram does not redeliver.
pub async fn handle_telegram_webhook(
    State(state): State<Arc<AppState>>,
    update: Result<Json<TelegramUpdate>, JsonRejection>,
) -> Json<Value> {
    let ack = Json(json!({ "ok": true }));

    let Json(update) = match update {
        Ok(update) => update,
        Err(rejection) => {
            warn!("Ignoring malformed Telegram update: {}", rejection.body_text());
            return ack;
        }
    };
    let Some(telegram) = state.telegram.as_ref() else {
        return ack;
    };
    let Some(message) = update.message else {
        return ack;
    };
    if message.chat.id != telegram.admin_chat_id() {
        warn!("Ignoring command from non-admin chat {}", message.chat.id);
        return ack;
    }
    let Some(command) = parse_command(&message.text) else {
        return ack;
    };

    match state.store.transition(command.id, command.status).await {
        Ok(withdrawal) => {
            info!("Withdrawal {} marked {} from Telegram", withdrawal.id, withdrawal.status);
            if let Err(e) = telegram
                .send_message(message.chat.id, &decision_reply(&withdrawal))
                .await
            {
                warn!("Telegram reply failed: {}", e);
            }
        }
        Err(e) => warn!("Telegram command for withdrawal {} failed: {}", command.id, e),
    }

    ack
}
