use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    handle_create_withdrawal, handle_health, handle_index, handle_list_withdrawals,
    handle_telegram_webhook, handle_update_status,
};
use crate::auth::{OperatorVerifier, ADMIN_KEY_HEADER};
use crate::db::WithdrawalStore;
use crate::telegram::TelegramClient;

pub struct AppState {
    pub store: Arc<dyn WithdrawalStore>,
    pub verifier: Arc<dyn OperatorVerifier>,
    pub telegram: Option<TelegramClient>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(ADMIN_KEY_HEADER)])
        .max_age(Duration::from_secs(86400));

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route(
            "/withdrawals",
            get(handle_list_withdrawals).post(handle_create_withdrawal),
        )
        .route("/withdrawals/status", post(handle_update_status))
        .route("/telegram/webhook", post(handle_telegram_webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
