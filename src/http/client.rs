use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::api::models::UpdateStatusBody;
use crate::auth::{SessionCredential, ADMIN_KEY_HEADER};
use crate::withdrawal::{NewWithdrawal, StatusFilter, WithdrawalRequest, WithdrawalStatus};

/// The processing service could not be reached or answered with garbage.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("service unreachable: {0}")]
    Unreachable(String),

    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            TransportError::Unreachable(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Http(e)
        }
    }
}

/// Service-level answer to a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

impl Acknowledgement {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalList {
    pub success: bool,
    #[serde(default)]
    pub withdrawals: Vec<WithdrawalRequest>,
}

impl WithdrawalList {
    pub fn of(withdrawals: Vec<WithdrawalRequest>) -> Self {
        Self {
            success: true,
            withdrawals,
        }
    }
}

/// The remote system of record, as seen by the desks.
#[async_trait]
pub trait ProcessingService: Send + Sync {
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

/// `ProcessingService` over the JSON HTTP API served by this crate.
#[derive(Clone)]
pub struct HttpProcessingClient {
    http: Client,
    base_url: Url,
}

impl HttpProcessingClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        // Relative joins drop the last path segment unless it ends in '/'.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path)?)
    }

    /// Decodes the body whether or not the status is 2xx; failures carry a
    /// `success: false` body too.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Processing service answered {}", status);

        serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("{} ({}): {}", status, e, body)))
    }
}

#[async_trait]
impl ProcessingService for HttpProcessingClient {
    async fn create_withdrawal(
        &self,
        withdrawal: &NewWithdrawal,
    ) -> Result<Acknowledgement, TransportError> {
        let response = self
            .http
            .post(self.endpoint("withdrawals")?)
            .json(withdrawal)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn list_withdrawals(
        &self,
        credential: &SessionCredential,
        filter: StatusFilter,
    ) -> Result<WithdrawalList, TransportError> {
        let mut request = self
            .http
            .get(self.endpoint("withdrawals")?)
            .header(ADMIN_KEY_HEADER, credential.expose());

        if let Some(status) = filter.status() {
            request = request.query(&[("status", status.as_str())]);
        }

        Self::decode(request.send().await?).await
    }

    async fn update_status(
        &self,
        credential: &SessionCredential,
        id: i64,
        status: WithdrawalStatus,
    ) -> Result<Acknowledgement, TransportError> {
        let response = self
            .http
            .post(self.endpoint("withdrawals/status")?)
            .header(ADMIN_KEY_HEADER, credential.expose())
            .json(&UpdateStatusBody { id, status })
            .send()
            .await?;

        Self::decode(response).await
    }
}
