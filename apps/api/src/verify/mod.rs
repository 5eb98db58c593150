//! Verification client — the single point of entry for the third-party SMS
//! identity provider.
//!
//! ARCHITECTURAL RULE: no other module may call the provider directly.
//!
//! The proxy holds no verification state of its own: the request identifier
//! is generated here, but the provider is the system of record for whether a
//! phone number was verified. There is deliberately no retry or backoff —
//! a failed send or confirm surfaces immediately and the user starts over.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub mod handlers;

/// Generic user-facing message when the provider gives us nothing better.
const GENERIC_FAILURE: &str = "본인인증에 실패했습니다. 잠시 후 다시 시도해주세요.";

/// Progress of one verification attempt.
/// `Requested → CodeSent → Verified`; any failure terminates in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Requested,
    CodeSent,
    Verified,
    Failed,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Verification code rejected")]
    CodeRejected,
}

impl VerifyError {
    /// Localized message safe to surface to the end user. Provider-supplied
    /// messages are passed through; transport errors get the generic line.
    pub fn user_message(&self) -> String {
        match self {
            VerifyError::Provider { message, .. } if !message.trim().is_empty() => message.clone(),
            VerifyError::CodeRejected => "인증번호가 일치하지 않습니다.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    request_id: &'a str,
    phone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    request_id: &'a str,
    phone: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    verified: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Thin proxy over the provider's `send` and `confirm` operations.
#[derive(Clone)]
pub struct VerifyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VerifyClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: String) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Generates a fresh request identifier and asks the provider to send a
    /// verification code to `phone`. Returns the identifier the caller must
    /// echo back on confirm.
    pub async fn send_code(&self, phone: &str) -> Result<String, VerifyError> {
        let request_id = Uuid::new_v4().to_string();
        let body = SendRequest {
            request_id: &request_id,
            phone,
        };

        let response = self
            .client
            .post(format!("{}/v1/verify/send", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        check_provider_status(response).await?;

        debug!("Verification code sent (request {request_id})");
        Ok(request_id)
    }

    /// Forwards the user-entered code to the provider for confirmation.
    pub async fn confirm_code(
        &self,
        request_id: &str,
        phone: &str,
        code: &str,
    ) -> Result<(), VerifyError> {
        let body = ConfirmRequest {
            request_id,
            phone,
            code,
        };

        let response = self
            .client
            .post(format!("{}/v1/verify/confirm", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_provider_status(response).await?;

        let confirm: ConfirmResponse = response.json().await?;
        if !confirm.verified {
            return Err(VerifyError::CodeRejected);
        }
        debug!("Verification confirmed (request {request_id})");
        Ok(())
    }
}

async fn check_provider_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, VerifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("Verification provider returned {status}: {body}");
    // Prefer the provider's own message when the body parses.
    let message = serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    Err(VerifyError::Provider {
        status: status.as_u16(),
        message,
    })
}
