use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::AppState;
use crate::verify::VerificationStatus;

#[derive(Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

#[derive(Deserialize)]
pub struct ConfirmCodeRequest {
    pub request_id: String,
    pub phone: String,
    pub code: String,
}

/// Uniform response for both verification steps: the current state of the
/// attempt, plus a user-facing message when it failed.
#[derive(Serialize)]
pub struct VerifyResponse {
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// POST /api/v1/verify/send
///
/// Every failure maps to the `Failed` state with a surfaced message rather
/// than an error status — the flow has no retry, the user simply starts over.
pub async fn handle_send_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> Json<VerifyResponse> {
    match state.verify.send_code(&req.phone).await {
        Ok(request_id) => {
            info!("Verification code sent for request {request_id}");
            Json(VerifyResponse {
                status: VerificationStatus::CodeSent,
                request_id: Some(request_id),
                message: None,
            })
        }
        Err(e) => Json(VerifyResponse {
            status: VerificationStatus::Failed,
            request_id: None,
            message: Some(e.user_message()),
        }),
    }
}

/// POST /api/v1/verify/confirm
pub async fn handle_confirm_code(
    State(state): State<AppState>,
    Json(req): Json<ConfirmCodeRequest>,
) -> Json<VerifyResponse> {
    match state
        .verify
        .confirm_code(&req.request_id, &req.phone, &req.code)
        .await
    {
        Ok(()) => {
            info!("Verification confirmed for request {}", req.request_id);
            Json(VerifyResponse {
                status: VerificationStatus::Verified,
                request_id: Some(req.request_id),
                message: None,
            })
        }
        Err(e) => Json(VerifyResponse {
            status: VerificationStatus::Failed,
            request_id: Some(req.request_id),
            message: Some(e.user_message()),
        }),
    }
}
