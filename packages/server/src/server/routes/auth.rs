//! Verification session endpoints.

use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::common::{ApiError, ApiResponse};
use crate::domains::auth::actions::{create_session, verify_session};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub session_id: String,
    pub code: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub phone: String,
}

/// POST /api/v1/auth/send-code
pub async fn send_code_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SendCodeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SendCodeResponse>>, ApiError> {
    let Json(request) = payload?;

    let session_id = create_session(&request.phone, &state.deps).await?;

    Ok(ApiResponse::ok(SendCodeResponse { session_id }))
}

/// POST /api/v1/auth/verify-code
pub async fn verify_code_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<VerifyCodeResponse>>, ApiError> {
    let Json(request) = payload?;

    let token = verify_session(&request.session_id, request.code, &state.deps).await?;

    Ok(ApiResponse::ok(VerifyCodeResponse { token }))
}

/// GET /api/v1/auth/me
pub async fn me_handler(user: AuthUser) -> Json<ApiResponse<MeResponse>> {
    ApiResponse::ok(MeResponse { phone: user.phone })
}
