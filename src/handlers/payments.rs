use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::app::router::AppState;
use crate::error::ServiceError;
use crate::models::payment::{
    CaptureRequest, CaptureResult, PaymentAuthorization, PaymentRequest, VoidRequest, VoidResult,
};

// Body is parsed by hand so malformed JSON gets the same error shape as
// every other failure.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Invalid request body: {}", e);
        ServiceError::Validation(format!("Invalid request body: {}", e))
    })
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PaymentAuthorization>, ServiceError> {
    let request: PaymentRequest = parse_body(&body)?;
    let authorization = state.payments.authorize(request).await?;
    Ok(Json(authorization))
}

pub async fn capture_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CaptureResult>, ServiceError> {
    let request: CaptureRequest = parse_body(&body)?;
    let result = state.payments.capture(request).await?;
    Ok(Json(result))
}

pub async fn cancel_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VoidResult>, ServiceError> {
    let request: VoidRequest = parse_body(&body)?;
    let result = state.payments.void(request).await?;
    Ok(Json(result))
}
