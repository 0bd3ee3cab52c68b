use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::services::gateway::GatewayError;
use crate::utils::money::MoneyError;

pub const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed or incomplete request; nothing was sent to the gateway.
    #[error("{0}")]
    Validation(String),
    /// The payment intent is not in a state that allows the operation.
    #[error("{0}")]
    InvalidState(String),
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::InvalidState(_) | ServiceError::Money(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
