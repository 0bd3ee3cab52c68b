use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::intent::{CancellationReason, CreateIntentParams, PaymentIntent};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered with an error; `message` is its own explanation.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("payment gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected payment gateway response: {0}")]
    Decode(String),
    #[error("invalid payment gateway url: {0}")]
    Url(#[from] url::ParseError),
}

/// External payment gateway. Each method is exactly one outbound call.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens an authorization; with manual capture the funds are only held.
    async fn create_intent(&self, params: CreateIntentParams) -> Result<PaymentIntent, GatewayError>;

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError>;

    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError>;

    async fn cancel_intent(
        &self,
        intent_id: &str,
        reason: Option<CancellationReason>,
    ) -> Result<PaymentIntent, GatewayError>;
}

pub type GatewayHandle = Arc<dyn PaymentGateway>;
