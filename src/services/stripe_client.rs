use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::app::config::{Config, SecretKey};
use crate::models::intent::{CancellationReason, CreateIntentParams, PaymentIntent};
use crate::services::gateway::{GatewayError, PaymentGateway};

pub const API_VERSION: &str = "2023-10-16";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Stripe payment intents API over form-encoded REST calls.
pub struct StripeGateway {
    client: Client,
    base_url: Url,
    secret_key: SecretKey,
}

impl StripeGateway {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.gateway_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.gateway_base_url.clone(),
            secret_key: config.gateway_secret_key.clone(),
        })
    }

    fn intents_url(&self, suffix: &str) -> Result<Url, GatewayError> {
        Ok(self.base_url.join(&format!("v1/payment_intents{suffix}"))?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<PaymentIntent, GatewayError> {
        let response = request
            .bearer_auth(self.secret_key.expose())
            .header("Stripe-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<PaymentIntent>()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()));
        }

        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => {
                warn!(
                    status = status.as_u16(),
                    kind = envelope.error.kind.as_deref().unwrap_or("unknown"),
                    "gateway rejected request"
                );
                envelope
                    .error
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", status))
            }
            Err(_) => format!("HTTP {}", status),
        };

        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, params: CreateIntentParams) -> Result<PaymentIntent, GatewayError> {
        let mut form = vec![
            ("amount".to_string(), params.amount.to_string()),
            ("currency".to_string(), params.currency),
            ("description".to_string(), params.description),
            (
                "capture_method".to_string(),
                params.capture_method.as_str().to_string(),
            ),
        ];
        form.extend(
            params
                .metadata
                .into_iter()
                .map(|(key, value)| (format!("metadata[{key}]"), value)),
        );

        debug!(amount = params.amount, "creating payment intent");
        let url = self.intents_url("")?;
        self.send(self.client.post(url).form(&form)).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        let url = self.intents_url(&format!("/{intent_id}"))?;
        self.send(self.client.get(url)).await
    }

    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        let url = self.intents_url(&format!("/{intent_id}/capture"))?;
        self.send(self.client.post(url)).await
    }

    async fn cancel_intent(
        &self,
        intent_id: &str,
        reason: Option<CancellationReason>,
    ) -> Result<PaymentIntent, GatewayError> {
        let url = self.intents_url(&format!("/{intent_id}/cancel"))?;
        let form: Vec<(&str, &str)> = reason
            .map(|reason| vec![("cancellation_reason", reason.as_str())])
            .unwrap_or_default();
        self.send(self.client.post(url).form(&form)).await
    }
}
