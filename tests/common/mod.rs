#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use ties_payments::models::intent::{
    CancellationReason, CreateIntentParams, IntentStatus, PaymentIntent,
};
use ties_payments::services::{GatewayError, PaymentGateway, PaymentService};
use ties_payments::{build_router, AppState, PaymentSettings};

/// In-process gateway that records what it was asked to do.
#[derive(Default)]
pub struct StubGateway {
    /// When set, every call fails with this message.
    pub fail_with: Option<String>,
    /// Status reported by `retrieve_intent`; `requires_capture` when unset.
    pub status: Option<IntentStatus>,
    pub created: Mutex<Vec<CreateIntentParams>>,
    pub calls: AtomicUsize,
    pub captures: AtomicUsize,
    pub cancels: AtomicUsize,
}

impl StubGateway {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_status(status: IntentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(GatewayError::Api {
                status: 402,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn intent(id: &str, amount: i64, status: IntentStatus) -> PaymentIntent {
    PaymentIntent {
        id: id.to_string(),
        amount,
        amount_received: None,
        currency: "aud".to_string(),
        status,
        client_secret: Some(format!("{id}_secret_test")),
        latest_charge: None,
        metadata: BTreeMap::new(),
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_intent(&self, params: CreateIntentParams) -> Result<PaymentIntent, GatewayError> {
        self.enter()?;
        let amount = params.amount;
        self.created.lock().unwrap().push(params);
        Ok(intent("pi_stub", amount, IntentStatus::RequiresPaymentMethod))
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        self.enter()?;
        Ok(intent(
            intent_id,
            25_000,
            self.status.unwrap_or(IntentStatus::RequiresCapture),
        ))
    }

    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        self.enter()?;
        self.captures.fetch_add(1, Ordering::SeqCst);
        let mut captured = intent(intent_id, 25_000, IntentStatus::Succeeded);
        captured.amount_received = Some(25_000);
        captured.latest_charge = Some("ch_stub".to_string());
        Ok(captured)
    }

    async fn cancel_intent(
        &self,
        intent_id: &str,
        _reason: Option<CancellationReason>,
    ) -> Result<PaymentIntent, GatewayError> {
        self.enter()?;
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(intent(intent_id, 25_000, IntentStatus::Canceled))
    }
}

/// Serves the API on an ephemeral port and returns its base URL.
pub async fn spawn_app(gateway: Arc<StubGateway>) -> String {
    let service = PaymentService::new(gateway, PaymentSettings::default());
    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    format!("http://{addr}")
}
