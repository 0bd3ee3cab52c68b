use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::app::middleware::{cors, request_context};
use crate::handlers::{health, metrics, payments};
use crate::services::PaymentService;

#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<PaymentService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(payments: PaymentService) -> Self {
        Self {
            payments: Arc::new(payments),
            started_at: Utc::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::get_metrics))
        .route("/create-payment-intent", post(payments::create_payment_intent))
        .route("/capture-payment", post(payments::capture_payment))
        .route("/cancel-payment", post(payments::cancel_payment))
        .layer(from_fn(cors))
        .layer(from_fn(request_context))
        .with_state(state)
}
