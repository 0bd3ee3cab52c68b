use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use ties_payments::app::config::FileConfig;
use ties_payments::models::intent::{CancellationReason, CaptureMethod, CreateIntentParams, IntentStatus};
use ties_payments::services::{GatewayError, PaymentGateway, StripeGateway};
use ties_payments::Config;

const SECRET: &str = "sk_test_fake";

#[derive(Clone, Default)]
struct FakeStripe {
    forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {SECRET}"))
        .unwrap_or(false)
        && headers
            .get("stripe-version")
            .map(|v| v == "2023-10-16")
            .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "message": "Invalid API Key provided", "type": "invalid_request_error" } })),
    )
        .into_response()
}

fn intent_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "object": "payment_intent",
        "amount": 10000,
        "currency": "aud",
        "status": status,
        "client_secret": format!("{id}_secret_xyz"),
        "latest_charge": if status == "succeeded" { json!("ch_1") } else { json!(null) },
        "metadata": {}
    })
}

async fn create(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.forms.lock().unwrap().push(form);
    Json(intent_json("pi_fake", "requires_payment_method")).into_response()
}

async fn retrieve(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == "pi_missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": {
                "message": format!("No such payment_intent: '{id}'"),
                "type": "invalid_request_error"
            } })),
        )
            .into_response();
    }
    Json(intent_json(&id, "requires_capture")).into_response()
}

async fn capture(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut body = intent_json(&id, "succeeded");
    body["amount_received"] = json!(10000);
    Json(body).into_response()
}

async fn cancel(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.forms.lock().unwrap().push(form);
    Json(intent_json(&id, "canceled")).into_response()
}

async fn spawn_fake_stripe() -> (String, FakeStripe) {
    let fake = FakeStripe::default();
    let app = Router::new()
        .route("/v1/payment_intents", post(create))
        .route("/v1/payment_intents/:id", get(retrieve))
        .route("/v1/payment_intents/:id/capture", post(capture))
        .route("/v1/payment_intents/:id/cancel", post(cancel))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake stripe");
    });
    (format!("http://{addr}"), fake)
}

fn gateway_for(base: &str, secret: &str) -> StripeGateway {
    let base = base.to_string();
    let secret = secret.to_string();
    let config = Config::from_sources(FileConfig::default(), move |key| match key {
        "STRIPE_SECRET_KEY" => Some(secret.clone()),
        "STRIPE_API_BASE" => Some(base.clone()),
        _ => None,
    })
    .expect("config");
    StripeGateway::new(&config).expect("gateway")
}

#[tokio::test]
async fn creates_manual_capture_intent_with_form_encoding() {
    let (base, fake) = spawn_fake_stripe().await;
    let gateway = gateway_for(&base, SECRET);

    let params = CreateIntentParams {
        amount: 10_000,
        currency: "aud".to_string(),
        description: "TIES Together Booking b-1".to_string(),
        metadata: BTreeMap::from([
            ("booking_id".to_string(), "b-1".to_string()),
            ("platform_fee".to_string(), "10".to_string()),
        ]),
        capture_method: CaptureMethod::Manual,
    };

    let intent = gateway.create_intent(params).await.expect("create intent");
    assert_eq!(intent.id, "pi_fake");
    assert_eq!(intent.client_secret.as_deref(), Some("pi_fake_secret_xyz"));

    let forms = fake.forms.lock().unwrap();
    let form = &forms[0];
    assert_eq!(form["amount"], "10000");
    assert_eq!(form["currency"], "aud");
    assert_eq!(form["capture_method"], "manual");
    assert_eq!(form["description"], "TIES Together Booking b-1");
    assert_eq!(form["metadata[booking_id]"], "b-1");
    assert_eq!(form["metadata[platform_fee]"], "10");
}

#[tokio::test]
async fn retrieve_capture_and_cancel() {
    let (base, fake) = spawn_fake_stripe().await;
    let gateway = gateway_for(&base, SECRET);

    let intent = gateway.retrieve_intent("pi_1").await.expect("retrieve");
    assert_eq!(intent.status, IntentStatus::RequiresCapture);

    let captured = gateway.capture_intent("pi_1").await.expect("capture");
    assert_eq!(captured.status, IntentStatus::Succeeded);
    assert_eq!(captured.amount_received, Some(10_000));
    assert_eq!(captured.latest_charge.as_deref(), Some("ch_1"));

    let canceled = gateway
        .cancel_intent("pi_2", Some(CancellationReason::Abandoned))
        .await
        .expect("cancel");
    assert_eq!(canceled.status, IntentStatus::Canceled);
    assert_eq!(fake.forms.lock().unwrap()[0]["cancellation_reason"], "abandoned");
}

#[tokio::test]
async fn gateway_error_message_is_surfaced() {
    let (base, _fake) = spawn_fake_stripe().await;
    let gateway = gateway_for(&base, SECRET);

    let err = gateway.retrieve_intent("pi_missing").await.unwrap_err();
    match err {
        GatewayError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "No such payment_intent: 'pi_missing'");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bad_credentials_are_reported() {
    let (base, _fake) = spawn_fake_stripe().await;
    let gateway = gateway_for(&base, "sk_test_wrong");

    let err = gateway.retrieve_intent("pi_1").await.unwrap_err();
    assert!(matches!(err, GatewayError::Api { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid API Key provided");
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let gateway = gateway_for(&format!("http://{addr}"), SECRET);
    let err = gateway.retrieve_intent("pi_1").await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}
