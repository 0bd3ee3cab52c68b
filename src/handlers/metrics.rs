use axum::{extract::State, response::Json};

use crate::app::router::AppState;

pub async fn get_metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let settings = state.payments.settings();

    Json(serde_json::json!({
        "started_at": state.started_at.to_rfc3339(),
        "currency": settings.currency,
        "platform_fee_bps": settings.platform_fee_bps,
        "counters": state.payments.metrics(),
    }))
}
