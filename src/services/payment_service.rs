use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app::config::PaymentSettings;
use crate::error::ServiceError;
use crate::models::intent::{CaptureMethod, CreateIntentParams, PaymentIntent};
use crate::models::payment::{
    BookingPayment, CaptureRequest, CaptureResult, IntentRef, PaymentAuthorization,
    PaymentRequest, VoidRequest, VoidResult,
};
use crate::services::atomic_metrics::{AtomicMetrics, MetricsSnapshot};
use crate::services::gateway::{GatewayError, GatewayHandle};
use crate::utils::money::{format_currency, split_minor_units, split_platform_fee, to_minor_units};

/// Booking payment flows on top of a [`PaymentGateway`](crate::services::gateway::PaymentGateway).
///
/// Stateless apart from counters: the gateway owns the durable record of
/// every payment, so nothing here is persisted between requests.
pub struct PaymentService {
    gateway: GatewayHandle,
    settings: PaymentSettings,
    metrics: Arc<AtomicMetrics>,
}

impl PaymentService {
    pub fn new(gateway: GatewayHandle, settings: PaymentSettings) -> Self {
        Self {
            gateway,
            settings,
            metrics: Arc::new(AtomicMetrics::new()),
        }
    }

    pub fn settings(&self) -> &PaymentSettings {
        &self.settings
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Validates the request and opens a manually captured intent for it.
    pub async fn authorize(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentAuthorization, ServiceError> {
        let payment = request.validate().map_err(|e| self.rejected(e))?;

        let split = split_platform_fee(payment.amount, self.settings.fee_rate())
            .map_err(|e| self.rejected(e.into()))?;
        let amount_minor = to_minor_units(payment.amount, &self.settings.currency)
            .map_err(|e| self.rejected(e.into()))?;

        let params = self.intent_params(&payment, amount_minor, split.platform_fee, split.freelancer_amount);
        let intent = self
            .gateway
            .create_intent(params)
            .await
            .map_err(|e| self.gateway_failed("create", &payment.booking_id, e))?;

        self.metrics.increment_authorized();
        info!(
            payment_intent = %intent.id,
            booking_id = %payment.booking_id,
            amount = %format_currency(amount_minor, &self.settings.currency),
            "Payment Intent created"
        );

        Ok(PaymentAuthorization {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
            amount: payment.amount,
            platform_fee: split.platform_fee,
            freelancer_amount: split.freelancer_amount,
        })
    }

    /// Settles a held authorization and reports the split of what was taken.
    pub async fn capture(&self, request: CaptureRequest) -> Result<CaptureResult, ServiceError> {
        let target = IntentRef::try_from(request).map_err(|e| self.rejected(e))?;
        let intent = self.load(&target).await?;

        if intent.state().capture().is_err() {
            return Err(self.rejected(ServiceError::InvalidState(format!(
                "Payment cannot be captured. Status: {}",
                intent.status
            ))));
        }

        let captured = self
            .gateway
            .capture_intent(&target.payment_intent_id)
            .await
            .map_err(|e| self.gateway_failed("capture", &target.booking_id, e))?;

        let total = captured.amount_received.unwrap_or(captured.amount);
        let (platform_fee, freelancer_amount) = split_minor_units(total, self.settings.fee_rate())?;

        self.metrics.increment_captured();
        info!(
            payment_intent = %captured.id,
            booking_id = %target.booking_id,
            platform_fee,
            freelancer_amount,
            "Payment captured"
        );

        Ok(CaptureResult {
            success: true,
            payment_intent_id: captured.id,
            charge_id: captured.latest_charge,
            amount: total,
            platform_fee,
            freelancer_amount,
            currency: captured.currency,
            captured_at: Utc::now().to_rfc3339(),
        })
    }

    /// Releases a held authorization without moving any funds.
    pub async fn void(&self, request: VoidRequest) -> Result<VoidResult, ServiceError> {
        let reason = request.reason;
        let target = IntentRef::new(request.payment_intent_id, request.booking_id)
            .map_err(|e| self.rejected(e))?;
        let intent = self.load(&target).await?;

        if intent.state().void().is_err() {
            return Err(self.rejected(ServiceError::InvalidState(format!(
                "Payment cannot be voided. Status: {}",
                intent.status
            ))));
        }

        let canceled = self
            .gateway
            .cancel_intent(&target.payment_intent_id, reason)
            .await
            .map_err(|e| self.gateway_failed("cancel", &target.booking_id, e))?;

        self.metrics.increment_voided();
        info!(
            payment_intent = %canceled.id,
            booking_id = %target.booking_id,
            "Payment authorization voided"
        );

        Ok(VoidResult {
            success: true,
            payment_intent_id: canceled.id,
            status: canceled.status.to_string(),
        })
    }

    async fn load(&self, target: &IntentRef) -> Result<PaymentIntent, ServiceError> {
        self.gateway
            .retrieve_intent(&target.payment_intent_id)
            .await
            .map_err(|e| self.gateway_failed("retrieve", &target.booking_id, e))
    }

    fn intent_params(
        &self,
        payment: &BookingPayment,
        amount_minor: i64,
        platform_fee: Decimal,
        freelancer_amount: Decimal,
    ) -> CreateIntentParams {
        let description = payment.description.clone().unwrap_or_else(|| {
            format!("{} {}", self.settings.description_prefix, payment.booking_id)
        });

        let metadata = BTreeMap::from([
            ("booking_id".to_string(), payment.booking_id.clone()),
            ("freelancer_id".to_string(), payment.freelancer_id.clone()),
            ("client_id".to_string(), payment.client_id.clone()),
            ("platform_fee".to_string(), platform_fee.to_string()),
            ("freelancer_amount".to_string(), freelancer_amount.to_string()),
        ]);

        CreateIntentParams {
            amount: amount_minor,
            currency: self.settings.currency.as_str().to_string(),
            description,
            metadata,
            capture_method: CaptureMethod::Manual,
        }
    }

    fn rejected(&self, err: ServiceError) -> ServiceError {
        self.metrics.increment_rejected();
        warn!("Rejected payment request: {}", err);
        err
    }

    fn gateway_failed(&self, operation: &str, booking_id: &str, err: GatewayError) -> ServiceError {
        self.metrics.increment_gateway_failures();
        error!(operation, booking_id, "Payment gateway call failed: {}", err);
        ServiceError::Gateway(err)
    }
}
