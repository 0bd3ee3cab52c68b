use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, MISSING_FIELDS};
use crate::models::intent::CancellationReason;

/// Inbound body of `POST /create-payment-intent`. Every field is optional
/// here so that a missing one can be reported as a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub booking_id: Option<String>,
    /// Major currency units.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub freelancer_id: Option<String>,
    pub client_id: Option<String>,
    pub description: Option<String>,
}

/// A payment request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPayment {
    pub booking_id: String,
    pub amount: Decimal,
    pub freelancer_id: String,
    pub client_id: String,
    pub description: Option<String>,
}

impl PaymentRequest {
    /// Empty strings and a zero amount count as missing.
    pub fn validate(self) -> Result<BookingPayment, ServiceError> {
        let (Some(booking_id), Some(amount), Some(freelancer_id), Some(client_id)) = (
            present(self.booking_id),
            self.amount.filter(|amount| !amount.is_zero()),
            present(self.freelancer_id),
            present(self.client_id),
        ) else {
            return Err(ServiceError::Validation(MISSING_FIELDS.to_string()));
        };

        if amount.is_sign_negative() {
            return Err(ServiceError::Validation(
                "amount must not be negative".to_string(),
            ));
        }

        Ok(BookingPayment {
            booking_id,
            amount,
            freelancer_id,
            client_id,
            description: present(self.description),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAuthorization {
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub platform_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub freelancer_amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub payment_intent_id: Option<String>,
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidRequest {
    pub payment_intent_id: Option<String>,
    pub booking_id: Option<String>,
    pub reason: Option<CancellationReason>,
}

/// Identifies an existing authorization on the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRef {
    pub payment_intent_id: String,
    pub booking_id: String,
}

impl IntentRef {
    pub fn new(
        payment_intent_id: Option<String>,
        booking_id: Option<String>,
    ) -> Result<Self, ServiceError> {
        let (Some(payment_intent_id), Some(booking_id)) =
            (present(payment_intent_id), present(booking_id))
        else {
            return Err(ServiceError::Validation(format!(
                "{MISSING_FIELDS}: paymentIntentId, bookingId"
            )));
        };

        // The id ends up in the gateway URL path.
        if !payment_intent_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ServiceError::Validation(
                "Invalid paymentIntentId".to_string(),
            ));
        }

        Ok(Self {
            payment_intent_id,
            booking_id,
        })
    }
}

impl TryFrom<CaptureRequest> for IntentRef {
    type Error = ServiceError;

    fn try_from(request: CaptureRequest) -> Result<Self, Self::Error> {
        IntentRef::new(request.payment_intent_id, request.booking_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub success: bool,
    pub payment_intent_id: String,
    pub charge_id: Option<String>,
    /// Captured amount in minor units.
    pub amount: i64,
    pub platform_fee: i64,
    pub freelancer_amount: i64,
    pub currency: String,
    pub captured_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidResult {
    pub success: bool,
    pub payment_intent_id: String,
    pub status: String,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
