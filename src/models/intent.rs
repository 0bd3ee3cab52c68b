use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Gateway-side payment intent, as returned by the payment intents API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    /// Minor units.
    pub amount: i64,
    #[serde(default)]
    pub amount_received: Option<i64>,
    pub currency: String,
    pub status: IntentStatus,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub latest_charge: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl PaymentIntent {
    pub fn state(&self) -> AuthorizationState {
        AuthorizationState::from(self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMethod {
    Automatic,
    Manual,
}

impl CaptureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMethod::Automatic => "automatic",
            CaptureMethod::Manual => "manual",
        }
    }
}

/// Reasons the gateway accepts when an authorization is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    Duplicate,
    Fraudulent,
    RequestedByCustomer,
    Abandoned,
}

impl CancellationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationReason::Duplicate => "duplicate",
            CancellationReason::Fraudulent => "fraudulent",
            CancellationReason::RequestedByCustomer => "requested_by_customer",
            CancellationReason::Abandoned => "abandoned",
        }
    }
}

/// Everything needed to open a held charge on the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIntentParams {
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    pub capture_method: CaptureMethod,
}

/// Two-phase payment lifecycle: funds are held at authorization and later
/// either settled or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationState {
    /// Not yet authorized (or failed); carries the gateway status.
    Pending(IntentStatus),
    Authorized,
    Captured,
    Voided,
}

impl From<IntentStatus> for AuthorizationState {
    fn from(status: IntentStatus) -> Self {
        match status {
            IntentStatus::RequiresCapture => AuthorizationState::Authorized,
            IntentStatus::Succeeded => AuthorizationState::Captured,
            IntentStatus::Canceled => AuthorizationState::Voided,
            other => AuthorizationState::Pending(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Capture,
    Void,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action:?} a payment in state {from:?}")]
pub struct InvalidTransition {
    pub action: Transition,
    pub from: AuthorizationState,
}

impl AuthorizationState {
    pub fn capture(self) -> Result<Self, InvalidTransition> {
        self.transition(Transition::Capture)
    }

    pub fn void(self) -> Result<Self, InvalidTransition> {
        self.transition(Transition::Void)
    }

    fn transition(self, action: Transition) -> Result<Self, InvalidTransition> {
        match (self, action) {
            (AuthorizationState::Authorized, Transition::Capture) => Ok(AuthorizationState::Captured),
            (AuthorizationState::Authorized, Transition::Void) => Ok(AuthorizationState::Voided),
            (from, action) => Err(InvalidTransition { action, from }),
        }
    }
}
