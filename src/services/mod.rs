pub mod atomic_metrics;
pub mod gateway;
pub mod payment_service;
pub mod stripe_client;

pub use gateway::{GatewayError, GatewayHandle, PaymentGateway};
pub use payment_service::PaymentService;
pub use stripe_client::StripeGateway;
