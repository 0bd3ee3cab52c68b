pub mod app;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use app::config::{Config, ConfigError, PaymentSettings};
pub use app::router::{build_router, AppState};
pub use error::ServiceError;
