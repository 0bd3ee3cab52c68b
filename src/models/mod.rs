pub mod intent;
pub mod payment;
