pub mod config;
pub mod health;

pub use config::get_config;
pub use health::{HealthResponse, health_check};
