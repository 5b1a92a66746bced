//! Prism Server - HTTP shell for Prism Config.
//!
//! Exposes composite resolution as Spring Cloud Config compatible JSON:
//!
//! - `GET /{application}/{profiles}`
//! - `GET /{application}/{profiles}/{label}` (`(_)` in a label stands for `/`)
//! - `GET /health`

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use handlers::HealthResponse;
pub use server::{create_router, run_server};
pub use settings::{PrismSettings, ServerSettings};
pub use state::AppState;
