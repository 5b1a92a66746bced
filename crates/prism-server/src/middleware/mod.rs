//! Tower middleware applied to every route.

mod logging;

pub use logging::{LoggingLayer, LoggingMiddleware};
