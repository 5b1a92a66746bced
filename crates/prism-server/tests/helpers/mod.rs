//! Test helpers for prism-server.

#![allow(dead_code, unused_imports)]

pub mod backends;
pub mod client;

use std::sync::Arc;

use prism_server::{AppState, create_router};
use prism_sources::{BackendHandle, CompositeResolver};
use prism_transport::ConnectionFactoryProvider;

pub use backends::FixedBackend;
pub use client::{TestClient, TestResponse};

/// A client over a router serving `backends` in order.
pub fn client(backends: Vec<Arc<FixedBackend>>) -> TestClient {
    let handles: Vec<BackendHandle> = backends.into_iter().map(|b| b as BackendHandle).collect();
    let resolver = CompositeResolver::new(handles, Arc::new(ConnectionFactoryProvider::new()));
    TestClient::new(create_router(AppState::new(resolver)))
}
