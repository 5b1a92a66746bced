//! Application state.

use std::sync::Arc;

use prism_sources::CompositeResolver;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    resolver: Arc<CompositeResolver>,
}

impl AppState {
    pub fn new(resolver: CompositeResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    pub fn resolver(&self) -> &CompositeResolver {
        &self.resolver
    }
}
