//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::DrawService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Draw service for allocation and recheck.
    pub draw_service: Arc<DrawService>,
}

impl AppState {
    /// Wraps a service for sharing across handlers.
    #[must_use]
    pub fn new(draw_service: DrawService) -> Self {
        Self {
            draw_service: Arc::new(draw_service),
        }
    }
}
