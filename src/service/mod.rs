//! Service layer: business logic orchestration.
//!
//! [`DrawService`] runs allocation and recheck against the configured
//! [`super::persistence::PoolStore`].

pub mod draw_service;

pub use draw_service::{DrawService, PoolSummary};
