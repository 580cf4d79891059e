//! # recipient-draw
//!
//! REST service that draws a recipient for each registrant from a
//! pre-seeded pool of names and keeps the result stable across visits.
//!
//! A registrant submits email, name, and password. The service picks a
//! name from the pool uniformly at random, never the registrant's own,
//! records the assignment, and returns the drawn name together with the
//! full pool as it was before the draw so the client can animate a reveal.
//! The same credentials later recheck the assignment without drawing again.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── DrawService (service/)
//!     │
//!     ├── PoolState (domain/)
//!     │
//!     └── PoolStore (persistence/)
//!           ├── JSON file
//!           └── PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
