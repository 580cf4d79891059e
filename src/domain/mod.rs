//! Domain layer: candidates, registrants, assignments, and pool state.
//!
//! This module holds the server-side model of a draw: the candidate names
//! that can be drawn, the registrants who draw them, the assignments that
//! join the two, and the [`PoolState`] partition that owns both collections
//! and performs the draw itself.

pub mod assignment;
pub mod candidate;
pub mod email;
pub mod pool_state;

pub use assignment::{Assignment, Registrant};
pub use candidate::CandidateName;
pub use email::Email;
pub use pool_state::{Allocation, PoolState};
