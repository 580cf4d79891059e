//! Data Transfer Objects for REST request/response serialization.

pub mod draw_dto;

pub use draw_dto::*;
