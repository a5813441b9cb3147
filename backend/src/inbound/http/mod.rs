//! HTTP inbound adapter exposing REST endpoints.

pub mod dto;
pub mod error;
pub mod health;
pub mod idempotency;
pub mod leagues;
pub mod me;
pub mod schemas;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;
