//! JSON-over-HTTP surface for the Memoria vector memory service.
//!
//! Mirrors `memoria-grpc` route for route: every handler in
//! [`handlers`] calls straight into the same `memoria-services`
//! instances, so the two transports can diverge in wire shape but
//! never in business behavior.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::build_app;
pub use state::AppState;
