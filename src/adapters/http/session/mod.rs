//! HTTP adapter for session endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::SessionState;
pub use routes::session_routes;
