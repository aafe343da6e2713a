//! HTTP API for contact messages, appointments and admin login.

pub mod extract;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{app, create_router};
