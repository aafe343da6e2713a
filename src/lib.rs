//! Backend for a contact form and appointment booking site.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod store;
