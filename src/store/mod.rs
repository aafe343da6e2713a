//! Relational store access.
//!
//! Each operation is a single auto-committed statement. Handlers are generic
//! over [`Store`] so the router can run against [`PgStore`] in production and
//! [`MemoryStore`] in tests.

pub mod memory;
pub mod postgres;

use std::future::Future;

use crate::error::StoreError;
use crate::models::{Appointment, ContactMessage, NewAppointment, NewContactMessage};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub trait Store: Clone + Send + Sync + 'static {
    /// Create both tables if they are absent.
    fn ensure_schema(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> impl Future<Output = Result<ContactMessage, StoreError>> + Send;

    /// All contact messages, newest (highest id) first.
    fn list_contact_messages(
        &self,
    ) -> impl Future<Output = Result<Vec<ContactMessage>, StoreError>> + Send;

    /// Returns the number of rows removed, which may be zero.
    fn delete_contact_message(
        &self,
        id: i32,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn insert_appointment(
        &self,
        appointment: NewAppointment,
    ) -> impl Future<Output = Result<Appointment, StoreError>> + Send;

    /// All appointments, newest (highest id) first.
    fn list_appointments(&self) -> impl Future<Output = Result<Vec<Appointment>, StoreError>> + Send;

    /// Returns the number of rows removed, which may be zero.
    fn delete_appointment(&self, id: i32) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Run schema bootstrap, logging the outcome. Never fails the caller.
pub async fn bootstrap<S: Store>(store: S) {
    match store.ensure_schema().await {
        Ok(()) => tracing::info!("database tables verified/created"),
        Err(e) => tracing::error!(error = %e, "failed to create tables"),
    }
}
