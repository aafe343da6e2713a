//! In-process store used by tests.
//!
//! Mirrors the Postgres behaviour the handlers depend on: serial ids, newest
//! first listing, VARCHAR limits and "relation does not exist" before the
//! schema is created.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::Store;
use crate::error::StoreError;
use crate::models::{Appointment, ContactMessage, NewAppointment, NewContactMessage};
use crate::schema;

#[derive(Debug)]
struct Table<T> {
    rows: Vec<T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
struct Tables {
    contact_messages: Option<Table<ContactMessage>>,
    appointments: Option<Table<Appointment>>,
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// A store with both tables already created.
    pub fn new() -> Self {
        let store = Self::without_schema();
        {
            let mut tables = store.lock();
            tables.contact_messages = Some(Table::default());
            tables.appointments = Some(Table::default());
        }
        store
    }

    /// A store whose tables do not exist until [`Store::ensure_schema`] runs.
    pub fn without_schema() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means a test panicked mid-operation.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(table: &str) -> StoreError {
    StoreError::UndefinedTable(format!("relation \"{table}\" does not exist"))
}

fn check_len(value: &Option<String>, max: usize) -> Result<(), StoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(StoreError::Rejected(format!(
            "value too long for type character varying({max})"
        ))),
        _ => Ok(()),
    }
}

fn newest_first<T: Clone>(rows: &[T]) -> Vec<T> {
    rows.iter().rev().cloned().collect()
}

impl Store for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.lock();
        tables.contact_messages.get_or_insert_with(Table::default);
        tables.appointments.get_or_insert_with(Table::default);
        Ok(())
    }

    async fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StoreError> {
        self.check_available()?;
        let mut tables = self.lock();
        let table = tables
            .contact_messages
            .as_mut()
            .ok_or_else(|| missing("contact_messages"))?;

        check_len(&message.name, schema::CONTACT_NAME_MAX)?;
        check_len(&message.email, schema::CONTACT_EMAIL_MAX)?;

        let row = ContactMessage {
            id: table.next_id(),
            name: message.name,
            email: message.email,
            message: message.message,
            created_at: Some(Utc::now().naive_utc()),
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, StoreError> {
        self.check_available()?;
        let tables = self.lock();
        let table = tables
            .contact_messages
            .as_ref()
            .ok_or_else(|| missing("contact_messages"))?;
        Ok(newest_first(&table.rows))
    }

    async fn delete_contact_message(&self, id: i32) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut tables = self.lock();
        let table = tables
            .contact_messages
            .as_mut()
            .ok_or_else(|| missing("contact_messages"))?;
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        self.check_available()?;
        let mut tables = self.lock();
        let table = tables
            .appointments
            .as_mut()
            .ok_or_else(|| missing("appointments"))?;

        check_len(&appointment.name, schema::APPOINTMENT_NAME_MAX)?;
        check_len(&appointment.phone, schema::APPOINTMENT_PHONE_MAX)?;
        check_len(&appointment.email, schema::APPOINTMENT_EMAIL_MAX)?;
        check_len(&appointment.time, schema::APPOINTMENT_TIME_MAX)?;

        let row = Appointment {
            id: table.next_id(),
            name: appointment.name,
            phone: appointment.phone,
            email: appointment.email,
            time: appointment.time,
            created_at: Some(Utc::now().naive_utc()),
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        self.check_available()?;
        let tables = self.lock();
        let table = tables
            .appointments
            .as_ref()
            .ok_or_else(|| missing("appointments"))?;
        Ok(newest_first(&table.rows))
    }

    async fn delete_appointment(&self, id: i32) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut tables = self.lock();
        let table = tables
            .appointments
            .as_mut()
            .ok_or_else(|| missing("appointments"))?;
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);
        Ok((before - table.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contact(name: &str) -> NewContactMessage {
        NewContactMessage {
            name: Some(name.to_string()),
            email: None,
            message: Some("hi".to_string()),
        }
    }

    #[tokio::test]
    async fn ids_are_unique_and_listed_newest_first() {
        let store = MemoryStore::new();
        let a = store.insert_contact_message(contact("a")).await.unwrap();
        let b = store.insert_contact_message(contact("b")).await.unwrap();
        assert!(b.id > a.id);

        let ids: Vec<i32> = store
            .list_contact_messages()
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = store.insert_contact_message(contact("a")).await.unwrap();
        assert_eq!(store.delete_contact_message(first.id).await.unwrap(), 1);

        let second = store.insert_contact_message(contact("b")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn deleting_unknown_id_removes_nothing() {
        let store = MemoryStore::new();
        assert_eq!(store.delete_appointment(999_999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn tables_are_missing_until_schema_exists() {
        let store = MemoryStore::without_schema();
        let err = store.list_appointments().await.unwrap_err();
        assert!(err.is_undefined_table());

        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        assert!(store.list_appointments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_phone_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert_appointment(NewAppointment {
                phone: Some("9".repeat(schema::APPOINTMENT_PHONE_MAX + 1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_contact_messages().await,
            Err(StoreError::Unavailable)
        ));
        store.set_unavailable(false);
        assert!(store.list_contact_messages().await.is_ok());
    }
}
