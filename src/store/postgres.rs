//! Postgres-backed store over a shared `sqlx` pool.

use sqlx::postgres::{PgPool, PgPoolOptions};

use super::Store;
use crate::config::StoreConfig;
use crate::error::{ConfigError, StoreError};
use crate::models::{Appointment, ContactMessage, NewAppointment, NewContactMessage};
use crate::schema;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build the process-wide pool. Connections are opened on first use, so
    /// an unreachable database surfaces as per-request errors.
    pub fn connect_lazy(config: &StoreConfig) -> Result<Self, ConfigError> {
        let options = config.connect_options()?;

        let pool_options = match config {
            StoreConfig::Hosted { .. } => PgPoolOptions::new(),
            StoreConfig::Local(local) => PgPoolOptions::new()
                .max_connections(local.max_connections)
                .idle_timeout(local.idle_timeout)
                .acquire_timeout(local.connect_timeout),
        };

        Ok(Self {
            pool: pool_options.connect_lazy_with(options),
        })
    }
}

impl Store for PgStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for stmt in schema::BOOTSTRAP {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StoreError> {
        let row = sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (name, email, message) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(message.name)
        .bind(message.email)
        .bind(message.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, StoreError> {
        let rows = sqlx::query_as::<_, ContactMessage>(
            "SELECT * FROM contact_messages ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_contact_message(&self, id: i32) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let row = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (name, phone, email, time) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(appointment.name)
        .bind(appointment.phone)
        .bind(appointment.email)
        .bind(appointment.time)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_appointment(&self, id: i32) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
